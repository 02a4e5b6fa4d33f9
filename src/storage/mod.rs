use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    reports::entities::{
        AnswerFilter, AnswerRecord, BehaviorTally, QuestionCounter, StudentReport, TaskReport,
    },
    tasks::{
        entities::{ResourceType, Task, TaskAssign, TaskResource},
        requests::TaskAssignListQuery,
    },
};

pub mod sea_orm_storage;

/// 任务存储
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    // 通过ID获取任务
    async fn get_task_by_id(&self, task_id: i64) -> Result<Option<Task>>;
    // 批量获取任务，不存在的 ID 直接忽略
    async fn get_tasks_by_ids(&self, task_ids: &[i64]) -> Result<Vec<Task>>;
    // 教师在某学科下最近布置的任务
    async fn get_latest_task(&self, creator_id: i64, subject_id: Option<i64>)
    -> Result<Option<Task>>;
    // 任务挂载的资源
    async fn get_task_resources_by_task_id(&self, task_id: i64) -> Result<Vec<TaskResource>>;
    // 批量获取任务资源
    async fn get_task_resources_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<TaskResource>>;
}

/// 布置存储
#[async_trait::async_trait]
pub trait AssignStore: Send + Sync {
    // 获取某个任务下的某次布置
    async fn get_task_assign_info(&self, task_id: i64, assign_id: i64)
    -> Result<Option<TaskAssign>>;
    // 批量获取任务的全部布置
    async fn get_task_assigns_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<TaskAssign>>;
    // 分页列出教师的任务，返回当前页任务的全部布置和任务总数
    async fn list_task_assigns(&self, query: TaskAssignListQuery)
    -> Result<(Vec<TaskAssign>, i64)>;
    // 布置到指定学生时的学生 ID
    async fn get_task_assign_students(&self, assign_id: i64) -> Result<Vec<i64>>;
    // 临时小组成员 ID
    async fn get_assign_students(&self, group_id: i64) -> Result<Vec<i64>>;
}

/// 统计存储
#[async_trait::async_trait]
pub trait StatStore: Send + Sync {
    // 每次布置已作答的学生数
    async fn get_task_assigns_stats(&self, assign_ids: &[i64]) -> Result<HashMap<i64, i64>>;
    // 布置维度的预计算统计
    async fn get_task_reports_by_task_assign_ids(&self, assign_ids: &[i64])
    -> Result<Vec<TaskReport>>;
    // 指定资源下每道题的计数（只计最后一次作答）
    async fn get_task_answer_accuracy_by_resource(
        &self,
        task_id: i64,
        assign_id: i64,
        resources: &[(String, ResourceType)],
    ) -> Result<Vec<QuestionCounter>>;
    // 每个学生作答过的题目数
    async fn get_task_answer_count(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, i64>>;
    // 学生维度的预计算统计
    async fn get_task_assign_student_reports(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<StudentReport>>;
    // 布置范围内的作答记录（包含全部尝试）
    async fn get_task_assign_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        filter: &AnswerFilter,
    ) -> Result<Vec<AnswerRecord>>;
    // 单个学生的作答记录（包含全部尝试）
    async fn get_task_student_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> Result<Vec<AnswerRecord>>;
}

/// 课堂行为事件存储（只读）
#[async_trait::async_trait]
pub trait BehaviorStore: Send + Sync {
    async fn get_behavior_tally(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> Result<BehaviorTally>;
}

/// 同一个数据库实现全部存储接口
pub struct Stores {
    pub tasks: Arc<dyn TaskStore>,
    pub assigns: Arc<dyn AssignStore>,
    pub stats: Arc<dyn StatStore>,
    pub behaviors: Arc<dyn BehaviorStore>,
}

pub async fn create_storage() -> Result<Stores> {
    let storage = Arc::new(sea_orm_storage::SeaOrmStorage::new_async().await?);
    Ok(Stores {
        tasks: storage.clone(),
        assigns: storage.clone(),
        stats: storage.clone(),
        behaviors: storage,
    })
}
