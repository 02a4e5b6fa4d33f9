use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::models::common::pagination::PaginationInfo;
use crate::models::content::entities::Question;
use crate::models::reports::entities::DifficultyDegree;
use crate::models::roster::entities::StudentInfo;
use crate::models::tasks::entities::{GroupType, ResourceType, Task, TaskType};

/// 任务摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TaskBrief {
    pub id: i64,
    pub name: String,
    pub task_type: TaskType,
    pub subject_id: i64,
    pub comment: Option<String>,
}

impl From<&Task> for TaskBrief {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            task_type: task.task_type,
            subject_id: task.subject_id,
            comment: task.comment.clone(),
        }
    }
}

/// 单个布置对象的统计卡片
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AssignStatCard {
    pub assign_id: i64,
    pub group_type: GroupType,
    pub group_id: i64,
    pub group_name: String,
    pub start_time: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub student_count: i64,
    pub finished_count: i64,
    // 至少作答过一题的学生数
    pub answered_count: i64,
    pub completion_rate: f64,
    pub accuracy_rate: f64,
    pub avg_time: i64,
    pub attention_count: i64,
}

/// 任务报告列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TaskReportItem {
    pub task: TaskBrief,
    pub latest_start_time: Option<DateTime<Utc>>,
    pub assigns: Vec<AssignStatCard>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TaskReportListResponse {
    pub items: Vec<TaskReportItem>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct LatestTaskReportResponse {
    pub item: Option<TaskReportItem>,
}

/// 某个学生对某题的作答
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentAnswerView {
    pub student_id: i64,
    pub student_name: String,
    pub answer: String,
    pub correct: bool,
    pub cost_time: i64,
    pub answered_at: DateTime<Utc>,
}

/// 单题统计 + 作答
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct QuestionAnswer {
    // 展示序号，从 1 开始连续
    pub index: i64,
    pub question_key: String,
    pub resource_key: String,
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub question: Question,
    pub answer_count: i64,
    pub incorrect_count: i64,
    pub accuracy_rate: f64,
    pub avg_time: i64,
    pub answers: Vec<StudentAnswerView>,
    #[serde(skip)]
    pub total_time: i64,
    // 资源记录 ID（挂载顺序）
    #[serde(skip)]
    pub resource_seq: i64,
    // 资源内的题目位置
    #[serde(skip)]
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AssignAnswerDetailResponse {
    pub task: TaskBrief,
    pub assign: AssignStatCard,
    pub questions: Vec<QuestionAnswer>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentAnswerDetailResponse {
    pub task: TaskBrief,
    pub student: StudentInfo,
    pub questions: Vec<QuestionAnswer>,
}

/// 原始作答列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct LearnerAnswerView {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub question_key: String,
    pub question_id: String,
    pub question_type: Option<i32>,
    pub answer: String,
    pub correct: bool,
    pub cost_time: i64,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct LearnerAnswerListResponse {
    pub items: Vec<LearnerAnswerView>,
    pub pagination: PaginationInfo,
}

/// 班级汇总中的学生行
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentSummary {
    pub student: StudentInfo,
    // 是否有统计记录；没有时下列数值均为 0
    pub has_record: bool,
    pub answer_count: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub accuracy_rate: f64,
    pub completion_rate: f64,
    pub total_time: i64,
    pub avg_time: i64,
    pub finished_at: Option<DateTime<Utc>>,
    pub difficulty_degree: DifficultyDegree,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct ReportSummaryResponse {
    pub task: TaskBrief,
    pub assign: AssignStatCard,
    // 当前页学生的平均值
    pub class_accuracy_rate: f64,
    pub class_avg_time: i64,
    pub students: Vec<StudentSummary>,
    // 共性错题，暂未统计，始终为 null
    pub common_incorrect_questions: Option<Vec<String>>,
    pub pagination: PaginationInfo,
}

/// 答题面板行
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AnswerPanelRow {
    pub index: i64,
    pub question_key: String,
    pub question_id: String,
    pub question_type: i32,
    pub accuracy_rate: f64,
    pub answer_count: i64,
    pub incorrect_count: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AnswerPanelResponse {
    pub task_id: i64,
    pub assign_id: i64,
    pub rows: Vec<AnswerPanelRow>,
}

/// 学生详情卡片
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentDetailResponse {
    pub task: TaskBrief,
    pub student: StudentInfo,
    pub praise_count: i64,
    pub attention_count: i64,
    pub accuracy_rate: f64,
    pub class_accuracy_rate: f64,
    pub completion_rate: f64,
    pub class_completion_rate: f64,
    pub evaluated: bool,
    pub guidance: String,
}
