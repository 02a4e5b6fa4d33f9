//! 任务与任务资源查询

use super::{SeaOrmStorage, db_error};
use crate::entity::task_resources::{Column as ResourceColumn, Entity as TaskResources};
use crate::entity::tasks::{Column, Entity as Tasks};
use crate::errors::Result;
use crate::models::tasks::entities::{Task, TaskResource};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 通过 ID 获取任务
    pub async fn get_task_by_id_impl(&self, task_id: i64) -> Result<Option<Task>> {
        let result = Tasks::find_by_id(task_id)
            .one(&self.db)
            .await
            .map_err(db_error("查询任务"))?;

        Ok(result.map(|m| m.into_task()))
    }

    /// 批量获取任务
    pub async fn get_tasks_by_ids_impl(&self, task_ids: &[i64]) -> Result<Vec<Task>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = Tasks::find()
            .filter(Column::Id.is_in(task_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_error("批量查询任务"))?;

        Ok(models.into_iter().map(|m| m.into_task()).collect())
    }

    /// 教师最近创建的任务，可按学科筛选
    pub async fn get_latest_task_impl(
        &self,
        creator_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Option<Task>> {
        let mut select = Tasks::find().filter(Column::CreatorId.eq(creator_id));
        if let Some(subject_id) = subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        let result = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(db_error("查询最近任务"))?;

        Ok(result.map(|m| m.into_task()))
    }

    /// 任务资源，按资源记录 ID 升序（即挂载顺序）
    pub async fn get_task_resources_by_task_ids_impl(
        &self,
        task_ids: &[i64],
    ) -> Result<Vec<TaskResource>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = TaskResources::find()
            .filter(ResourceColumn::TaskId.is_in(task_ids.iter().copied()))
            .order_by_asc(ResourceColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_error("查询任务资源"))?;

        models
            .into_iter()
            .map(|m| m.into_task_resource())
            .collect()
    }
}
