//! 任务资源实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub resource_id: String,
    pub resource_type: i32,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 未知的资源类型视为脏数据
    pub fn into_task_resource(
        self,
    ) -> crate::errors::Result<crate::models::tasks::entities::TaskResource> {
        use crate::errors::ReportError;
        use crate::models::tasks::entities::{ResourceType, TaskResource};
        use chrono::{DateTime, Utc};

        let resource_type = ResourceType::from_code(self.resource_type).ok_or_else(|| {
            ReportError::upstream_failure(format!(
                "任务资源 {} 的类型无效: {}",
                self.id, self.resource_type
            ))
        })?;
        Ok(TaskResource {
            id: self.id,
            task_id: self.task_id,
            resource_id: self.resource_id,
            resource_type,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        })
    }
}
