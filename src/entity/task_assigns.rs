//! 任务布置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_assigns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub group_type: i32,
    pub group_id: i64,
    pub start_time: i64,
    pub deadline: Option<i64>,
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
    #[sea_orm(has_many = "super::task_assign_students::Entity")]
    Students,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::task_assign_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_task_assign(
        self,
    ) -> crate::errors::Result<crate::models::tasks::entities::TaskAssign> {
        use crate::errors::ReportError;
        use crate::models::tasks::entities::{GroupType, TaskAssign};
        use chrono::{DateTime, Utc};

        let group_type = GroupType::from_code(self.group_type).ok_or_else(|| {
            ReportError::upstream_failure(format!(
                "布置 {} 的对象类型无效: {}",
                self.id, self.group_type
            ))
        })?;
        Ok(TaskAssign {
            id: self.id,
            task_id: self.task_id,
            group_type,
            group_id: self.group_id,
            start_time: DateTime::<Utc>::from_timestamp(self.start_time, 0).unwrap_or_default(),
            deadline: self
                .deadline
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        })
    }
}
