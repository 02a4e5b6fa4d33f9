//! 任务实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_type: i32,
    pub subject_id: i64,
    pub creator_id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::task_resources::Entity")]
    Resources,
    #[sea_orm(has_many = "super::task_assigns::Entity")]
    Assigns,
}

impl Related<super::task_resources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resources.def()
    }
}

impl Related<super::task_assigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assigns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_task(self) -> crate::models::tasks::entities::Task {
        use crate::models::tasks::entities::{Task, TaskType};
        use chrono::{DateTime, Utc};

        Task {
            id: self.id,
            task_type: TaskType::from_code(self.task_type),
            subject_id: self.subject_id,
            creator_id: self.creator_id,
            name: self.name,
            comment: self.comment,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
