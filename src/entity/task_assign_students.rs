//! 布置到指定学生时的学生列表

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_assign_students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assign_id: i64,
    pub student_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task_assigns::Entity",
        from = "Column::AssignId",
        to = "super::task_assigns::Column::Id"
    )]
    Assign,
}

impl Related<super::task_assigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assign.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
