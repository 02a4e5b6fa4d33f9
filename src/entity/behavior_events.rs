//! 课堂行为事件实体

use sea_orm::entity::prelude::*;

/// 表扬
pub const KIND_PRAISE: &str = "praise";
/// 提醒关注
pub const KIND_ATTENTION: &str = "attention";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "behavior_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub assign_id: i64,
    pub student_id: i64,
    pub kind: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
