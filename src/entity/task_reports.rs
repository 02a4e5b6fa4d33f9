//! 布置维度统计实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    #[sea_orm(unique)]
    pub assign_id: i64,
    pub student_count: i64,
    pub finished_count: i64,
    pub completion_rate: f64,
    pub accuracy_rate: f64,
    pub avg_time: i64,
    pub attention_count: i64,
    pub updated_at: i64,
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

impl Model {
    pub fn into_task_report(self) -> crate::models::reports::entities::TaskReport {
        crate::models::reports::entities::TaskReport {
            task_id: self.task_id,
            assign_id: self.assign_id,
            student_count: self.student_count,
            finished_count: self.finished_count,
            completion_rate: self.completion_rate,
            accuracy_rate: self.accuracy_rate,
            avg_time: self.avg_time,
            attention_count: self.attention_count,
        }
    }
}
