//! 学生维度统计实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_student_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub assign_id: i64,
    pub student_id: i64,
    pub answer_count: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub total_time: i64,
    pub accuracy_rate: f64,
    pub completion_rate: f64,
    pub finished_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student_report(self) -> crate::models::reports::entities::StudentReport {
        use chrono::{DateTime, Utc};

        crate::models::reports::entities::StudentReport {
            task_id: self.task_id,
            assign_id: self.assign_id,
            student_id: self.student_id,
            answer_count: self.answer_count,
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            total_time: self.total_time,
            accuracy_rate: self.accuracy_rate,
            completion_rate: self.completion_rate,
            finished_at: self
                .finished_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        }
    }
}
