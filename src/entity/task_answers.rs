//! 作答记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub assign_id: i64,
    pub student_id: i64,
    pub resource_id: String,
    pub resource_type: i32,
    pub question_id: String,
    #[sea_orm(column_type = "Text")]
    pub answer: String,
    pub correct: bool,
    pub cost_time: i64,
    pub answered_at: i64,
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
    pub fn into_answer_record(
        self,
    ) -> crate::errors::Result<crate::models::reports::entities::AnswerRecord> {
        use crate::errors::ReportError;
        use crate::models::reports::entities::AnswerRecord;
        use crate::models::tasks::entities::ResourceType;
        use chrono::{DateTime, Utc};

        let resource_type = ResourceType::from_code(self.resource_type).ok_or_else(|| {
            ReportError::upstream_failure(format!(
                "作答记录 {} 的资源类型无效: {}",
                self.id, self.resource_type
            ))
        })?;
        Ok(AnswerRecord {
            id: self.id,
            task_id: self.task_id,
            assign_id: self.assign_id,
            student_id: self.student_id,
            resource_id: self.resource_id,
            resource_type,
            question_id: self.question_id,
            answer: self.answer,
            correct: self.correct,
            cost_time: self.cost_time,
            answered_at: DateTime::<Utc>::from_timestamp(self.answered_at, 0).unwrap_or_default(),
        })
    }
}
