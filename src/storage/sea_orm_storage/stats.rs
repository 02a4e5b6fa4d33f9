//! 统计查询
//!
//! 作答记录可能包含同一题的多次尝试，只有每个学生每道题的最后一次作答计入统计。

use std::collections::HashMap;

use super::{SeaOrmStorage, db_error};
use crate::entity::task_answers::{Column as AnswerColumn, Entity as TaskAnswers};
use crate::entity::task_reports::{Column as ReportColumn, Entity as TaskReports};
use crate::entity::task_student_reports::{Column as StudentColumn, Entity as StudentReports};
use crate::errors::Result;
use crate::models::reports::attempts::{counters_from_answers, latest_attempts};
use crate::models::reports::entities::{
    AnswerFilter, AnswerRecord, QuestionCounter, StudentReport, TaskReport,
};
use crate::models::tasks::entities::ResourceType;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

impl SeaOrmStorage {
    /// 每次布置至少作答过一题的学生数
    pub async fn get_task_assigns_stats_impl(
        &self,
        assign_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        if assign_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let pairs: Vec<(i64, i64)> = TaskAnswers::find()
            .select_only()
            .column(AnswerColumn::AssignId)
            .column(AnswerColumn::StudentId)
            .distinct()
            .filter(AnswerColumn::AssignId.is_in(assign_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_error("查询布置作答人数"))?;

        let mut counts = HashMap::new();
        for (assign_id, _) in pairs {
            *counts.entry(assign_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// 布置维度的预计算统计
    pub async fn get_task_reports_impl(&self, assign_ids: &[i64]) -> Result<Vec<TaskReport>> {
        if assign_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = TaskReports::find()
            .filter(ReportColumn::AssignId.is_in(assign_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_error("查询布置统计"))?;

        Ok(models.into_iter().map(|m| m.into_task_report()).collect())
    }

    /// 学生维度的预计算统计
    pub async fn get_student_reports_impl(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<StudentReport>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = StudentReports::find()
            .filter(StudentColumn::TaskId.eq(task_id))
            .filter(StudentColumn::AssignId.eq(assign_id))
            .filter(StudentColumn::StudentId.is_in(student_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_error("查询学生统计"))?;

        Ok(models.into_iter().map(|m| m.into_student_report()).collect())
    }

    /// 指定资源下每道题的计数
    pub async fn get_answer_accuracy_impl(
        &self,
        task_id: i64,
        assign_id: i64,
        resources: &[(String, ResourceType)],
    ) -> Result<Vec<QuestionCounter>> {
        if resources.is_empty() {
            return Ok(Vec::new());
        }
        let mut condition = Condition::any();
        for (resource_id, resource_type) in resources {
            condition = condition.add(
                Condition::all()
                    .add(AnswerColumn::ResourceId.eq(resource_id.as_str()))
                    .add(AnswerColumn::ResourceType.eq(resource_type.code())),
            );
        }

        let records = self
            .find_answers(task_id, assign_id, Condition::all().add(condition))
            .await?;
        Ok(counters_from_answers(&latest_attempts(records)))
    }

    /// 每个学生作答过的题目数
    pub async fn get_task_answer_count_impl(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        if student_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let condition =
            Condition::all().add(AnswerColumn::StudentId.is_in(student_ids.iter().copied()));
        let records = self.find_answers(task_id, assign_id, condition).await?;

        let mut counts = HashMap::new();
        for record in latest_attempts(records) {
            *counts.entry(record.student_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// 布置范围内的作答记录（包含全部尝试），按记录 ID 升序
    pub async fn get_task_assign_answers_impl(
        &self,
        task_id: i64,
        assign_id: i64,
        filter: &AnswerFilter,
    ) -> Result<Vec<AnswerRecord>> {
        let mut condition = Condition::all();
        if let Some(student_id) = filter.student_id {
            condition = condition.add(AnswerColumn::StudentId.eq(student_id));
        }
        if let Some((resource_id, resource_type)) = &filter.resource {
            condition = condition
                .add(AnswerColumn::ResourceId.eq(resource_id.as_str()))
                .add(AnswerColumn::ResourceType.eq(resource_type.code()));
        }
        self.find_answers(task_id, assign_id, condition).await
    }

    async fn find_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        condition: Condition,
    ) -> Result<Vec<AnswerRecord>> {
        let models = TaskAnswers::find()
            .filter(AnswerColumn::TaskId.eq(task_id))
            .filter(AnswerColumn::AssignId.eq(assign_id))
            .filter(condition)
            .order_by_asc(AnswerColumn::Id)
            .all(&self.db)
            .await
            .map_err(db_error("查询作答记录"))?;

        models.into_iter().map(|m| m.into_answer_record()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{task_answers, task_assigns, tasks};
    use crate::storage::StatStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, Set};

    async fn storage() -> SeaOrmStorage {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        tasks::ActiveModel {
            id: Set(1),
            task_type: Set(1),
            subject_id: Set(1),
            creator_id: Set(1),
            name: Set("作业".to_string()),
            comment: Set(None),
            created_at: Set(0),
            updated_at: Set(0),
        }
        .insert(&db)
        .await
        .unwrap();
        task_assigns::ActiveModel {
            id: Set(10),
            task_id: Set(1),
            group_type: Set(1),
            group_id: Set(100),
            start_time: Set(0),
            deadline: Set(None),
            created_at: Set(0),
        }
        .insert(&db)
        .await
        .unwrap();
        SeaOrmStorage::from_connection(db)
    }

    async fn answer(storage: &SeaOrmStorage, student_id: i64, question_id: &str, correct: bool, cost: i64, at: i64) {
        task_answers::ActiveModel {
            task_id: Set(1),
            assign_id: Set(10),
            student_id: Set(student_id),
            resource_id: Set("p1".to_string()),
            resource_type: Set(ResourceType::Paper.code()),
            question_id: Set(question_id.to_string()),
            answer: Set("A".to_string()),
            correct: Set(correct),
            cost_time: Set(cost),
            answered_at: Set(at),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_only_latest_attempt_counts() {
        let storage = storage().await;
        // 学生 1 第一次答错，第二次答对
        answer(&storage, 1, "q1", false, 10, 100).await;
        answer(&storage, 1, "q1", true, 4, 200).await;
        answer(&storage, 2, "q1", false, 6, 150).await;
        answer(&storage, 2, "q2", true, 3, 160).await;

        let counters = storage
            .get_task_answer_accuracy_by_resource(1, 10, &[("p1".to_string(), ResourceType::Paper)])
            .await
            .unwrap();
        let q1 = counters.iter().find(|c| c.question_id == "q1").unwrap();
        assert_eq!(q1.answer_count, 2);
        assert_eq!(q1.incorrect_count, 1);
        assert_eq!(q1.total_time, 10);

        let counts = storage.get_task_answer_count(1, 10, &[1, 2, 3]).await.unwrap();
        assert_eq!(counts.get(&1), Some(&1));
        assert_eq!(counts.get(&2), Some(&2));
        assert_eq!(counts.get(&3), None);

        let answered = storage.get_task_assigns_stats(&[10, 11]).await.unwrap();
        assert_eq!(answered.get(&10), Some(&2));
        assert_eq!(answered.get(&11), None);
    }

    #[tokio::test]
    async fn test_answer_filter() {
        let storage = storage().await;
        answer(&storage, 1, "q1", false, 10, 100).await;
        answer(&storage, 1, "q1", true, 4, 200).await;
        answer(&storage, 2, "q1", false, 6, 150).await;

        let filter = AnswerFilter {
            student_id: Some(1),
            resource: Some(("p1".to_string(), ResourceType::Paper)),
        };
        let records = storage.get_task_assign_answers(1, 10, &filter).await.unwrap();
        assert_eq!(records.len(), 2);

        let other = AnswerFilter {
            student_id: None,
            resource: Some(("p1".to_string(), ResourceType::Question)),
        };
        assert!(storage.get_task_assign_answers(1, 10, &other).await.unwrap().is_empty());
    }
}
