//! 作答统计合并
//!
//! 只统计每个学生每道题的最后一次作答。

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::keys;
use super::questions::{QuestionSlot, ResourceQuestions};
use crate::models::reports::entities::{AnswerRecord, DifficultyDegree, QuestionCounter};
use crate::models::reports::responses::{LearnerAnswerView, QuestionAnswer, StudentAnswerView};

/// 平均用时，作答数为 0 时返回 0
pub fn avg_time(total_time: i64, answer_count: i64) -> i64 {
    if answer_count <= 0 {
        return 0;
    }
    total_time / answer_count
}

/// 正确率（百分比，两位小数），作答数为 0 时返回 0
pub fn accuracy_rate(answer_count: i64, incorrect_count: i64) -> f64 {
    if answer_count <= 0 {
        return 0.0;
    }
    let correct = (answer_count - incorrect_count).max(0);
    round2(correct as f64 * 100.0 / answer_count as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn record_question_key(record: &AnswerRecord) -> String {
    keys::question_key_of(&record.resource_id, record.resource_type, &record.question_id)
}

pub fn counter_question_key(counter: &QuestionCounter) -> String {
    keys::question_key_of(&counter.resource_id, counter.resource_type, &counter.question_id)
}

pub fn counters_by_key(counters: Vec<QuestionCounter>) -> HashMap<String, QuestionCounter> {
    counters
        .into_iter()
        .map(|c| (counter_question_key(&c), c))
        .collect()
}

/// 把计数和作答挂到每道题上；没有计数的题目全部为 0
pub fn build_question_answers(
    slots: Vec<QuestionSlot>,
    counters: &HashMap<String, QuestionCounter>,
    answers: &[AnswerRecord],
    names: &HashMap<i64, String>,
) -> Vec<QuestionAnswer> {
    let mut by_question: HashMap<String, Vec<StudentAnswerView>> = HashMap::new();
    for record in answers {
        by_question
            .entry(record_question_key(record))
            .or_default()
            .push(StudentAnswerView {
                student_id: record.student_id,
                student_name: names.get(&record.student_id).cloned().unwrap_or_default(),
                answer: record.answer.clone(),
                correct: record.correct,
                cost_time: record.cost_time,
                answered_at: record.answered_at,
            });
    }

    slots
        .into_iter()
        .map(|slot| {
            let (answer_count, incorrect_count, total_time) = counters
                .get(&slot.question_key)
                .map(|c| (c.answer_count, c.incorrect_count, c.total_time))
                .unwrap_or((0, 0, 0));
            let answers = by_question.remove(&slot.question_key).unwrap_or_default();
            QuestionAnswer {
                index: 0,
                question_key: slot.question_key,
                resource_key: slot.resource_key,
                resource_id: slot.resource_id,
                resource_type: slot.resource_type,
                question: slot.question,
                answer_count,
                incorrect_count,
                accuracy_rate: accuracy_rate(answer_count, incorrect_count),
                avg_time: avg_time(total_time, answer_count),
                answers,
                total_time,
                resource_seq: slot.resource_seq,
                position: slot.position,
            }
        })
        .collect()
}

pub fn learner_answer_view(
    record: &AnswerRecord,
    names: &HashMap<i64, String>,
    questions: &ResourceQuestions,
) -> LearnerAnswerView {
    let question_key = record_question_key(record);
    let question_type = questions
        .get_by_question_key(&question_key)
        .map(|s| s.question.question_type);
    LearnerAnswerView {
        id: record.id,
        student_id: record.student_id,
        student_name: names.get(&record.student_id).cloned().unwrap_or_default(),
        question_key,
        question_id: record.question_id.clone(),
        question_type,
        answer: record.answer.clone(),
        correct: record.correct,
        cost_time: record.cost_time,
        answered_at: record.answered_at,
    }
}

/// 单个学生在一组题目上的汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearnerTally {
    pub answer_count: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub total_time: i64,
    pub last_answered_at: Option<DateTime<Utc>>,
}

impl LearnerTally {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AnswerRecord>) -> Self {
        let mut tally = Self::default();
        for record in records {
            tally.answer_count += 1;
            if record.correct {
                tally.correct_count += 1;
            } else {
                tally.incorrect_count += 1;
            }
            tally.total_time += record.cost_time;
            tally.last_answered_at = tally.last_answered_at.max(Some(record.answered_at));
        }
        tally
    }

    pub fn accuracy_rate(&self) -> f64 {
        accuracy_rate(self.answer_count, self.incorrect_count)
    }

    pub fn avg_time(&self) -> i64 {
        avg_time(self.total_time, self.answer_count)
    }

    /// 完成率（百分比）
    pub fn completion_rate(&self, question_total: usize) -> f64 {
        if question_total == 0 {
            return 0.0;
        }
        round2((self.answer_count as f64 * 100.0 / question_total as f64).min(100.0))
    }
}

/// 学生作答过的题目难度均值（四舍五入），没有作答时为中等
pub fn difficulty_degree<'a>(
    records: impl IntoIterator<Item = &'a AnswerRecord>,
    questions: &ResourceQuestions,
) -> DifficultyDegree {
    let levels: Vec<i32> = records
        .into_iter()
        .filter_map(|r| questions.get_by_question_key(&record_question_key(r)))
        .map(|s| {
            s.question
                .difficulty
                .unwrap_or(DifficultyDegree::DEFAULT_LEVEL)
        })
        .collect();
    if levels.is_empty() {
        return DifficultyDegree::default();
    }
    let mean = levels.iter().map(|l| *l as f64).sum::<f64>() / levels.len() as f64;
    DifficultyDegree::from_level(mean.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tasks::entities::ResourceType;
    use chrono::TimeZone;

    fn record(id: i64, student_id: i64, question_id: &str, correct: bool, cost: i64, minute: u32) -> AnswerRecord {
        AnswerRecord {
            id,
            task_id: 1,
            assign_id: 1,
            student_id,
            resource_id: question_id.to_string(),
            resource_type: ResourceType::Question,
            question_id: question_id.to_string(),
            answer: "A".to_string(),
            correct,
            cost_time: cost,
            answered_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_avg_time_zero_count() {
        assert_eq!(avg_time(0, 0), 0);
        assert_eq!(avg_time(120, 0), 0);
        assert_eq!(avg_time(10, 3), 3);
    }

    #[test]
    fn test_accuracy_rate() {
        assert_eq!(accuracy_rate(0, 0), 0.0);
        assert_eq!(accuracy_rate(3, 1), 66.67);
        assert_eq!(accuracy_rate(4, 0), 100.0);
    }

    #[test]
    fn test_learner_tally() {
        let records = vec![record(1, 7, "q1", true, 5, 1), record(2, 7, "q2", false, 7, 3)];
        let tally = LearnerTally::from_records(&records);
        assert_eq!(tally.answer_count, 2);
        assert_eq!(tally.correct_count, 1);
        assert_eq!(tally.avg_time(), 6);
        assert_eq!(tally.completion_rate(4), 50.0);
        assert_eq!(tally.last_answered_at, Some(records[1].answered_at));
        assert_eq!(LearnerTally::default().completion_rate(0), 0.0);
    }

    #[test]
    fn test_difficulty_defaults_to_medium() {
        let questions = ResourceQuestions::default();
        assert_eq!(
            difficulty_degree(std::iter::empty(), &questions),
            DifficultyDegree::Medium
        );
    }
}
