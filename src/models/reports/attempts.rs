//! 最后一次作答的筛选与单题计数
//!
//! 存储层和报表引擎共用，只依赖作答记录本身。

use std::collections::HashMap;

use super::entities::{AnswerRecord, QuestionCounter};
use crate::models::tasks::entities::ResourceType;

type QuestionIdent = (String, ResourceType, String);

fn ident(record: &AnswerRecord) -> QuestionIdent {
    (
        record.resource_id.clone(),
        record.resource_type,
        record.question_id.clone(),
    )
}

/// 每个 (学生, 题目) 只保留最后一次作答，结果按作答记录 ID 排序
pub fn latest_attempts(records: Vec<AnswerRecord>) -> Vec<AnswerRecord> {
    let mut latest: HashMap<(i64, QuestionIdent), AnswerRecord> = HashMap::new();
    for record in records {
        let key = (record.student_id, ident(&record));
        match latest.get(&key) {
            Some(kept) if (kept.answered_at, kept.id) >= (record.answered_at, record.id) => {}
            _ => {
                latest.insert(key, record);
            }
        }
    }
    let mut result: Vec<AnswerRecord> = latest.into_values().collect();
    result.sort_by_key(|r| r.id);
    result
}

/// 由作答记录计算单题计数，按题目首次出现的顺序返回
pub fn counters_from_answers(records: &[AnswerRecord]) -> Vec<QuestionCounter> {
    let mut positions: HashMap<QuestionIdent, usize> = HashMap::new();
    let mut counters: Vec<QuestionCounter> = Vec::new();
    for record in records {
        let pos = *positions.entry(ident(record)).or_insert_with(|| {
            counters.push(QuestionCounter {
                resource_id: record.resource_id.clone(),
                resource_type: record.resource_type,
                question_id: record.question_id.clone(),
                answer_count: 0,
                incorrect_count: 0,
                total_time: 0,
            });
            counters.len() - 1
        });
        let counter = &mut counters[pos];
        counter.answer_count += 1;
        if !record.correct {
            counter.incorrect_count += 1;
        }
        counter.total_time += record.cost_time;
    }
    counters
}
