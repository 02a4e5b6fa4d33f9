use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 题库中的题目（已在客户端边界完成校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/content.ts")]
pub struct Question {
    pub id: String,
    // 题型
    pub question_type: i32,
    // 题干
    pub stem: String,
    pub options: Vec<String>,
    pub answer: Option<String>,
    pub analysis: Option<String>,
    // 难度 1-5
    pub difficulty: Option<i32>,
    // 题库给出的排序字段，可能不连续
    pub order: Option<i64>,
}

/// 题集 / 课程节点练习
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/content.ts")]
pub struct PracticeSet {
    pub id: String,
    pub name: Option<String>,
    pub questions: Vec<Question>,
}
