use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::tasks::entities::ResourceType;

/// 布置维度的预计算统计（只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct TaskReport {
    pub task_id: i64,
    pub assign_id: i64,
    pub student_count: i64,
    pub finished_count: i64,
    // 百分比，0-100
    pub completion_rate: f64,
    pub accuracy_rate: f64,
    pub avg_time: i64,
    // 需关注学生数
    pub attention_count: i64,
}

impl TaskReport {
    /// 统计缺失时的默认值
    pub fn empty(task_id: i64, assign_id: i64) -> Self {
        Self {
            task_id,
            assign_id,
            student_count: 0,
            finished_count: 0,
            completion_rate: 0.0,
            accuracy_rate: 0.0,
            avg_time: 0,
            attention_count: 0,
        }
    }
}

/// 学生维度的预计算统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct StudentReport {
    pub task_id: i64,
    pub assign_id: i64,
    pub student_id: i64,
    pub answer_count: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub total_time: i64,
    pub accuracy_rate: f64,
    pub completion_rate: f64,
    pub finished_at: Option<DateTime<Utc>>,
}

/// 单题计数（按布置范围）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCounter {
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub question_id: String,
    pub answer_count: i64,
    pub incorrect_count: i64,
    pub total_time: i64,
}

/// 学生原始作答记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct AnswerRecord {
    pub id: i64,
    pub task_id: i64,
    pub assign_id: i64,
    pub student_id: i64,
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub question_id: String,
    pub answer: String,
    pub correct: bool,
    // 用时（秒）
    pub cost_time: i64,
    pub answered_at: DateTime<Utc>,
}

/// 表扬 / 关注计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub struct BehaviorTally {
    pub praise_count: i64,
    pub attention_count: i64,
}

/// 难度等级
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/report.ts")]
pub enum DifficultyDegree {
    Easy,
    RelativelyEasy,
    #[default]
    Medium,
    RelativelyHard,
    Hard,
}

impl DifficultyDegree {
    pub const DEFAULT_LEVEL: i32 = 3;

    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=1 => DifficultyDegree::Easy,
            2 => DifficultyDegree::RelativelyEasy,
            3 => DifficultyDegree::Medium,
            4 => DifficultyDegree::RelativelyHard,
            _ => DifficultyDegree::Hard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyDegree::Easy => "easy",
            DifficultyDegree::RelativelyEasy => "relatively_easy",
            DifficultyDegree::Medium => "medium",
            DifficultyDegree::RelativelyHard => "relatively_hard",
            DifficultyDegree::Hard => "hard",
        }
    }
}

/// 存储层作答记录过滤条件
#[derive(Debug, Clone, Default)]
pub struct AnswerFilter {
    pub student_id: Option<i64>,
    pub resource: Option<(String, ResourceType)>,
}
