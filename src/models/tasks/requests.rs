use crate::models::common::de::{option_string_or_value, string_or_value};
use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

/// 任务报告列表查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskReportListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(deserialize_with = "string_or_value")]
    pub creator_id: i64,
    #[serde(default, deserialize_with = "option_string_or_value")]
    pub subject_id: Option<i64>,
    #[serde(default, deserialize_with = "option_string_or_value")]
    pub task_type: Option<i32>,
}

/// 最近任务报告查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct LatestTaskParams {
    pub creator_id: i64,
    pub subject_id: Option<i64>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone)]
pub struct TaskAssignListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub creator_id: i64,
    pub subject_id: Option<i64>,
    pub task_type: Option<i32>,
}

impl From<TaskReportListParams> for TaskAssignListQuery {
    fn from(params: TaskReportListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            creator_id: params.creator_id,
            subject_id: params.subject_id,
            task_type: params.task_type,
        }
    }
}
