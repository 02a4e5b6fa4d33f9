//! 数据模型定义
//!
//! - `tasks`: 任务、资源、布置
//! - `reports`: 统计实体、请求参数与报告视图
//! - `content` / `roster`: 外部服务返回的业务实体

pub mod common;
pub mod content;
pub mod reports;
pub mod roster;
pub mod tasks;

pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 5000,
    UpstreamFailure = 5002,
}

// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
