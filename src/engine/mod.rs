//! 任务报告聚合引擎
//!
//! 每个请求创建一个 [`ReportContext`]，按需、惰性地从各协作方取数，
//! 同一请求内每个数据分片最多取一次。报告组装见 [`assemble`]。
//!
//! 引擎不读取全局配置，也不依赖 HTTP 层，所需的一切都在 [`Collaborators`] 中。

pub mod answers;
pub mod assemble;
pub mod context;
pub mod fanout;
pub mod filter;
pub mod fragment;
pub mod keys;
pub mod questions;
pub mod resolver;
pub mod sequencer;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::clients::{ContentClient, RosterClient};
use crate::config::ReportConfig;
use crate::storage::{AssignStore, BehaviorStore, StatStore, TaskStore};

pub use context::{AssignRoster, AssignScope, ReportContext};
pub use resolver::{BatchedKey, FragmentResolver, SingleKey};

/// 引擎运行参数
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub fanout_concurrency: usize,
    pub recent_task_ttl: u64,
    pub export_placeholder: String,
    pub guidance_above: String,
    pub guidance_below: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            fanout_concurrency: fanout::DEFAULT_FANOUT_LIMIT,
            recent_task_ttl: 7 * 24 * 3600,
            export_placeholder: "-".to_string(),
            guidance_above: String::new(),
            guidance_below: String::new(),
        }
    }
}

impl From<&ReportConfig> for ReportSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            fanout_concurrency: config.fanout_concurrency.max(1),
            recent_task_ttl: config.recent_task_ttl,
            export_placeholder: config.export_placeholder.clone(),
            guidance_above: config.guidance.above.clone(),
            guidance_below: config.guidance.below.clone(),
        }
    }
}

/// 引擎依赖的全部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub tasks: Arc<dyn TaskStore>,
    pub assigns: Arc<dyn AssignStore>,
    pub stats: Arc<dyn StatStore>,
    pub behaviors: Arc<dyn BehaviorStore>,
    pub content: Arc<dyn ContentClient>,
    pub roster: Arc<dyn RosterClient>,
    pub cache: Arc<dyn ObjectCache>,
    pub settings: ReportSettings,
}
