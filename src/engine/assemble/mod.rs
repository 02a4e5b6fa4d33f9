//! 报告组装
//!
//! 每个组装函数只通过 [`ReportContext`] 的加载函数取数，互不依赖调用顺序。

pub mod answer_detail;
pub mod export;
pub mod panel;
pub mod student_card;
pub mod summary;
pub mod task_list;

use std::collections::HashSet;

use tracing::{debug, warn};

use super::context::{AssignRoster, AssignScope, ReportContext};
use super::Collaborators;
use crate::cache::CacheResult;
use crate::errors::{ReportError, Result};
use crate::models::reports::entities::{AnswerRecord, TaskReport};
use crate::models::reports::responses::AssignStatCard;
use crate::models::tasks::entities::{Task, TaskAssign};

pub use answer_detail::{assign_answer_detail, learner_answers, student_answer_detail};
pub use export::{CsvExport, ExportField, export_report};
pub use panel::answer_panel;
pub use student_card::student_detail;
pub use summary::report_summary;
pub use task_list::{latest_task_report, task_report_list};

/// 任务和布置 ID 必须同时给出
pub(crate) fn require_ids(task_id: i64, assign_id: i64) -> Result<()> {
    if task_id <= 0 || assign_id <= 0 {
        return Err(ReportError::invalid_argument(format!(
            "任务和布置 ID 必须同时提供: task={task_id}, assign={assign_id}"
        )));
    }
    Ok(())
}

/// 加载一次布置及其所属任务
pub(crate) async fn load_assign_scope(
    ctx: &mut ReportContext<'_>,
    task_id: i64,
    assign_id: i64,
) -> Result<(Task, TaskAssign)> {
    require_ids(task_id, assign_id)?;
    let task = ctx.get_task_data(task_id).await?;
    let assign = ctx
        .get_assign_data(task_id, AssignScope::One(assign_id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ReportError::not_found(format!("布置不存在: {assign_id}")))?;
    Ok((task, assign))
}

pub(crate) fn stat_card(
    assign: &TaskAssign,
    report: &TaskReport,
    roster: &AssignRoster,
    answered_count: i64,
) -> AssignStatCard {
    AssignStatCard {
        assign_id: assign.id,
        group_type: assign.group_type,
        group_id: assign.group_id,
        group_name: roster.group_name.clone(),
        start_time: assign.start_time,
        deadline: assign.deadline,
        student_count: report.student_count,
        finished_count: report.finished_count,
        answered_count,
        completion_rate: report.completion_rate,
        accuracy_rate: report.accuracy_rate,
        avg_time: report.avg_time,
        attention_count: report.attention_count,
    }
}

pub(crate) fn distinct_students(records: &[AnswerRecord]) -> i64 {
    records
        .iter()
        .map(|r| r.student_id)
        .collect::<HashSet<_>>()
        .len() as i64
}

pub fn recent_task_key(creator_id: i64, subject_id: Option<i64>) -> String {
    format!("recent_task:{creator_id}:{}", subject_id.unwrap_or(0))
}

pub fn evaluation_key(task_id: i64, assign_id: i64, student_id: i64) -> String {
    format!("evaluation:{task_id}:{assign_id}:{student_id}")
}

/// 记录教师最近查看的任务，失败只记日志
pub(crate) async fn remember_recent_task(deps: &Collaborators, task: &Task) {
    let ttl = deps.settings.recent_task_ttl;
    for key in [
        recent_task_key(task.creator_id, Some(task.subject_id)),
        recent_task_key(task.creator_id, None),
    ] {
        debug!("Marking recent task {} under {}", task.id, key);
        deps.cache.insert_raw(key, task.id.to_string(), ttl).await;
    }
}

/// 读取最近查看的任务，缓存不可用或值无效时返回 None
pub(crate) async fn read_recent_task(
    deps: &Collaborators,
    creator_id: i64,
    subject_id: Option<i64>,
) -> Option<i64> {
    let key = recent_task_key(creator_id, subject_id);
    match deps.cache.get_raw(&key).await {
        CacheResult::Found(value) => match value.parse::<i64>() {
            Ok(task_id) => Some(task_id),
            Err(e) => {
                warn!("Invalid recent task marker '{}' under {}: {}", value, key, e);
                None
            }
        },
        CacheResult::NotFound => None,
        CacheResult::ExistsButNoValue => {
            warn!("Recent task marker {} unreadable, falling back to store", key);
            None
        }
    }
}

/// 教师是否已评价该学生，读取失败按未评价处理
pub(crate) async fn read_evaluated(deps: &Collaborators, key: &str) -> bool {
    match deps.cache.get_raw(key).await {
        CacheResult::Found(_) => true,
        CacheResult::NotFound => false,
        CacheResult::ExistsButNoValue => {
            warn!("Evaluation marker {} unreadable, treated as not evaluated", key);
            false
        }
    }
}
