//! 有上限的并发展开
//!
//! 题集、课程节点这类资源需要逐个调用题库服务。这里按上限并发执行，
//! 任一失败时记录首个错误，但已经启动的任务仍会执行完毕，结果统一丢弃。

use std::future::Future;

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use crate::errors::{ReportError, Result};

/// 默认并发上限
pub const DEFAULT_FANOUT_LIMIT: usize = 10;

/// 对每个输入并发执行 `task`，结果按输入顺序返回
pub async fn fan_out<I, T, F, Fut>(inputs: Vec<I>, limit: usize, task: F) -> Result<Vec<T>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total = inputs.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut completed = stream::iter(inputs.into_iter().enumerate())
        .map(|(index, input)| {
            let fut = task(input);
            async move { (index, fut.await) }
        })
        .buffer_unordered(limit.max(1));

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut first_error: Option<ReportError> = None;

    // 不在首个失败时提前返回，保证所有已启动的任务都跑完
    while let Some((index, result)) = completed.next().await {
        match result {
            Ok(value) => slots[index] = Some(value),
            Err(e) => {
                warn!("fan-out item {} of {} failed: {}", index, total, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    Ok(slots.into_iter().flatten().collect())
}
