use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, warn};

use super::{read_recent_task, stat_card};
use crate::engine::context::ReportContext;
use crate::errors::{ReportError, Result};
use crate::models::PaginationInfo;
use crate::models::reports::responses::{
    LatestTaskReportResponse, TaskBrief, TaskReportItem, TaskReportListResponse,
};
use crate::models::tasks::entities::{Task, TaskAssign};
use crate::models::tasks::requests::{LatestTaskParams, TaskAssignListQuery, TaskReportListParams};

/// 教师的任务报告列表
pub async fn task_report_list(
    ctx: &mut ReportContext<'_>,
    params: TaskReportListParams,
) -> Result<TaskReportListResponse> {
    if params.creator_id <= 0 {
        return Err(ReportError::invalid_argument("creator_id 必须提供"));
    }
    let (page, size) = params.pagination.normalized();
    let mut query = TaskAssignListQuery::from(params);
    query.page = Some(page);
    query.size = Some(size);

    let (assigns, total) = ctx.deps().assigns.list_task_assigns(query).await?;

    let mut task_ids: Vec<i64> = Vec::new();
    for assign in &assigns {
        if !task_ids.contains(&assign.task_id) {
            task_ids.push(assign.task_id);
        }
    }
    // 列表查询已经带回布置，直接预填
    let tasks = ctx.get_tasks_data(&task_ids, Some(assigns)).await?;
    let items = build_items(ctx, tasks).await?;

    Ok(TaskReportListResponse {
        items,
        pagination: PaginationInfo::new(page, size, total),
    })
}

/// 最近查看的任务，没有记录时取最近布置的任务
pub async fn latest_task_report(
    ctx: &mut ReportContext<'_>,
    params: LatestTaskParams,
) -> Result<LatestTaskReportResponse> {
    if params.creator_id <= 0 {
        return Err(ReportError::invalid_argument("creator_id 必须提供"));
    }
    let deps = ctx.deps();

    let mut task: Option<Task> = None;
    if let Some(task_id) = read_recent_task(deps, params.creator_id, params.subject_id).await {
        match ctx.get_task_data(task_id).await {
            Ok(found) if found.creator_id == params.creator_id => task = Some(found),
            Ok(_) => warn!("Recent task {} belongs to another creator, ignored", task_id),
            Err(ReportError::NotFound(msg)) => warn!("Stale recent task marker: {}", msg),
            Err(e) => return Err(e),
        }
    }
    if task.is_none() {
        task = deps
            .tasks
            .get_latest_task(params.creator_id, params.subject_id)
            .await?;
    }

    let Some(task) = task else {
        debug!("Creator {} has no task yet", params.creator_id);
        return Ok(LatestTaskReportResponse { item: None });
    };
    let item = build_items(ctx, vec![task]).await?.into_iter().next();
    Ok(LatestTaskReportResponse { item })
}

/// 按任务把布置聚合为统计卡片。任务按最近一次布置的开始时间倒序，相同时按任务 ID 倒序。
async fn build_items(ctx: &mut ReportContext<'_>, tasks: Vec<Task>) -> Result<Vec<TaskReportItem>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }
    let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let assigns_by_task = ctx.get_tasks_assign_data(&task_ids).await?;

    let all_assigns: Vec<TaskAssign> = task_ids
        .iter()
        .flat_map(|id| assigns_by_task.get(id).cloned().unwrap_or_default())
        .collect();
    let reports = ctx.get_assign_reports(&all_assigns).await?;
    let rosters: HashMap<i64, _> = ctx
        .get_rosters(&all_assigns)
        .await?
        .into_iter()
        .map(|r| (r.assign_id, r))
        .collect();

    let assign_ids: Vec<i64> = all_assigns.iter().map(|a| a.id).collect();
    let answered = if assign_ids.is_empty() {
        HashMap::new()
    } else {
        ctx.deps().stats.get_task_assigns_stats(&assign_ids).await?
    };

    let mut items: Vec<TaskReportItem> = tasks
        .iter()
        .map(|task| {
            let mut assigns = assigns_by_task.get(&task.id).cloned().unwrap_or_default();
            assigns.sort_by_key(|a| (Reverse(a.start_time), Reverse(a.id)));
            let latest_start_time = assigns.first().map(|a| a.start_time);

            let cards = assigns
                .iter()
                .filter_map(|assign| {
                    let roster = rosters.get(&assign.id)?;
                    let report = reports.get(&assign.id)?;
                    let answered_count = answered.get(&assign.id).copied().unwrap_or(0);
                    Some(stat_card(assign, report, roster, answered_count))
                })
                .collect();

            TaskReportItem {
                task: TaskBrief::from(task),
                latest_start_time,
                assigns: cards,
            }
        })
        .collect();

    // 没有布置的任务排在最后
    items.sort_by_key(|item| (Reverse(item.latest_start_time), Reverse(item.task.id)));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assemble::{recent_task_key, report_summary};
    use crate::engine::resolver::{BatchedKey, SingleKey};
    use crate::engine::test_support::{FakeWorld, at_minute};
    use crate::models::PaginationQuery;
    use crate::models::reports::entities::TaskReport;
    use crate::models::tasks::entities::{GroupType, TaskType};

    fn list_params() -> TaskReportListParams {
        TaskReportListParams {
            pagination: PaginationQuery { page: 1, size: 10 },
            creator_id: 1,
            subject_id: None,
            task_type: None,
        }
    }

    fn world() -> FakeWorld {
        let world = FakeWorld::new();
        world.add_task(1, TaskType::Homework, "作业一");
        world.add_task(2, TaskType::Course, "课程练习");
        world.add_task(3, TaskType::Homework, "作业三");
        world.add_class(100, "一班", &[(1, "甲")]);
        world.add_class(200, "二班", &[(2, "乙")]);
        world.add_assign_at(10, 1, GroupType::Class, 100, at_minute(30));
        world.add_assign_at(11, 1, GroupType::Class, 200, at_minute(10));
        world.add_assign_at(20, 2, GroupType::Class, 100, at_minute(20));
        world.add_assign_at(30, 3, GroupType::Class, 200, at_minute(30));
        world.add_task_report(TaskReport {
            student_count: 1,
            finished_count: 1,
            completion_rate: 100.0,
            accuracy_rate: 80.0,
            ..TaskReport::empty(1, 10)
        });
        world
    }

    #[tokio::test]
    async fn test_list_pages_follow_latest_start() {
        let world = world();
        let deps = world.collaborators();

        let mut seen = Vec::new();
        for page in 1..=3 {
            let mut ctx = ReportContext::new(&deps, &BatchedKey);
            let params = TaskReportListParams {
                pagination: PaginationQuery { page, size: 1 },
                ..list_params()
            };
            let response = task_report_list(&mut ctx, params).await.unwrap();
            assert_eq!(response.items.len(), 1);
            assert_eq!(response.pagination.total, 3);
            seen.push(response.items[0].task.id);
        }
        assert_eq!(seen, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_list_orders_by_latest_start_then_task_id() {
        let world = world();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &BatchedKey);

        let response = task_report_list(&mut ctx, list_params()).await.unwrap();
        let order: Vec<i64> = response.items.iter().map(|i| i.task.id).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(response.pagination.total, 3);

        let first_task = &response.items[1];
        assert_eq!(first_task.assigns.len(), 2);
        assert_eq!(first_task.assigns[0].assign_id, 10);
        assert_eq!(first_task.assigns[0].group_name, "一班");
        assert_eq!(first_task.assigns[0].accuracy_rate, 80.0);
        // 没有统计的布置使用默认值
        assert_eq!(first_task.assigns[1].accuracy_rate, 0.0);

        // 批量解析：每类数据一次调用，布置来自列表查询的预填
        assert_eq!(world.counters.get_tasks_by_ids(), 1);
        assert_eq!(world.counters.get_task_reports(), 1);
        assert_eq!(world.counters.get_class_students(), 1);
        assert_eq!(world.counters.get_task_assigns_by_task_ids(), 0);
    }

    #[tokio::test]
    async fn test_list_requires_creator() {
        let world = world();
        let deps = world.collaborators();
        let mut ctx = ReportContext::new(&deps, &BatchedKey);
        let mut params = list_params();
        params.creator_id = 0;
        let err = task_report_list(&mut ctx, params).await.unwrap_err();
        assert_eq!(err.code(), "E006");
    }

    #[tokio::test]
    async fn test_latest_prefers_recent_marker() {
        let world = world();
        world.set_latest_task(3);
        let deps = world.collaborators();

        let mut ctx = ReportContext::new(&deps, &SingleKey);
        let params = LatestTaskParams {
            creator_id: 1,
            subject_id: None,
        };
        let response = latest_task_report(&mut ctx, params.clone()).await.unwrap();
        assert_eq!(response.item.unwrap().task.id, 3);

        // 查看汇总后写入最近使用标记
        let mut ctx = ReportContext::new(&deps, &SingleKey);
        report_summary(&mut ctx, 2, 20, PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(world.cache_value(&recent_task_key(1, None)).as_deref(), Some("2"));

        let mut ctx = ReportContext::new(&deps, &SingleKey);
        let response = latest_task_report(&mut ctx, params).await.unwrap();
        assert_eq!(response.item.unwrap().task.id, 2);
        assert_eq!(world.counters.get_latest_task(), 1);
    }

    #[tokio::test]
    async fn test_latest_survives_broken_cache() {
        let world = world();
        world.set_latest_task(1);
        world.break_cache();
        let deps = world.collaborators();

        let mut ctx = ReportContext::new(&deps, &SingleKey);
        let response = latest_task_report(
            &mut ctx,
            LatestTaskParams {
                creator_id: 1,
                subject_id: Some(1),
            },
        )
        .await
        .unwrap();
        let item = response.item.unwrap();
        assert_eq!(item.task.id, 1);
        assert_eq!(item.latest_start_time, Some(at_minute(30)));
    }
}
