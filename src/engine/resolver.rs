//! 分片取数策略
//!
//! 单任务请求用 [`SingleKey`]，逐个键调用协作方；
//! 多任务请求用 [`BatchedKey`]，把仍缺失的键合并为一次批量调用。
//! 两者都只负责取数，记忆化由 [`ReportContext`](super::ReportContext) 完成。

use std::collections::HashMap;

use async_trait::async_trait;

use super::Collaborators;
use super::questions::{ResourceQuestions, resolve_questions_for};
use crate::errors::Result;
use crate::models::reports::entities::TaskReport;
use crate::models::roster::entities::ClassInfo;
use crate::models::tasks::entities::{Task, TaskAssign, TaskResource};

#[async_trait]
pub trait FragmentResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// 不存在的任务不返回
    async fn resolve_tasks(&self, deps: &Collaborators, task_ids: Vec<i64>)
    -> Result<Vec<(i64, Task)>>;

    /// 每个任务都返回一项，没有资源时为空列表
    async fn resolve_resources(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Vec<TaskResource>)>>;

    async fn resolve_questions(
        &self,
        deps: &Collaborators,
        tasks: Vec<(i64, Vec<TaskResource>)>,
    ) -> Result<Vec<(i64, ResourceQuestions)>>;

    /// 每个任务都返回一项，没有布置时为空列表
    async fn resolve_assignments(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Vec<TaskAssign>)>>;

    /// 没有统计的布置不返回
    async fn resolve_reports(
        &self,
        deps: &Collaborators,
        assign_ids: Vec<i64>,
    ) -> Result<Vec<(i64, TaskReport)>>;

    /// 花名册服务中不存在的班级不返回
    async fn resolve_class_rosters(
        &self,
        deps: &Collaborators,
        class_ids: Vec<i64>,
    ) -> Result<Vec<(i64, ClassInfo)>>;
}

/// 按任务 ID 分组，保证每个请求的任务都有一项
fn group_by_task<T>(
    task_ids: &[i64],
    items: Vec<T>,
    task_of: impl Fn(&T) -> i64,
) -> Vec<(i64, Vec<T>)> {
    let mut grouped: HashMap<i64, Vec<T>> = task_ids.iter().map(|id| (*id, Vec::new())).collect();
    for item in items {
        if let Some(list) = grouped.get_mut(&task_of(&item)) {
            list.push(item);
        }
    }
    task_ids
        .iter()
        .map(|id| (*id, grouped.remove(id).unwrap_or_default()))
        .collect()
}

/// 逐键取数
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleKey;

#[async_trait]
impl FragmentResolver for SingleKey {
    fn name(&self) -> &'static str {
        "single"
    }

    async fn resolve_tasks(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Task)>> {
        let mut result = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            if let Some(task) = deps.tasks.get_task_by_id(task_id).await? {
                result.push((task_id, task));
            }
        }
        Ok(result)
    }

    async fn resolve_resources(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Vec<TaskResource>)>> {
        let mut result = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            let resources = deps.tasks.get_task_resources_by_task_id(task_id).await?;
            result.push((task_id, resources));
        }
        Ok(result)
    }

    async fn resolve_questions(
        &self,
        deps: &Collaborators,
        tasks: Vec<(i64, Vec<TaskResource>)>,
    ) -> Result<Vec<(i64, ResourceQuestions)>> {
        // 每个任务一次题库调用
        let mut result = Vec::with_capacity(tasks.len());
        for task in tasks {
            result.extend(resolve_questions_for(deps, std::slice::from_ref(&task)).await?);
        }
        Ok(result)
    }

    async fn resolve_assignments(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Vec<TaskAssign>)>> {
        let mut result = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            let assigns = deps.assigns.get_task_assigns_by_task_ids(&[task_id]).await?;
            result.push((task_id, assigns));
        }
        Ok(result)
    }

    async fn resolve_reports(
        &self,
        deps: &Collaborators,
        assign_ids: Vec<i64>,
    ) -> Result<Vec<(i64, TaskReport)>> {
        let mut result = Vec::with_capacity(assign_ids.len());
        for assign_id in assign_ids {
            let reports = deps
                .stats
                .get_task_reports_by_task_assign_ids(&[assign_id])
                .await?;
            result.extend(reports.into_iter().map(|r| (r.assign_id, r)));
        }
        Ok(result)
    }

    async fn resolve_class_rosters(
        &self,
        deps: &Collaborators,
        class_ids: Vec<i64>,
    ) -> Result<Vec<(i64, ClassInfo)>> {
        let mut result = Vec::with_capacity(class_ids.len());
        for class_id in class_ids {
            let classes = deps.roster.get_class_students(&[class_id]).await?;
            result.extend(classes.into_iter().map(|c| (c.id, c)));
        }
        Ok(result)
    }
}

/// 批量取数：每类分片一次调用
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchedKey;

#[async_trait]
impl FragmentResolver for BatchedKey {
    fn name(&self) -> &'static str {
        "batched"
    }

    async fn resolve_tasks(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Task)>> {
        let tasks = deps.tasks.get_tasks_by_ids(&task_ids).await?;
        Ok(tasks.into_iter().map(|t| (t.id, t)).collect())
    }

    async fn resolve_resources(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Vec<TaskResource>)>> {
        let resources = deps.tasks.get_task_resources_by_task_ids(&task_ids).await?;
        Ok(group_by_task(&task_ids, resources, |r| r.task_id))
    }

    async fn resolve_questions(
        &self,
        deps: &Collaborators,
        tasks: Vec<(i64, Vec<TaskResource>)>,
    ) -> Result<Vec<(i64, ResourceQuestions)>> {
        resolve_questions_for(deps, &tasks).await
    }

    async fn resolve_assignments(
        &self,
        deps: &Collaborators,
        task_ids: Vec<i64>,
    ) -> Result<Vec<(i64, Vec<TaskAssign>)>> {
        let assigns = deps.assigns.get_task_assigns_by_task_ids(&task_ids).await?;
        Ok(group_by_task(&task_ids, assigns, |a| a.task_id))
    }

    async fn resolve_reports(
        &self,
        deps: &Collaborators,
        assign_ids: Vec<i64>,
    ) -> Result<Vec<(i64, TaskReport)>> {
        let reports = deps
            .stats
            .get_task_reports_by_task_assign_ids(&assign_ids)
            .await?;
        Ok(reports.into_iter().map(|r| (r.assign_id, r)).collect())
    }

    async fn resolve_class_rosters(
        &self,
        deps: &Collaborators,
        class_ids: Vec<i64>,
    ) -> Result<Vec<(i64, ClassInfo)>> {
        let classes = deps.roster.get_class_students(&class_ids).await?;
        Ok(classes.into_iter().map(|c| (c.id, c)).collect())
    }
}
