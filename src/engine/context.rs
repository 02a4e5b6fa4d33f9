//! 单个请求的取数上下文
//!
//! 每类数据对应一个 [`Fragment`]，所有加载函数都先查分片再决定是否调用协作方。
//! 上下文只属于一个请求，请求结束即丢弃，因此不需要任何锁。
//! 加载函数之间不假设调用顺序：需要某个分片就显式调用它的加载函数。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::Collaborators;
use super::answers::counters_by_key;
use super::filter::QuestionFilter;
use super::fragment::Fragment;
use super::questions::{QuestionSlot, ResourceQuestions};
use super::resolver::FragmentResolver;
use crate::errors::{ReportError, Result};
use crate::models::reports::attempts::latest_attempts;
use crate::models::reports::entities::{
    AnswerFilter, AnswerRecord, QuestionCounter, StudentReport, TaskReport,
};
use crate::models::roster::entities::{ClassInfo, StudentInfo};
use crate::models::tasks::entities::{GroupType, Task, TaskAssign, TaskResource};

/// 布置范围：某一次布置，或任务的全部布置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignScope {
    One(i64),
    All,
}

/// 一次布置对应的学生名单
#[derive(Debug, Clone)]
pub struct AssignRoster {
    pub assign_id: i64,
    pub group_type: GroupType,
    pub group_name: String,
    pub students: Vec<StudentInfo>,
}

impl AssignRoster {
    pub fn student_ids(&self) -> Vec<i64> {
        self.students.iter().map(|s| s.id).collect()
    }

    pub fn names(&self) -> HashMap<i64, String> {
        self.students
            .iter()
            .map(|s| (s.id, s.name.clone()))
            .collect()
    }
}

pub struct ReportContext<'a> {
    deps: &'a Collaborators,
    resolver: &'a dyn FragmentResolver,
    tasks: Fragment<i64, Task>,
    resources: Fragment<i64, Arc<Vec<TaskResource>>>,
    questions: Fragment<i64, Arc<ResourceQuestions>>,
    // 任务 → 全部布置
    task_assigns: Fragment<i64, Vec<TaskAssign>>,
    // 布置 ID → 布置（单次布置查询）
    assigns: Fragment<i64, TaskAssign>,
    rosters: Fragment<i64, AssignRoster>,
    class_rosters: Fragment<i64, ClassInfo>,
    reports: Fragment<i64, TaskReport>,
    accuracy: Fragment<i64, Arc<HashMap<String, QuestionCounter>>>,
    answers: Fragment<i64, Arc<Vec<AnswerRecord>>>,
    student_reports: Fragment<(i64, i64), StudentReport>,
}

impl<'a> ReportContext<'a> {
    pub fn new(deps: &'a Collaborators, resolver: &'a dyn FragmentResolver) -> Self {
        debug!("New report context with {} resolver", resolver.name());
        Self {
            deps,
            resolver,
            tasks: Fragment::new("tasks"),
            resources: Fragment::new("resources"),
            questions: Fragment::new("questions"),
            task_assigns: Fragment::new("task_assigns"),
            assigns: Fragment::new("assigns"),
            rosters: Fragment::new("rosters"),
            class_rosters: Fragment::new("class_rosters"),
            reports: Fragment::new("reports"),
            accuracy: Fragment::new("accuracy"),
            answers: Fragment::new("answers"),
            student_reports: Fragment::new("student_reports"),
        }
    }

    pub fn deps(&self) -> &'a Collaborators {
        self.deps
    }

    /// 任务不存在时返回 NotFound
    pub async fn get_task_data(&mut self, task_id: i64) -> Result<Task> {
        let (deps, resolver) = (self.deps, self.resolver);
        self.tasks
            .fetch_missing(&[task_id], |ids| resolver.resolve_tasks(deps, ids))
            .await?;
        self.tasks
            .get(&task_id)
            .cloned()
            .ok_or_else(|| ReportError::not_found(format!("任务不存在: {task_id}")))
    }

    /// 批量加载任务。调用方已有的布置记录会预填到布置分片，省去一次查询。
    /// 不存在的任务记录警告后跳过。
    pub async fn get_tasks_data(
        &mut self,
        task_ids: &[i64],
        assigns: Option<Vec<TaskAssign>>,
    ) -> Result<Vec<Task>> {
        if let Some(assigns) = assigns {
            let mut grouped: HashMap<i64, Vec<TaskAssign>> =
                task_ids.iter().map(|id| (*id, Vec::new())).collect();
            for assign in assigns {
                if let Some(list) = grouped.get_mut(&assign.task_id) {
                    list.push(assign);
                }
            }
            for (task_id, list) in grouped {
                self.task_assigns.seed(task_id, list);
            }
        }

        let (deps, resolver) = (self.deps, self.resolver);
        self.tasks
            .fetch_missing(task_ids, |ids| resolver.resolve_tasks(deps, ids))
            .await?;

        for task_id in self.tasks.absent(task_ids) {
            warn!(
                "{}",
                ReportError::partial_data_missing(format!("任务 {task_id} 不存在，已跳过"))
            );
        }
        Ok(task_ids
            .iter()
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect())
    }

    async fn prefetch_resources(&mut self, task_ids: &[i64]) -> Result<()> {
        let (deps, resolver) = (self.deps, self.resolver);
        self.resources
            .fetch_missing(task_ids, |ids| async move {
                let fetched = resolver.resolve_resources(deps, ids).await?;
                Ok::<_, ReportError>(
                    fetched
                        .into_iter()
                        .map(|(task_id, mut list)| {
                            // 资源记录 ID 即挂载顺序
                            list.sort_by_key(|r| r.id);
                            (task_id, Arc::new(list))
                        })
                        .collect(),
                )
            })
            .await
    }

    /// 任务资源，按挂载顺序排列
    pub async fn get_resources(&mut self, task_id: i64) -> Result<Arc<Vec<TaskResource>>> {
        self.prefetch_resources(&[task_id]).await?;
        Ok(self.resources.get(&task_id).cloned().unwrap_or_default())
    }

    async fn prefetch_questions(&mut self, task_ids: &[i64]) -> Result<()> {
        let missing: Vec<i64> = task_ids
            .iter()
            .copied()
            .filter(|id| !self.questions.is_resolved(id))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        self.prefetch_resources(&missing).await?;

        let inputs: Vec<(i64, Vec<TaskResource>)> = missing
            .iter()
            .map(|id| {
                let resources = self
                    .resources
                    .get(id)
                    .map(|list| list.as_ref().clone())
                    .unwrap_or_default();
                (*id, resources)
            })
            .collect();

        let (deps, resolver) = (self.deps, self.resolver);
        self.questions
            .fetch_missing(&missing, |_| async move {
                let resolved = resolver.resolve_questions(deps, inputs).await?;
                Ok::<_, ReportError>(
                    resolved
                        .into_iter()
                        .map(|(task_id, questions)| (task_id, Arc::new(questions)))
                        .collect(),
                )
            })
            .await
    }

    /// 任务的全部题目（未过滤）
    pub async fn get_all_questions(&mut self, task_id: i64) -> Result<Arc<ResourceQuestions>> {
        self.prefetch_questions(&[task_id]).await?;
        Ok(self.questions.get(&task_id).cloned().unwrap_or_default())
    }

    /// 多个任务的题目，批量解析器下合并为一次题库调用
    pub async fn get_tasks_questions(
        &mut self,
        task_ids: &[i64],
    ) -> Result<HashMap<i64, Arc<ResourceQuestions>>> {
        self.prefetch_questions(task_ids).await?;
        Ok(task_ids
            .iter()
            .map(|id| (*id, self.questions.get(id).cloned().unwrap_or_default()))
            .collect())
    }

    /// 按题型 / 关键字过滤后的题目，保持挂载顺序
    pub async fn get_resource_questions(
        &mut self,
        task_id: i64,
        filter: &QuestionFilter,
    ) -> Result<Vec<QuestionSlot>> {
        let questions = self.get_all_questions(task_id).await?;
        Ok(questions.filtered(filter))
    }

    async fn prefetch_assignments(&mut self, task_ids: &[i64]) -> Result<()> {
        let (deps, resolver) = (self.deps, self.resolver);
        self.task_assigns
            .fetch_missing(task_ids, |ids| resolver.resolve_assignments(deps, ids))
            .await
    }

    /// 单次布置不存在或不属于该任务时返回 NotFound
    pub async fn get_assign_data(
        &mut self,
        task_id: i64,
        scope: AssignScope,
    ) -> Result<Vec<TaskAssign>> {
        match scope {
            AssignScope::All => {
                self.prefetch_assignments(&[task_id]).await?;
                Ok(self.task_assigns.get(&task_id).cloned().unwrap_or_default())
            }
            AssignScope::One(assign_id) => {
                // 已经加载过整个任务的布置时直接复用
                if let Some(found) = self
                    .task_assigns
                    .get(&task_id)
                    .and_then(|list| list.iter().find(|a| a.id == assign_id))
                {
                    return Ok(vec![found.clone()]);
                }

                let deps = self.deps;
                let assign = self
                    .assigns
                    .get_or_fetch(assign_id, || {
                        deps.assigns.get_task_assign_info(task_id, assign_id)
                    })
                    .await?
                    .filter(|a| a.task_id == task_id)
                    .cloned()
                    .ok_or_else(|| {
                        ReportError::not_found(format!(
                            "布置不存在: task={task_id}, assign={assign_id}"
                        ))
                    })?;
                Ok(vec![assign])
            }
        }
    }

    /// 多个任务的全部布置
    pub async fn get_tasks_assign_data(
        &mut self,
        task_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<TaskAssign>>> {
        self.prefetch_assignments(task_ids).await?;
        Ok(task_ids
            .iter()
            .map(|id| (*id, self.task_assigns.get(id).cloned().unwrap_or_default()))
            .collect())
    }

    pub async fn get_assign_class_info(
        &mut self,
        task_id: i64,
        scope: AssignScope,
    ) -> Result<Vec<AssignRoster>> {
        let assigns = self.get_assign_data(task_id, scope).await?;
        self.get_rosters(&assigns).await
    }

    /// 班级布置走批量花名册；指定学生 / 临时小组只有学生 ID，姓名头像留空
    pub async fn get_rosters(&mut self, assigns: &[TaskAssign]) -> Result<Vec<AssignRoster>> {
        let pending: Vec<&TaskAssign> = assigns
            .iter()
            .filter(|a| !self.rosters.is_resolved(&a.id))
            .collect();

        let mut class_ids: Vec<i64> = Vec::new();
        let mut seen = HashSet::new();
        for assign in &pending {
            if assign.group_type == GroupType::Class && seen.insert(assign.group_id) {
                class_ids.push(assign.group_id);
            }
        }
        if !class_ids.is_empty() {
            let (deps, resolver) = (self.deps, self.resolver);
            self.class_rosters
                .fetch_missing(&class_ids, |ids| resolver.resolve_class_rosters(deps, ids))
                .await?;
        }

        let deps = self.deps;
        let class_rosters = &self.class_rosters;
        let rosters = &mut self.rosters;
        for assign in pending {
            rosters
                .get_or_fetch(assign.id, || async move {
                    let roster = match assign.group_type {
                        GroupType::Class => match class_rosters.get(&assign.group_id) {
                            Some(class) => AssignRoster {
                                assign_id: assign.id,
                                group_type: assign.group_type,
                                group_name: class.name.clone(),
                                students: class.students.clone(),
                            },
                            None => {
                                warn!(
                                    "{}",
                                    ReportError::partial_data_missing(format!(
                                        "班级 {} 的花名册不存在，按空名单处理",
                                        assign.group_id
                                    ))
                                );
                                empty_roster(assign)
                            }
                        },
                        GroupType::Student => {
                            let ids = deps.assigns.get_task_assign_students(assign.id).await?;
                            id_only_roster(assign, ids)
                        }
                        GroupType::Temp => {
                            let ids = deps.assigns.get_assign_students(assign.group_id).await?;
                            id_only_roster(assign, ids)
                        }
                    };
                    Ok::<_, ReportError>(Some(roster))
                })
                .await?;
        }

        Ok(assigns
            .iter()
            .map(|a| {
                self.rosters
                    .get(&a.id)
                    .cloned()
                    .unwrap_or_else(|| empty_roster(a))
            })
            .collect())
    }

    /// 批量读取布置统计，只查询仍缺失的布置；没有统计的按默认值处理
    pub async fn get_assign_reports(
        &mut self,
        assigns: &[TaskAssign],
    ) -> Result<HashMap<i64, TaskReport>> {
        let assign_ids: Vec<i64> = assigns.iter().map(|a| a.id).collect();
        let (deps, resolver) = (self.deps, self.resolver);
        self.reports
            .fetch_missing(&assign_ids, |ids| resolver.resolve_reports(deps, ids))
            .await?;

        Ok(assigns
            .iter()
            .map(|assign| {
                let report = match self.reports.get(&assign.id) {
                    Some(report) => report.clone(),
                    None => {
                        warn!(
                            "{}",
                            ReportError::partial_data_missing(format!(
                                "布置 {} 暂无统计，按默认值处理",
                                assign.id
                            ))
                        );
                        TaskReport::empty(assign.task_id, assign.id)
                    }
                };
                (assign.id, report)
            })
            .collect())
    }

    pub async fn get_assign_report(&mut self, assign: &TaskAssign) -> Result<TaskReport> {
        let mut reports = self.get_assign_reports(std::slice::from_ref(assign)).await?;
        Ok(reports
            .remove(&assign.id)
            .unwrap_or_else(|| TaskReport::empty(assign.task_id, assign.id)))
    }

    /// 某次布置下每道题的计数，键为题目键
    pub async fn get_assign_answer_accuracy(
        &mut self,
        task_id: i64,
        assign_id: i64,
    ) -> Result<Arc<HashMap<String, QuestionCounter>>> {
        if !self.accuracy.is_resolved(&assign_id) {
            let resources = self.get_resources(task_id).await?;
            let by_resource: Vec<_> = resources
                .iter()
                .map(|r| (r.resource_id.clone(), r.resource_type))
                .collect();
            let deps = self.deps;
            self.accuracy
                .get_or_fetch(assign_id, || async move {
                    if by_resource.is_empty() {
                        return Ok(Some(Arc::new(HashMap::new())));
                    }
                    let counters = deps
                        .stats
                        .get_task_answer_accuracy_by_resource(task_id, assign_id, &by_resource)
                        .await?;
                    Ok::<_, ReportError>(Some(Arc::new(counters_by_key(counters))))
                })
                .await?;
        }
        Ok(self.accuracy.get(&assign_id).cloned().unwrap_or_default())
    }

    /// 布置范围内每个学生每道题的最后一次作答
    pub async fn get_assign_answers(
        &mut self,
        task_id: i64,
        assign_id: i64,
    ) -> Result<Arc<Vec<AnswerRecord>>> {
        let deps = self.deps;
        let answers = self
            .answers
            .get_or_fetch(assign_id, || async move {
                let records = deps
                    .stats
                    .get_task_assign_answers(task_id, assign_id, &AnswerFilter::default())
                    .await?;
                Ok::<_, ReportError>(Some(Arc::new(latest_attempts(records))))
            })
            .await?;
        Ok(answers.cloned().unwrap_or_default())
    }

    /// 学生统计，只查询仍缺失的学生；没有记录的学生不出现在结果中
    pub async fn get_student_reports(
        &mut self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, StudentReport>> {
        let keys: Vec<(i64, i64)> = student_ids.iter().map(|s| (assign_id, *s)).collect();
        let deps = self.deps;
        self.student_reports
            .fetch_missing(&keys, |missing| async move {
                let ids: Vec<i64> = missing.iter().map(|(_, s)| *s).collect();
                let reports = deps
                    .stats
                    .get_task_assign_student_reports(task_id, assign_id, &ids)
                    .await?;
                Ok::<_, ReportError>(
                    reports
                        .into_iter()
                        .map(|r| ((assign_id, r.student_id), r))
                        .collect(),
                )
            })
            .await?;

        Ok(keys
            .iter()
            .filter_map(|key| {
                self.student_reports
                    .get(key)
                    .map(|report| (key.1, report.clone()))
            })
            .collect())
    }
}

fn empty_roster(assign: &TaskAssign) -> AssignRoster {
    AssignRoster {
        assign_id: assign.id,
        group_type: assign.group_type,
        group_name: assign.group_type.label().to_string(),
        students: Vec::new(),
    }
}

fn id_only_roster(assign: &TaskAssign, ids: Vec<i64>) -> AssignRoster {
    AssignRoster {
        assign_id: assign.id,
        group_type: assign.group_type,
        group_name: assign.group_type.label().to_string(),
        students: ids.into_iter().map(StudentInfo::id_only).collect(),
    }
}
