//! 测试用的内存协作方
//!
//! 一个 `FakeWorld` 同时实现全部存储、客户端和缓存接口，每个操作都有调用计数。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::{Collaborators, ReportSettings};
use crate::cache::{CacheResult, ObjectCache};
use crate::clients::{ContentClient, RosterClient};
use crate::errors::{ReportError, Result};
use crate::models::content::entities::{PracticeSet, Question};
use crate::models::reports::entities::{
    AnswerFilter, AnswerRecord, BehaviorTally, QuestionCounter, StudentReport, TaskReport,
};
use crate::models::roster::entities::{ClassInfo, StudentInfo};
use crate::models::tasks::entities::{GroupType, ResourceType, Task, TaskAssign, TaskResource, TaskType};
use crate::models::tasks::requests::TaskAssignListQuery;
use crate::storage::{AssignStore, BehaviorStore, StatStore, TaskStore};

pub fn question(id: &str, question_type: i32, stem: &str) -> Question {
    Question {
        id: id.to_string(),
        question_type,
        stem: stem.to_string(),
        options: Vec::new(),
        answer: None,
        analysis: None,
        difficulty: None,
        order: None,
    }
}

pub fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, minute, 0)
        .single()
        .unwrap_or_default()
}

macro_rules! counters {
    ($($name:ident),* $(,)?) => {
        #[derive(Default)]
        pub struct Counters {
            $($name: AtomicUsize,)*
        }

        impl Counters {
            $(
                pub fn $name(&self) -> usize {
                    self.$name.load(Ordering::SeqCst)
                }
            )*
        }
    };
}

counters! {
    get_task_by_id,
    get_tasks_by_ids,
    get_latest_task,
    get_task_resources,
    get_task_assign_info,
    get_task_assigns_by_task_ids,
    list_task_assigns,
    get_task_assign_students,
    get_assign_students,
    get_task_assigns_stats,
    get_task_reports,
    get_answer_accuracy,
    get_task_answer_count,
    get_student_reports,
    get_task_assign_answers,
    get_task_student_answers,
    get_behavior_tally,
    get_questions,
    get_practice_set,
    get_node_practice,
    get_class_students,
    get_students,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

#[derive(Default)]
struct Data {
    tasks: Vec<Task>,
    resources: Vec<TaskResource>,
    assigns: Vec<TaskAssign>,
    assign_students: HashMap<i64, Vec<i64>>,
    group_members: HashMap<i64, Vec<i64>>,
    reports: Vec<TaskReport>,
    student_reports: Vec<StudentReport>,
    answers: Vec<AnswerRecord>,
    behaviors: HashMap<(i64, i64, i64), BehaviorTally>,
    questions: HashMap<String, Question>,
    practice_sets: HashMap<String, PracticeSet>,
    classes: Vec<ClassInfo>,
    students: HashMap<i64, StudentInfo>,
    latest_task: Option<i64>,
}

#[derive(Default)]
pub struct FakeState {
    data: Mutex<Data>,
    cache: Mutex<HashMap<String, String>>,
    cache_broken: AtomicBool,
    content_down: AtomicBool,
    pub counters: Counters,
}

/// 测试场景
pub struct FakeWorld {
    state: Arc<FakeState>,
    pub counters: CountersHandle,
    next_answer_id: AtomicUsize,
}

/// 对计数器的共享引用
pub struct CountersHandle(Arc<FakeState>);

impl std::ops::Deref for CountersHandle {
    type Target = Counters;

    fn deref(&self) -> &Counters {
        &self.0.counters
    }
}

impl FakeWorld {
    pub fn new() -> Self {
        let state = Arc::new(FakeState::default());
        Self {
            counters: CountersHandle(state.clone()),
            state,
            next_answer_id: AtomicUsize::new(1),
        }
    }

    fn with_data(&self, f: impl FnOnce(&mut Data)) {
        let mut data = self.state.data.lock().unwrap();
        f(&mut data);
    }

    pub fn collaborators(&self) -> Collaborators {
        self.collaborators_with(ReportSettings {
            guidance_above: "继续保持".to_string(),
            guidance_below: "多加练习".to_string(),
            ..ReportSettings::default()
        })
    }

    pub fn collaborators_with(&self, settings: ReportSettings) -> Collaborators {
        Collaborators {
            tasks: self.state.clone(),
            assigns: self.state.clone(),
            stats: self.state.clone(),
            behaviors: self.state.clone(),
            content: self.state.clone(),
            roster: self.state.clone(),
            cache: self.state.clone(),
            settings,
        }
    }

    pub fn add_task(&self, id: i64, task_type: TaskType, name: &str) {
        self.with_data(|d| {
            d.tasks.push(Task {
                id,
                task_type,
                subject_id: 1,
                creator_id: 1,
                name: name.to_string(),
                comment: None,
                created_at: at_minute(0),
            })
        });
    }

    pub fn set_latest_task(&self, task_id: i64) {
        self.with_data(|d| d.latest_task = Some(task_id));
    }

    pub fn add_task_resource(&self, task_id: i64, record_id: i64, resource_id: &str, resource_type: ResourceType) {
        self.with_data(|d| {
            d.resources.push(TaskResource {
                id: record_id,
                task_id,
                resource_id: resource_id.to_string(),
                resource_type,
                created_at: at_minute(0),
            })
        });
    }

    pub fn resources_of(&self, task_id: i64) -> Vec<TaskResource> {
        let data = self.state.data.lock().unwrap();
        data.resources
            .iter()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect()
    }

    pub fn add_assign(&self, id: i64, task_id: i64, group_type: GroupType, group_id: i64) {
        self.add_assign_at(id, task_id, group_type, group_id, at_minute(0));
    }

    pub fn add_assign_at(
        &self,
        id: i64,
        task_id: i64,
        group_type: GroupType,
        group_id: i64,
        start_time: DateTime<Utc>,
    ) {
        self.with_data(|d| {
            d.assigns.push(TaskAssign {
                id,
                task_id,
                group_type,
                group_id,
                start_time,
                deadline: None,
                created_at: start_time,
            })
        });
    }

    pub fn add_assign_students(&self, assign_id: i64, student_ids: &[i64]) {
        self.with_data(|d| {
            d.assign_students.insert(assign_id, student_ids.to_vec());
        });
    }

    pub fn add_group_members(&self, group_id: i64, student_ids: &[i64]) {
        self.with_data(|d| {
            d.group_members.insert(group_id, student_ids.to_vec());
        });
    }

    pub fn add_class(&self, id: i64, name: &str, students: &[(i64, &str)]) {
        self.with_data(|d| {
            let students: Vec<StudentInfo> = students
                .iter()
                .map(|(sid, sname)| StudentInfo {
                    id: *sid,
                    name: sname.to_string(),
                    avatar: format!("https://avatar.example/{sid}.png"),
                })
                .collect();
            for student in &students {
                d.students.insert(student.id, student.clone());
            }
            d.classes.push(ClassInfo {
                id,
                name: name.to_string(),
                students,
            });
        });
    }

    pub fn add_question(&self, question: Question) {
        self.with_data(|d| {
            d.questions.insert(question.id.clone(), question);
        });
    }

    pub fn add_practice_set(&self, id: &str, name: Option<&str>, questions: Vec<Question>) {
        self.with_data(|d| {
            d.practice_sets.insert(
                id.to_string(),
                PracticeSet {
                    id: id.to_string(),
                    name: name.map(str::to_string),
                    questions,
                },
            );
        });
    }

    pub fn add_task_report(&self, report: TaskReport) {
        self.with_data(|d| d.reports.push(report));
    }

    pub fn add_student_report(&self, report: StudentReport) {
        self.with_data(|d| d.student_reports.push(report));
    }

    pub fn set_behavior(&self, task_id: i64, assign_id: i64, student_id: i64, tally: BehaviorTally) {
        self.with_data(|d| {
            d.behaviors.insert((task_id, assign_id, student_id), tally);
        });
    }

    /// 记录一次单题资源上的作答
    #[allow(clippy::too_many_arguments)]
    pub fn answer(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
        resource_id: &str,
        resource_type: ResourceType,
        question_id: &str,
        correct: bool,
        cost_time: i64,
        minute: u32,
    ) {
        let id = self.next_answer_id.fetch_add(1, Ordering::SeqCst) as i64;
        self.with_data(|d| {
            d.answers.push(AnswerRecord {
                id,
                task_id,
                assign_id,
                student_id,
                resource_id: resource_id.to_string(),
                resource_type,
                question_id: question_id.to_string(),
                answer: if correct { "A" } else { "B" }.to_string(),
                correct,
                cost_time,
                answered_at: at_minute(minute),
            })
        });
    }

    pub fn cache_value(&self, key: &str) -> Option<String> {
        self.state.cache.lock().unwrap().get(key).cloned()
    }

    pub fn put_cache(&self, key: &str, value: &str) {
        self.state
            .cache
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn break_cache(&self) {
        self.state.cache_broken.store(true, Ordering::SeqCst);
    }

    pub fn break_content(&self) {
        self.state.content_down.store(true, Ordering::SeqCst);
    }
}

impl FakeState {
    fn data(&self) -> std::sync::MutexGuard<'_, Data> {
        self.data.lock().unwrap()
    }
}

#[async_trait]
impl TaskStore for FakeState {
    async fn get_task_by_id(&self, task_id: i64) -> Result<Option<Task>> {
        bump(&self.counters.get_task_by_id);
        Ok(self.data().tasks.iter().find(|t| t.id == task_id).cloned())
    }

    async fn get_tasks_by_ids(&self, task_ids: &[i64]) -> Result<Vec<Task>> {
        bump(&self.counters.get_tasks_by_ids);
        Ok(self
            .data()
            .tasks
            .iter()
            .filter(|t| task_ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn get_latest_task(&self, _creator_id: i64, _subject_id: Option<i64>) -> Result<Option<Task>> {
        bump(&self.counters.get_latest_task);
        let data = self.data();
        Ok(data
            .latest_task
            .and_then(|id| data.tasks.iter().find(|t| t.id == id).cloned()))
    }

    async fn get_task_resources_by_task_id(&self, task_id: i64) -> Result<Vec<TaskResource>> {
        bump(&self.counters.get_task_resources);
        Ok(self
            .data()
            .resources
            .iter()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn get_task_resources_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<TaskResource>> {
        bump(&self.counters.get_task_resources);
        Ok(self
            .data()
            .resources
            .iter()
            .filter(|r| task_ids.contains(&r.task_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignStore for FakeState {
    async fn get_task_assign_info(&self, _task_id: i64, assign_id: i64) -> Result<Option<TaskAssign>> {
        bump(&self.counters.get_task_assign_info);
        Ok(self.data().assigns.iter().find(|a| a.id == assign_id).cloned())
    }

    async fn get_task_assigns_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<TaskAssign>> {
        bump(&self.counters.get_task_assigns_by_task_ids);
        Ok(self
            .data()
            .assigns
            .iter()
            .filter(|a| task_ids.contains(&a.task_id))
            .cloned()
            .collect())
    }

    async fn list_task_assigns(&self, query: TaskAssignListQuery) -> Result<(Vec<TaskAssign>, i64)> {
        bump(&self.counters.list_task_assigns);
        let data = self.data();
        // 与数据库实现一致：按最近布置开始时间倒序，再按任务 ID 倒序
        let mut ranked: Vec<(DateTime<Utc>, i64)> = data
            .tasks
            .iter()
            .filter(|t| t.creator_id == query.creator_id)
            .filter(|t| query.task_type.is_none_or(|c| t.task_type.code() == c))
            .filter_map(|t| {
                data.assigns
                    .iter()
                    .filter(|a| a.task_id == t.id)
                    .map(|a| a.start_time)
                    .max()
                    .map(|latest| (latest, t.id))
            })
            .collect();
        ranked.sort_unstable_by(|a, b| b.cmp(a));
        let task_ids: Vec<i64> = ranked.into_iter().map(|(_, id)| id).collect();
        let total = task_ids.len() as i64;
        let size = query.size.unwrap_or(10).max(1) as usize;
        let page = query.page.unwrap_or(1).max(1) as usize;
        let page_ids: Vec<i64> = task_ids.into_iter().skip((page - 1) * size).take(size).collect();
        Ok((
            data.assigns
                .iter()
                .filter(|a| page_ids.contains(&a.task_id))
                .cloned()
                .collect(),
            total,
        ))
    }

    async fn get_task_assign_students(&self, assign_id: i64) -> Result<Vec<i64>> {
        bump(&self.counters.get_task_assign_students);
        Ok(self.data().assign_students.get(&assign_id).cloned().unwrap_or_default())
    }

    async fn get_assign_students(&self, group_id: i64) -> Result<Vec<i64>> {
        bump(&self.counters.get_assign_students);
        Ok(self.data().group_members.get(&group_id).cloned().unwrap_or_default())
    }
}

impl FakeState {
    fn latest_answers(&self, task_id: i64, assign_id: i64) -> Vec<AnswerRecord> {
        let records: Vec<AnswerRecord> = self
            .data()
            .answers
            .iter()
            .filter(|a| a.task_id == task_id && a.assign_id == assign_id)
            .cloned()
            .collect();
        crate::models::reports::attempts::latest_attempts(records)
    }
}

#[async_trait]
impl StatStore for FakeState {
    async fn get_task_assigns_stats(&self, assign_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        bump(&self.counters.get_task_assigns_stats);
        let data = self.data();
        let mut result = HashMap::new();
        for assign_id in assign_ids {
            let mut students: Vec<i64> = data
                .answers
                .iter()
                .filter(|a| a.assign_id == *assign_id)
                .map(|a| a.student_id)
                .collect();
            students.sort_unstable();
            students.dedup();
            result.insert(*assign_id, students.len() as i64);
        }
        Ok(result)
    }

    async fn get_task_reports_by_task_assign_ids(&self, assign_ids: &[i64]) -> Result<Vec<TaskReport>> {
        bump(&self.counters.get_task_reports);
        Ok(self
            .data()
            .reports
            .iter()
            .filter(|r| assign_ids.contains(&r.assign_id))
            .cloned()
            .collect())
    }

    async fn get_task_answer_accuracy_by_resource(
        &self,
        task_id: i64,
        assign_id: i64,
        resources: &[(String, ResourceType)],
    ) -> Result<Vec<QuestionCounter>> {
        bump(&self.counters.get_answer_accuracy);
        let records: Vec<AnswerRecord> = self
            .latest_answers(task_id, assign_id)
            .into_iter()
            .filter(|a| {
                resources
                    .iter()
                    .any(|(id, ty)| *id == a.resource_id && *ty == a.resource_type)
            })
            .collect();
        Ok(crate::models::reports::attempts::counters_from_answers(&records))
    }

    async fn get_task_answer_count(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        bump(&self.counters.get_task_answer_count);
        let mut result = HashMap::new();
        for record in self.latest_answers(task_id, assign_id) {
            if student_ids.contains(&record.student_id) {
                *result.entry(record.student_id).or_insert(0) += 1;
            }
        }
        Ok(result)
    }

    async fn get_task_assign_student_reports(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<StudentReport>> {
        bump(&self.counters.get_student_reports);
        Ok(self
            .data()
            .student_reports
            .iter()
            .filter(|r| r.task_id == task_id && r.assign_id == assign_id)
            .filter(|r| student_ids.contains(&r.student_id))
            .cloned()
            .collect())
    }

    async fn get_task_assign_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        filter: &AnswerFilter,
    ) -> Result<Vec<AnswerRecord>> {
        bump(&self.counters.get_task_assign_answers);
        Ok(self
            .data()
            .answers
            .iter()
            .filter(|a| a.task_id == task_id && a.assign_id == assign_id)
            .filter(|a| filter.student_id.is_none_or(|s| s == a.student_id))
            .filter(|a| {
                filter
                    .resource
                    .as_ref()
                    .is_none_or(|(id, ty)| *id == a.resource_id && *ty == a.resource_type)
            })
            .cloned()
            .collect())
    }

    async fn get_task_student_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> Result<Vec<AnswerRecord>> {
        bump(&self.counters.get_task_student_answers);
        Ok(self
            .data()
            .answers
            .iter()
            .filter(|a| a.task_id == task_id && a.assign_id == assign_id && a.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BehaviorStore for FakeState {
    async fn get_behavior_tally(&self, task_id: i64, assign_id: i64, student_id: i64) -> Result<BehaviorTally> {
        bump(&self.counters.get_behavior_tally);
        Ok(self
            .data()
            .behaviors
            .get(&(task_id, assign_id, student_id))
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ContentClient for FakeState {
    async fn get_questions(&self, question_ids: &[String]) -> Result<Vec<Question>> {
        bump(&self.counters.get_questions);
        if self.content_down.load(Ordering::SeqCst) {
            return Err(ReportError::upstream_failure("content service unavailable"));
        }
        let data = self.data();
        Ok(question_ids
            .iter()
            .filter_map(|id| data.questions.get(id).cloned())
            .collect())
    }

    async fn get_practice_set(&self, practice_id: &str) -> Result<PracticeSet> {
        bump(&self.counters.get_practice_set);
        self.data()
            .practice_sets
            .get(practice_id)
            .cloned()
            .ok_or_else(|| ReportError::upstream_failure(format!("practice {practice_id} not found")))
    }

    async fn get_node_practice(&self, node_id: &str) -> Result<PracticeSet> {
        bump(&self.counters.get_node_practice);
        self.data()
            .practice_sets
            .get(node_id)
            .cloned()
            .ok_or_else(|| ReportError::upstream_failure(format!("node {node_id} not found")))
    }
}

#[async_trait]
impl RosterClient for FakeState {
    async fn get_class_students(&self, class_ids: &[i64]) -> Result<Vec<ClassInfo>> {
        bump(&self.counters.get_class_students);
        Ok(self
            .data()
            .classes
            .iter()
            .filter(|c| class_ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn get_students(&self, student_ids: &[i64]) -> Result<Vec<StudentInfo>> {
        bump(&self.counters.get_students);
        let data = self.data();
        Ok(student_ids
            .iter()
            .filter_map(|id| data.students.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl ObjectCache for FakeState {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if self.cache_broken.load(Ordering::SeqCst) {
            return CacheResult::ExistsButNoValue;
        }
        match self.cache.lock().unwrap().get(key) {
            Some(value) => CacheResult::Found(value.clone()),
            None => CacheResult::NotFound,
        }
    }

    async fn insert_raw(&self, key: String, value: String, _ttl: u64) {
        if self.cache_broken.load(Ordering::SeqCst) {
            return;
        }
        self.cache.lock().unwrap().insert(key, value);
    }

    async fn remove(&self, key: &str) {
        self.cache.lock().unwrap().remove(key);
    }

    async fn invalidate_all(&self) {
        self.cache.lock().unwrap().clear();
    }
}
