//! 资源 → 题目解析
//!
//! 单题资源合并为一次题库调用；题集、课程节点逐个调用，走有上限的并发展开。
//! 结果是 `resource_key → question_id → Question` 的索引加上一份扁平有序列表。

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::Collaborators;
use super::fanout::fan_out;
use super::filter::QuestionFilter;
use super::keys;
use crate::errors::{ReportError, Result};
use crate::models::content::entities::{PracticeSet, Question};
use crate::models::tasks::entities::{ResourceType, TaskResource};

/// 一道已解析的题目以及它在任务中的位置
#[derive(Debug, Clone)]
pub struct QuestionSlot {
    pub question_key: String,
    pub resource_key: String,
    pub resource_id: String,
    pub resource_type: ResourceType,
    // 资源记录 ID
    pub resource_seq: i64,
    // 资源内位置
    pub position: i64,
    pub question: Question,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceQuestions {
    slots: Vec<QuestionSlot>,
    index: HashMap<String, HashMap<String, usize>>,
    resource_names: HashMap<String, String>,
}

impl ResourceQuestions {
    fn push(&mut self, slot: QuestionSlot) {
        let position = self.slots.len();
        self.index
            .entry(slot.resource_key.clone())
            .or_default()
            .insert(slot.question.id.clone(), position);
        self.slots.push(slot);
    }

    pub fn slots(&self) -> &[QuestionSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, resource_key: &str, question_id: &str) -> Option<&QuestionSlot> {
        let position = *self.index.get(resource_key)?.get(question_id)?;
        self.slots.get(position)
    }

    pub fn get_by_question_key(&self, question_key: &str) -> Option<&QuestionSlot> {
        let (resource_key, question_id) = keys::parse_question_key(question_key)?;
        self.get(&resource_key, &question_id)
    }

    /// 某个资源下的全部题目，保持顺序
    pub fn slots_of_resource(&self, resource_key: &str) -> Vec<&QuestionSlot> {
        self.slots
            .iter()
            .filter(|s| s.resource_key == resource_key)
            .collect()
    }

    /// 题集 / 课程节点的名称
    pub fn resource_name(&self, resource_key: &str) -> Option<&str> {
        self.resource_names.get(resource_key).map(String::as_str)
    }

    pub fn filtered(&self, filter: &QuestionFilter) -> Vec<QuestionSlot> {
        self.slots
            .iter()
            .filter(|s| filter.matches(&s.question))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum PracticeKind {
    Paper,
    CourseNode,
}

/// 为若干任务解析题目。所有任务的单题资源合并为一次调用。
pub async fn resolve_questions_for(
    deps: &Collaborators,
    tasks: &[(i64, Vec<TaskResource>)],
) -> Result<Vec<(i64, ResourceQuestions)>> {
    let mut question_ids: Vec<String> = Vec::new();
    let mut practice: Vec<(String, String, PracticeKind)> = Vec::new();
    let mut seen_questions = HashSet::new();
    let mut seen_practice = HashSet::new();

    for (_, resources) in tasks {
        for resource in resources {
            match resource.resource_type {
                ResourceType::Question => {
                    if seen_questions.insert(resource.resource_id.clone()) {
                        question_ids.push(resource.resource_id.clone());
                    }
                }
                ResourceType::Paper | ResourceType::CourseNode => {
                    let key = resource.resource_key();
                    if seen_practice.insert(key.clone()) {
                        let kind = if resource.resource_type == ResourceType::Paper {
                            PracticeKind::Paper
                        } else {
                            PracticeKind::CourseNode
                        };
                        practice.push((key, resource.resource_id.clone(), kind));
                    }
                }
            }
        }
    }

    let questions: HashMap<String, Question> = if question_ids.is_empty() {
        HashMap::new()
    } else {
        debug!("Resolving {} question bodies in one call", question_ids.len());
        deps.content
            .get_questions(&question_ids)
            .await?
            .into_iter()
            .map(|q| (q.id.clone(), q))
            .collect()
    };

    let practice_sets: HashMap<String, PracticeSet> = fan_out(
        practice,
        deps.settings.fanout_concurrency,
        |(key, id, kind)| async move {
            let set = match kind {
                PracticeKind::Paper => deps.content.get_practice_set(&id).await?,
                PracticeKind::CourseNode => deps.content.get_node_practice(&id).await?,
            };
            Ok::<_, ReportError>((key, set))
        },
    )
    .await?
    .into_iter()
    .collect();

    Ok(tasks
        .iter()
        .map(|(task_id, resources)| {
            (
                *task_id,
                assemble_task_questions(*task_id, resources, &questions, &practice_sets),
            )
        })
        .collect())
}

fn assemble_task_questions(
    task_id: i64,
    resources: &[TaskResource],
    questions: &HashMap<String, Question>,
    practice_sets: &HashMap<String, PracticeSet>,
) -> ResourceQuestions {
    let mut ordered: Vec<&TaskResource> = resources.iter().collect();
    ordered.sort_by_key(|r| r.id);

    let mut result = ResourceQuestions::default();
    for resource in ordered {
        let resource_key = resource.resource_key();
        let slot = |position: i64, question: Question| QuestionSlot {
            question_key: keys::question_key(&resource_key, &question.id),
            resource_key: resource_key.clone(),
            resource_id: resource.resource_id.clone(),
            resource_type: resource.resource_type,
            resource_seq: resource.id,
            position,
            question,
        };

        match resource.resource_type {
            ResourceType::Question => match questions.get(&resource.resource_id) {
                Some(question) => result.push(slot(0, question.clone())),
                None => warn!(
                    "Question {} of task {} not returned by content service",
                    resource.resource_id, task_id
                ),
            },
            ResourceType::Paper | ResourceType::CourseNode => {
                let Some(set) = practice_sets.get(&resource_key) else {
                    warn!("Practice {} of task {} not resolved", resource_key, task_id);
                    continue;
                };
                if let Some(name) = &set.name {
                    result
                        .resource_names
                        .insert(resource_key.clone(), name.clone());
                }
                for (position, question) in set.questions.iter().enumerate() {
                    result.push(slot(position as i64, question.clone()));
                }
            }
        }
    }
    result
}
