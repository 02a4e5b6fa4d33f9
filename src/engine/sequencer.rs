//! 题目排序与编号
//!
//! 先按任务类型确定主顺序并编号（从 1 开始连续），
//! 调用方给出可识别的排序字段时再按该字段重排输出。

use std::cmp::Ordering;

use crate::models::reports::responses::QuestionAnswer;
use crate::models::tasks::entities::TaskType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// 只认 `desc`（忽略大小写），其余一律升序
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSortKey {
    AnswerCount,
    IncorrectCount,
}

impl AnswerSortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "answerCount" => Some(AnswerSortKey::AnswerCount),
            "incorrectCount" => Some(AnswerSortKey::IncorrectCount),
            _ => None,
        }
    }

    fn value_of(self, question: &QuestionAnswer) -> i64 {
        match self {
            AnswerSortKey::AnswerCount => question.answer_count,
            AnswerSortKey::IncorrectCount => question.incorrect_count,
        }
    }
}

/// 调用方指定的排序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOverride {
    pub key: AnswerSortKey,
    pub order: SortOrder,
}

impl SortOverride {
    /// 排序字段缺失或无法识别时返回 None，保持主顺序
    pub fn from_params(sort_key: Option<&str>, sort_order: Option<&str>) -> Option<Self> {
        let key = AnswerSortKey::parse(sort_key?)?;
        Some(Self {
            key,
            order: SortOrder::parse(sort_order),
        })
    }
}

/// 按任务类型排序并编号，再应用调用方排序
pub fn sequence(
    task_type: TaskType,
    questions: Vec<QuestionAnswer>,
    sort: Option<SortOverride>,
) -> Vec<QuestionAnswer> {
    sequence_retain(task_type, questions, |_| true, sort)
}

/// 先在完整题目集合上编号，再按 `keep` 过滤，最后应用调用方排序。
/// 过滤不会改变留下题目的编号。
pub fn sequence_retain(
    task_type: TaskType,
    mut questions: Vec<QuestionAnswer>,
    keep: impl Fn(&QuestionAnswer) -> bool,
    sort: Option<SortOverride>,
) -> Vec<QuestionAnswer> {
    match task_type {
        // 题库给出的 order 可能有空缺，没有 order 的排在最后
        TaskType::Course => questions.sort_by(|a, b| match (a.question.order, b.question.order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        TaskType::Homework => {
            questions.sort_by_key(|q| (q.resource_seq, q.position));
        }
        TaskType::Paper | TaskType::Other => {}
    }

    for (i, question) in questions.iter_mut().enumerate() {
        question.index = i as i64 + 1;
    }
    questions.retain(|q| keep(q));

    if let Some(sort) = sort {
        // 稳定排序，相同计数保持编号顺序
        questions.sort_by(|a, b| {
            sort.order
                .apply(sort.key.value_of(a).cmp(&sort.key.value_of(b)))
        });
    }
    questions
}
