//! 题型 / 关键字过滤
//!
//! 纯函数，不访问任何协作方。题型缺省或为 0 表示全部。

use crate::models::content::entities::Question;
use crate::models::reports::requests::AnswerDetailParams;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub question_type: Option<i32>,
    pub keyword: Option<String>,
}

impl QuestionFilter {
    pub fn new(question_type: Option<i32>, keyword: Option<String>) -> Self {
        Self {
            question_type,
            keyword,
        }
    }

    /// 不做任何过滤
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.wanted_type().is_none() && self.wanted_keyword().is_none()
    }

    fn wanted_type(&self) -> Option<i32> {
        self.question_type.filter(|t| *t != 0)
    }

    fn wanted_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn matches(&self, question: &Question) -> bool {
        let type_ok = self
            .wanted_type()
            .is_none_or(|t| t == question.question_type);
        let keyword_ok = self
            .wanted_keyword()
            .is_none_or(|k| question.stem.contains(k));
        type_ok && keyword_ok
    }
}

impl From<&AnswerDetailParams> for QuestionFilter {
    fn from(params: &AnswerDetailParams) -> Self {
        Self::new(params.question_type, params.keyword.clone())
    }
}

/// 保留满足条件的题目，顺序不变
pub fn filter_questions<'a, I>(questions: I, filter: &QuestionFilter) -> Vec<&'a Question>
where
    I: IntoIterator<Item = &'a Question>,
{
    questions.into_iter().filter(|q| filter.matches(q)).collect()
}
