use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ContentClient, ServiceHttp};
use crate::config::UpstreamServiceConfig;
use crate::errors::{ReportError, Result};
use crate::models::content::entities::{PracticeSet, Question};

const SERVICE: &str = "content service";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: Option<String>,
    #[serde(rename = "type")]
    question_type: Option<i32>,
    stem: Option<String>,
    options: Option<Vec<String>>,
    answer: Option<String>,
    analysis: Option<String>,
    difficulty: Option<i32>,
    order: Option<i64>,
}

impl RawQuestion {
    fn validate(self) -> Result<Question> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ReportError::upstream_failure(format!("{SERVICE}: question without id")))?;
        Ok(Question {
            id,
            question_type: self.question_type.unwrap_or_default(),
            stem: self.stem.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            answer: self.answer,
            analysis: self.analysis,
            difficulty: self.difficulty.filter(|d| (1..=5).contains(d)),
            order: self.order,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPracticeSet {
    id: Option<String>,
    name: Option<String>,
    questions: Option<Vec<RawQuestion>>,
}

impl RawPracticeSet {
    fn validate(self, requested_id: &str) -> Result<PracticeSet> {
        // 部分接口不回传 ID，以请求的 ID 为准
        let id = self.id.unwrap_or_else(|| requested_id.to_string());
        if id != requested_id {
            return Err(ReportError::upstream_failure(format!(
                "{SERVICE}: requested practice {requested_id}, got {id}"
            )));
        }
        let questions = self
            .questions
            .unwrap_or_default()
            .into_iter()
            .map(RawQuestion::validate)
            .collect::<Result<Vec<_>>>()?;
        Ok(PracticeSet {
            id,
            name: self.name,
            questions,
        })
    }
}

#[derive(Serialize)]
struct QuestionBatchRequest<'a> {
    ids: &'a [String],
}

pub struct HttpContentClient {
    http: ServiceHttp,
}

impl HttpContentClient {
    pub fn new(config: &UpstreamServiceConfig) -> Result<Self> {
        Ok(Self {
            http: ServiceHttp::new(config)?,
        })
    }
}

#[async_trait::async_trait]
impl ContentClient for HttpContentClient {
    async fn get_questions(&self, question_ids: &[String]) -> Result<Vec<Question>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Fetching {} questions from {}", question_ids.len(), SERVICE);
        let raw: Vec<RawQuestion> = self
            .http
            .post(
                "/api/v1/questions/batch",
                &QuestionBatchRequest { ids: question_ids },
            )
            .await?
            .into_data(SERVICE, "get_questions")?;
        raw.into_iter().map(RawQuestion::validate).collect()
    }

    async fn get_practice_set(&self, practice_id: &str) -> Result<PracticeSet> {
        let raw: RawPracticeSet = self
            .http
            .get(&format!("/api/v1/practices/{practice_id}"))
            .await?
            .into_data(SERVICE, "get_practice_set")?;
        raw.validate(practice_id)
    }

    async fn get_node_practice(&self, node_id: &str) -> Result<PracticeSet> {
        let raw: RawPracticeSet = self
            .http
            .get(&format!("/api/v1/course-nodes/{node_id}/practice"))
            .await?
            .into_data(SERVICE, "get_node_practice")?;
        raw.validate(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_validation_fills_defaults() {
        let raw: RawQuestion =
            serde_json::from_str(r#"{"id":"q1","type":2,"difficulty":9}"#).unwrap();
        let question = raw.validate().unwrap();
        assert_eq!(question.id, "q1");
        assert_eq!(question.question_type, 2);
        assert!(question.stem.is_empty());
        assert_eq!(question.difficulty, None);
    }

    #[test]
    fn test_question_without_id_is_rejected() {
        let raw: RawQuestion = serde_json::from_str(r#"{"stem":"x"}"#).unwrap();
        assert_eq!(raw.validate().unwrap_err().code(), "E005");
    }

    #[test]
    fn test_practice_set_validation() {
        let raw: RawPracticeSet = serde_json::from_str(
            r#"{"name":"第一单元","questions":[{"id":"a","order":2},{"id":"b","order":1}]}"#,
        )
        .unwrap();
        let set = raw.validate("p1").unwrap();
        assert_eq!(set.id, "p1");
        assert_eq!(set.questions.len(), 2);
        assert_eq!(set.questions[1].order, Some(1));

        let raw: RawPracticeSet = serde_json::from_str(r#"{"id":"p2"}"#).unwrap();
        assert!(raw.validate("p1").is_err());
    }
}
