//! 外部 HTTP 服务客户端
//!
//! 题库服务和花名册服务都返回 `{code, message, data}` 信封。
//! 字段缺失、code 非 0 等问题在这里统一转换为 `UpstreamFailure`，
//! 引擎只接触校验过的业务实体。

pub mod content;
pub mod roster;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::UpstreamServiceConfig;
use crate::errors::{ReportError, Result};
use crate::models::content::entities::{PracticeSet, Question};
use crate::models::roster::entities::{ClassInfo, StudentInfo};

/// 题库服务
#[async_trait::async_trait]
pub trait ContentClient: Send + Sync {
    // 批量获取题目正文，不存在的 ID 不返回
    async fn get_questions(&self, question_ids: &[String]) -> Result<Vec<Question>>;
    // 题集内容
    async fn get_practice_set(&self, practice_id: &str) -> Result<PracticeSet>;
    // 课程叶子节点的练习
    async fn get_node_practice(&self, node_id: &str) -> Result<PracticeSet>;
}

/// 花名册服务
#[async_trait::async_trait]
pub trait RosterClient: Send + Sync {
    // 批量获取班级及其学生，不存在的班级不返回
    async fn get_class_students(&self, class_ids: &[i64]) -> Result<Vec<ClassInfo>>;
    // 学生姓名、头像
    async fn get_students(&self, student_ids: &[i64]) -> Result<Vec<StudentInfo>>;
}

/// 上游统一响应信封
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// code 为 0 且带 data 才算成功
    pub(crate) fn into_data(self, service: &str, operation: &str) -> Result<T> {
        match self.code {
            Some(0) => {}
            code => {
                return Err(ReportError::upstream_failure(format!(
                    "{service} {operation} failed: code={code:?}, message={}",
                    self.message.unwrap_or_default()
                )));
            }
        }
        self.data.ok_or_else(|| {
            ReportError::upstream_failure(format!("{service} {operation} returned no data"))
        })
    }
}

/// 带鉴权头和超时的 reqwest 客户端
pub(crate) struct ServiceHttp {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ServiceHttp {
    pub(crate) fn new(config: &UpstreamServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ReportError::upstream_failure(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<Envelope<T>>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: serde::de::DeserializeOwned,
    {
        let mut request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Envelope<T>>().await?)
    }

    pub(crate) async fn get<T>(&self, path: &str) -> Result<Envelope<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<Envelope<T>>().await?)
    }
}

pub fn create_content_client(config: &UpstreamServiceConfig) -> Result<Arc<dyn ContentClient>> {
    Ok(Arc::new(content::HttpContentClient::new(config)?))
}

pub fn create_roster_client(config: &UpstreamServiceConfig) -> Result<Arc<dyn RosterClient>> {
    Ok(Arc::new(roster::HttpRosterClient::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let envelope: Envelope<Vec<i64>> =
            serde_json::from_str(r#"{"code":0,"message":"ok","data":[1,2]}"#).unwrap();
        assert_eq!(envelope.into_data("roster", "test").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_envelope_rejects_error_code_and_missing_data() {
        let envelope: Envelope<Vec<i64>> =
            serde_json::from_str(r#"{"code":40001,"message":"bad"}"#).unwrap();
        let err = envelope.into_data("roster", "test").unwrap_err();
        assert_eq!(err.code(), "E005");
        assert!(err.message().contains("bad"));

        let envelope: Envelope<Vec<i64>> = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert!(envelope.into_data("roster", "test").is_err());

        let envelope: Envelope<Vec<i64>> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(envelope.into_data("roster", "test").is_err());
    }
}
