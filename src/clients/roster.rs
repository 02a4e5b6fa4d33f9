use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RosterClient, ServiceHttp};
use crate::config::UpstreamServiceConfig;
use crate::errors::{ReportError, Result};
use crate::models::roster::entities::{ClassInfo, StudentInfo};

const SERVICE: &str = "roster service";

#[derive(Debug, Default, Deserialize)]
struct RawStudent {
    id: Option<i64>,
    name: Option<String>,
    avatar: Option<String>,
}

impl RawStudent {
    fn validate(self) -> Result<StudentInfo> {
        let id = self
            .id
            .ok_or_else(|| ReportError::upstream_failure(format!("{SERVICE}: student without id")))?;
        Ok(StudentInfo {
            id,
            name: self.name.unwrap_or_default(),
            avatar: self.avatar.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawClass {
    id: Option<i64>,
    name: Option<String>,
    students: Option<Vec<RawStudent>>,
}

impl RawClass {
    fn validate(self) -> Result<ClassInfo> {
        let id = self
            .id
            .ok_or_else(|| ReportError::upstream_failure(format!("{SERVICE}: class without id")))?;
        let students = self
            .students
            .unwrap_or_default()
            .into_iter()
            .map(RawStudent::validate)
            .collect::<Result<Vec<_>>>()?;
        Ok(ClassInfo {
            id,
            name: self.name.unwrap_or_default(),
            students,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassBatchRequest<'a> {
    class_ids: &'a [i64],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudentBatchRequest<'a> {
    student_ids: &'a [i64],
}

pub struct HttpRosterClient {
    http: ServiceHttp,
}

impl HttpRosterClient {
    pub fn new(config: &UpstreamServiceConfig) -> Result<Self> {
        Ok(Self {
            http: ServiceHttp::new(config)?,
        })
    }
}

#[async_trait::async_trait]
impl RosterClient for HttpRosterClient {
    async fn get_class_students(&self, class_ids: &[i64]) -> Result<Vec<ClassInfo>> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Fetching rosters of {} classes from {}", class_ids.len(), SERVICE);
        let raw: Vec<RawClass> = self
            .http
            .post("/api/v1/classes/students", &ClassBatchRequest { class_ids })
            .await?
            .into_data(SERVICE, "get_class_students")?;
        raw.into_iter().map(RawClass::validate).collect()
    }

    async fn get_students(&self, student_ids: &[i64]) -> Result<Vec<StudentInfo>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<RawStudent> = self
            .http
            .post("/api/v1/students/batch", &StudentBatchRequest { student_ids })
            .await?
            .into_data(SERVICE, "get_students")?;
        raw.into_iter().map(RawStudent::validate).collect()
    }
}
