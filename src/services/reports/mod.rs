pub mod answers;
pub mod export;
pub mod panel;
pub mod student;
pub mod summary;
pub mod tasks;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

use crate::engine::Collaborators;
use crate::errors::{ReportError, Result};
use crate::models::reports::requests::{
    AnswerDetailParams, AnswerPanelParams, ExportParams, LearnerAnswerParams, ReportSummaryParams,
    StudentAnswerDetailParams,
};
use crate::models::tasks::requests::{LatestTaskParams, TaskReportListParams};
use crate::models::{ApiResponse, ErrorCode};

pub struct ReportService {
    collaborators: Option<Collaborators>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self {
            collaborators: None,
        }
    }

    pub(crate) fn get_collaborators(&self, request: &HttpRequest) -> Collaborators {
        if let Some(collaborators) = &self.collaborators {
            collaborators.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Collaborators>>()
                .expect("Collaborators not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_task_reports(
        &self,
        request: &HttpRequest,
        query: TaskReportListParams,
    ) -> ActixResult<HttpResponse> {
        tasks::list_task_reports(self, request, query).await
    }

    pub async fn get_latest_task_report(
        &self,
        request: &HttpRequest,
        query: LatestTaskParams,
    ) -> ActixResult<HttpResponse> {
        tasks::get_latest_task_report(self, request, query).await
    }

    pub async fn get_assign_answer_detail(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        query: AnswerDetailParams,
    ) -> ActixResult<HttpResponse> {
        answers::get_assign_answer_detail(self, request, task_id, assign_id, query).await
    }

    pub async fn get_student_answer_detail(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
        query: StudentAnswerDetailParams,
    ) -> ActixResult<HttpResponse> {
        answers::get_student_answer_detail(self, request, task_id, assign_id, student_id, query)
            .await
    }

    pub async fn list_learner_answers(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        query: LearnerAnswerParams,
    ) -> ActixResult<HttpResponse> {
        answers::list_learner_answers(self, request, task_id, assign_id, query).await
    }

    pub async fn get_report_summary(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        query: ReportSummaryParams,
    ) -> ActixResult<HttpResponse> {
        summary::get_report_summary(self, request, task_id, assign_id, query).await
    }

    pub async fn export_report(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        query: ExportParams,
    ) -> ActixResult<HttpResponse> {
        export::export_report(self, request, task_id, assign_id, query).await
    }

    pub async fn get_answer_panel(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        query: AnswerPanelParams,
    ) -> ActixResult<HttpResponse> {
        panel::get_answer_panel(self, request, task_id, assign_id, query).await
    }

    pub async fn get_student_detail(
        &self,
        request: &HttpRequest,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        student::get_student_detail(self, request, task_id, assign_id, student_id).await
    }
}

/// 引擎错误映射为 HTTP 响应
pub(crate) fn error_response(err: &ReportError) -> HttpResponse {
    match err {
        ReportError::InvalidArgument(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
        }
        ReportError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg))
        }
        ReportError::UpstreamFailure(msg) => {
            warn!("Upstream failure while building report: {}", msg);
            HttpResponse::BadGateway().json(ApiResponse::error_empty(
                ErrorCode::UpstreamFailure,
                format!("上游服务异常: {msg}"),
            ))
        }
        _ => {
            error!("Report request failed: {}", err.format_simple());
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                err.message(),
            ))
        }
    }
}

/// 成功时包装为统一响应，失败时按错误类型映射状态码
pub(crate) fn respond<T>(result: Result<T>, message: &str) -> ActixResult<HttpResponse>
where
    T: Serialize + TS,
{
    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data, message))),
        Err(e) => Ok(error_response(&e)),
    }
}
