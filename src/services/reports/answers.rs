use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, respond};
use crate::engine::{ReportContext, SingleKey, assemble};
use crate::models::reports::requests::{
    AnswerDetailParams, LearnerAnswerParams, StudentAnswerDetailParams,
};

pub async fn get_assign_answer_detail(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    query: AnswerDetailParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);
    respond(
        assemble::assign_answer_detail(&mut ctx, task_id, assign_id, &query).await,
        "查询成功",
    )
}

pub async fn get_student_answer_detail(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    student_id: i64,
    query: StudentAnswerDetailParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);
    respond(
        assemble::student_answer_detail(&mut ctx, task_id, assign_id, student_id, &query).await,
        "查询成功",
    )
}

pub async fn list_learner_answers(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    query: LearnerAnswerParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);
    respond(
        assemble::learner_answers(&mut ctx, task_id, assign_id, &query).await,
        "查询成功",
    )
}
