use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, respond};
use crate::engine::{ReportContext, SingleKey, assemble};
use crate::models::reports::requests::AnswerPanelParams;

pub async fn get_answer_panel(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    query: AnswerPanelParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);
    respond(
        assemble::answer_panel(&mut ctx, task_id, assign_id, &query).await,
        "查询成功",
    )
}
