use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, respond};
use crate::engine::{ReportContext, SingleKey, assemble};
use crate::models::reports::requests::ReportSummaryParams;

pub async fn get_report_summary(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    query: ReportSummaryParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);
    respond(
        assemble::report_summary(&mut ctx, task_id, assign_id, query.pagination).await,
        "查询成功",
    )
}
