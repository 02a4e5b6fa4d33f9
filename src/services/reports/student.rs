use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, respond};
use crate::engine::{ReportContext, SingleKey, assemble};

pub async fn get_student_detail(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);
    respond(
        assemble::student_detail(&mut ctx, task_id, assign_id, student_id).await,
        "查询成功",
    )
}
