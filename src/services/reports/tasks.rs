use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, respond};
use crate::engine::{BatchedKey, ReportContext, assemble};
use crate::models::tasks::requests::{LatestTaskParams, TaskReportListParams};

// 列表会一次查询多个任务，按批量键合并请求
pub async fn list_task_reports(
    service: &ReportService,
    request: &HttpRequest,
    query: TaskReportListParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &BatchedKey);
    respond(
        assemble::task_report_list(&mut ctx, query).await,
        "查询成功",
    )
}

pub async fn get_latest_task_report(
    service: &ReportService,
    request: &HttpRequest,
    query: LatestTaskParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &BatchedKey);
    respond(
        assemble::latest_task_report(&mut ctx, query).await,
        "查询成功",
    )
}
