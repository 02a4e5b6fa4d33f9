use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::reports::requests::{
    AnswerDetailParams, AnswerPanelParams, ExportParams, LearnerAnswerParams, ReportSummaryParams,
    StudentAnswerDetailParams,
};
use crate::models::tasks::requests::{LatestTaskParams, TaskReportListParams};
use crate::services::ReportService;

// 懒加载的全局 ReportService 实例
static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

// 任务报告列表
pub async fn list_task_reports(
    req: HttpRequest,
    query: web::Query<TaskReportListParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .list_task_reports(&req, query.into_inner())
        .await
}

// 最近任务报告
pub async fn get_latest_task_report(
    req: HttpRequest,
    query: web::Query<LatestTaskParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .get_latest_task_report(&req, query.into_inner())
        .await
}

// 布置作答详情
pub async fn get_assign_answer_detail(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<AnswerDetailParams>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id) = path.into_inner();
    REPORT_SERVICE
        .get_assign_answer_detail(&req, task_id, assign_id, query.into_inner())
        .await
}

// 单个学生作答详情
pub async fn get_student_answer_detail(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    query: web::Query<StudentAnswerDetailParams>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id, student_id) = path.into_inner();
    REPORT_SERVICE
        .get_student_answer_detail(&req, task_id, assign_id, student_id, query.into_inner())
        .await
}

// 原始作答列表
pub async fn list_learner_answers(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<LearnerAnswerParams>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id) = path.into_inner();
    REPORT_SERVICE
        .list_learner_answers(&req, task_id, assign_id, query.into_inner())
        .await
}

// 班级报告汇总
pub async fn get_report_summary(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<ReportSummaryParams>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id) = path.into_inner();
    REPORT_SERVICE
        .get_report_summary(&req, task_id, assign_id, query.into_inner())
        .await
}

// 导出班级报告
pub async fn export_report(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<ExportParams>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id) = path.into_inner();
    REPORT_SERVICE
        .export_report(&req, task_id, assign_id, query.into_inner())
        .await
}

// 答题面板
pub async fn get_answer_panel(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<AnswerPanelParams>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id) = path.into_inner();
    REPORT_SERVICE
        .get_answer_panel(&req, task_id, assign_id, query.into_inner())
        .await
}

// 学生详情卡片
pub async fn get_student_detail(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (task_id, assign_id, student_id) = path.into_inner();
    REPORT_SERVICE
        .get_student_detail(&req, task_id, assign_id, student_id)
        .await
}

// 配置路由
pub fn configure_reports_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .service(web::resource("/tasks").route(web::get().to(list_task_reports)))
            .service(web::resource("/tasks/latest").route(web::get().to(get_latest_task_report)))
            .service(
                web::scope("/tasks/{task_id}/assigns/{assign_id}")
                    .service(web::resource("/answers").route(web::get().to(get_assign_answer_detail)))
                    .service(
                        web::resource("/learner-answers")
                            .route(web::get().to(list_learner_answers)),
                    )
                    .service(web::resource("/summary").route(web::get().to(get_report_summary)))
                    .service(web::resource("/export").route(web::get().to(export_report)))
                    .service(web::resource("/panel").route(web::get().to(get_answer_panel)))
                    .service(
                        web::resource("/students/{student_id}")
                            .route(web::get().to(get_student_detail)),
                    )
                    .service(
                        web::resource("/students/{student_id}/answers")
                            .route(web::get().to(get_student_answer_detail)),
                    ),
            ),
    );
}
