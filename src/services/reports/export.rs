//! 班级报告 CSV 导出

use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ReportService, error_response};
use crate::engine::{ReportContext, SingleKey, assemble};
use crate::models::reports::requests::ExportParams;

// Excel 需要 BOM 才能正确识别 UTF-8
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub async fn export_report(
    service: &ReportService,
    request: &HttpRequest,
    task_id: i64,
    assign_id: i64,
    query: ExportParams,
) -> ActixResult<HttpResponse> {
    let deps = service.get_collaborators(request);
    let mut ctx = ReportContext::new(&deps, &SingleKey);

    let export = match assemble::export_report(&mut ctx, task_id, assign_id, &query).await {
        Ok(export) => export,
        Err(e) => return Ok(error_response(&e)),
    };
    let bytes = match export.to_csv_bytes() {
        Ok(bytes) => bytes,
        Err(e) => return Ok(error_response(&e)),
    };

    info!(
        "Exported {} rows for task {} assign {} as {}",
        export.rows.len(),
        task_id,
        assign_id,
        export.filename
    );

    let mut body = Vec::with_capacity(UTF8_BOM.len() + bytes.len());
    body.extend_from_slice(UTF8_BOM);
    body.extend_from_slice(&bytes);

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(attachment(&export.filename))
        .body(body))
}

// 文件名含中文，使用 RFC 5987 的 filename* 参数
fn attachment(filename: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: filename.as_bytes().to_vec(),
        })],
    }
}
