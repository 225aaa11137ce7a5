use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::TenderService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_department,
    documents::entities::DocumentKind,
};
use crate::services::documents::upload::receive_single_file;
use crate::services::{default_error_code, error_response, failure};

// 部门上传招标文件
pub async fn upload_document(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    // 先确认归属，再接收文件
    if let Err(e) = storage.get_department_tender(dept.dept_id, tender_id).await {
        let code = match &e {
            ETenderError::NotFound(_) => ErrorCode::TenderNotFound,
            e => default_error_code(e),
        };
        return Ok(error_response(&e, code));
    }

    let blob_store = service.get_blob_store(request)?;
    let stored = match receive_single_file(blob_store.as_ref(), DocumentKind::Tender, payload).await
    {
        Ok(stored) => stored,
        Err(response) => return Ok(response),
    };

    match storage
        .add_tender_document(
            tender_id,
            stored.file_name,
            stored.locator.clone(),
            chrono::Utc::now(),
        )
        .await
    {
        Ok(document) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(document, "Document uploaded"))),
        Err(e) => {
            if let Err(cleanup) = blob_store.remove(&stored.locator).await {
                warn!("Failed to remove orphaned file {}: {}", stored.locator, cleanup);
            }
            Ok(error_response(&e, ErrorCode::FileUploadFailed))
        }
    }
}
