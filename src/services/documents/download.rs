use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
};
use tracing::info;

use super::DocumentService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, documents::entities::DocumentKind};
use crate::services::{error_response, failure};

pub async fn handle_download(
    service: &DocumentService,
    request: &HttpRequest,
    kind: DocumentKind,
    document_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(principal) = RequireJWT::extract_principal(request) else {
        return Ok(failure(&ETenderError::authentication("Not authenticated")));
    };
    let storage = service.get_storage(request)?;

    let ownership = match storage.get_document_ownership(kind, document_id).await {
        Ok(Some(ownership)) => ownership,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::NotFound,
                format!("Document {document_id} not found"),
            )));
        }
        Err(e) => return Ok(failure(&e)),
    };

    if !ownership.can_download(&principal) {
        info!(
            "{} denied download of {} document {}",
            principal.username(),
            kind,
            document_id
        );
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "You are not allowed to download this document",
        )));
    }

    let blob_store = service.get_blob_store(request)?;
    let chunks = match blob_store.open(&ownership.locator).await {
        Ok(chunks) => chunks,
        // 记录存在但文件丢失，与记录不存在区分
        Err(e @ ETenderError::NotFound(_)) => {
            return Ok(error_response(&e, ErrorCode::FileNotFound));
        }
        Err(e) => return Ok(failure(&e)),
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(ownership.document_name)],
        })
        .streaming(chunks))
}
