use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TenderService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, auth::entities::require_institute_admin};
use crate::services::{default_error_code, error_response, failure};

pub async fn publish_tender(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
) -> ActixResult<HttpResponse> {
    let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref()) {
        Ok(admin) => admin,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage
        .publish_tender(
            admin.institute_id,
            tender_id,
            admin.user_id,
            chrono::Utc::now(),
        )
        .await
    {
        Ok(tender) => {
            info!("Institute {} published tender {}", admin.institute_id, tender.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(tender, "Tender published")))
        }
        Err(e) => {
            let code = match &e {
                ETenderError::NotFound(_) => ErrorCode::TenderNotFound,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
