use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AwardService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_institute_admin,
    awards::requests::CreateAwardRequest,
};
use crate::services::{default_error_code, error_response, failure};

pub async fn create_award(
    service: &AwardService,
    request: &HttpRequest,
    award_request: CreateAwardRequest,
) -> ActixResult<HttpResponse> {
    let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref()) {
        Ok(admin) => admin,
        Err(e) => return Ok(failure(&e)),
    };
    if !award_request.has_valid_period() {
        return Ok(failure(&ETenderError::validation(
            "contract_end must not be before contract_start",
        )));
    }
    let storage = service.get_storage(request)?;

    match storage
        .award_bid(
            admin.institute_id,
            admin.user_id,
            award_request,
            chrono::Utc::now(),
        )
        .await
    {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(detail, "Bid awarded"))),
        Err(e) => {
            let code = match &e {
                ETenderError::NotFound(_) => ErrorCode::BidNotFound,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
