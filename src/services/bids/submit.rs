use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BidService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_vendor, bids::requests::SubmitBidRequest,
};
use crate::services::{default_error_code, error_response, failure};

pub async fn submit_bid(
    service: &BidService,
    request: &HttpRequest,
    submit_request: SubmitBidRequest,
) -> ActixResult<HttpResponse> {
    let vendor = match require_vendor(RequireJWT::extract_principal(request).as_ref()) {
        Ok(vendor) => vendor,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage
        .submit_bid(vendor.vendor_id, submit_request, chrono::Utc::now())
        .await
    {
        Ok(submission) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(submission, "Bid submitted"))),
        Err(e) => {
            let code = match &e {
                ETenderError::NotFound(_) => ErrorCode::TenderNotOpen,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
