use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BidService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_vendor,
    bids::requests::UpdateBidStatusRequest,
};
use crate::services::{default_error_code, error_response, failure};

pub async fn update_status(
    service: &BidService,
    request: &HttpRequest,
    bid_id: i64,
    body: UpdateBidStatusRequest,
) -> ActixResult<HttpResponse> {
    let vendor = match require_vendor(RequireJWT::extract_principal(request).as_ref()) {
        Ok(vendor) => vendor,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage
        .update_bid_status(vendor.vendor_id, bid_id, body.status)
        .await
    {
        Ok(bid) => {
            info!("Vendor {} set bid {} to {}", vendor.vendor_id, bid.id, bid.status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(bid, "Bid status updated")))
        }
        Err(e) => {
            let code = match &e {
                ETenderError::NotFound(_) => ErrorCode::BidNotFound,
                ETenderError::Conflict(_) => ErrorCode::BidStatusTransitionNotAllowed,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
