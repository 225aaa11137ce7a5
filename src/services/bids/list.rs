use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BidService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_vendor, bids::responses::BidListResponse,
};
use crate::services::failure;

pub async fn list_bids(service: &BidService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let vendor = match require_vendor(RequireJWT::extract_principal(request).as_ref()) {
        Ok(vendor) => vendor,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage.list_vendor_bids(vendor.vendor_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            BidListResponse { items },
            "Bids",
        ))),
        Err(e) => Ok(failure(&e)),
    }
}

pub async fn get_bid(
    service: &BidService,
    request: &HttpRequest,
    bid_id: i64,
) -> ActixResult<HttpResponse> {
    let vendor = match require_vendor(RequireJWT::extract_principal(request).as_ref()) {
        Ok(vendor) => vendor,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage.get_vendor_bid(vendor.vendor_id, bid_id).await {
        Ok(Some(bid)) => Ok(HttpResponse::Ok().json(ApiResponse::success(bid, "Bid"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::BidNotFound,
            format!("Bid {bid_id} not found"),
        ))),
        Err(e) => Ok(failure(&e)),
    }
}
