use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::warn;

use super::BidService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::entities::require_vendor,
    bids::responses::BidDocumentListResponse,
    documents::entities::DocumentKind,
};
use crate::services::documents::upload::receive_single_file;
use crate::services::{error_response, failure};

fn bid_not_found(bid_id: i64) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::BidNotFound,
        format!("Bid {bid_id} not found"),
    ))
}

// 供应商为自己的投标上传文件
pub async fn upload_document(
    service: &BidService,
    request: &HttpRequest,
    bid_id: i64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let vendor = match require_vendor(RequireJWT::extract_principal(request).as_ref()) {
        Ok(vendor) => vendor,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage.get_vendor_bid(vendor.vendor_id, bid_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(bid_not_found(bid_id)),
        Err(e) => return Ok(failure(&e)),
    }

    let blob_store = service.get_blob_store(request)?;
    let stored = match receive_single_file(blob_store.as_ref(), DocumentKind::Bid, payload).await {
        Ok(stored) => stored,
        Err(response) => return Ok(response),
    };

    match storage
        .add_bid_document(
            bid_id,
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

pub async fn list_documents(
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
        Ok(Some(bid)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            BidDocumentListResponse {
                items: bid.documents,
            },
            "Bid documents",
        ))),
        Ok(None) => Ok(bid_not_found(bid_id)),
        Err(e) => Ok(failure(&e)),
    }
}
