use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit, RequireRole};
use crate::models::auth::entities::Capability;
use crate::models::bids::requests::{SubmitBidRequest, UpdateBidStatusRequest};
use crate::models::documents::entities::DocumentKind;
use crate::services::{BidService, DocumentService};
use crate::utils::SafeIDI64;

static BID_SERVICE: Lazy<BidService> = Lazy::new(BidService::new_lazy);
static DOCUMENT_SERVICE: Lazy<DocumentService> = Lazy::new(DocumentService::new_lazy);

pub async fn submit_bid(
    req: HttpRequest,
    body: web::Json<SubmitBidRequest>,
) -> ActixResult<HttpResponse> {
    BID_SERVICE.submit_bid(&req, body.into_inner()).await
}

pub async fn list_bids(req: HttpRequest) -> ActixResult<HttpResponse> {
    BID_SERVICE.list_bids(&req).await
}

pub async fn get_bid(req: HttpRequest, bid_id: SafeIDI64) -> ActixResult<HttpResponse> {
    BID_SERVICE.get_bid(&req, bid_id.0).await
}

pub async fn update_status(
    req: HttpRequest,
    bid_id: SafeIDI64,
    body: web::Json<UpdateBidStatusRequest>,
) -> ActixResult<HttpResponse> {
    BID_SERVICE
        .update_status(&req, bid_id.0, body.into_inner())
        .await
}

pub async fn upload_document(
    req: HttpRequest,
    bid_id: SafeIDI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    BID_SERVICE.upload_document(&req, bid_id.0, payload).await
}

pub async fn list_documents(req: HttpRequest, bid_id: SafeIDI64) -> ActixResult<HttpResponse> {
    BID_SERVICE.list_documents(&req, bid_id.0).await
}

pub async fn download_document(
    req: HttpRequest,
    document_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    DOCUMENT_SERVICE
        .download(&req, DocumentKind::Bid, document_id.0)
        .await
}

// 配置路由
pub fn configure_bid_routes(cfg: &mut web::ServiceConfig) {
    let vendor = || RequireRole::new(Capability::Vendor);
    cfg.service(
        web::scope("/api/v1/bids")
            .wrap(middlewares::RequireJWT)
            .route(
                "/documents/{document_id}/download",
                web::get().to(download_document),
            )
            .route("", web::post().to(submit_bid).wrap(vendor()))
            .route("", web::get().to(list_bids).wrap(vendor()))
            .route("/{bid_id}", web::get().to(get_bid).wrap(vendor()))
            .route(
                "/{bid_id}/status",
                web::patch().to(update_status).wrap(vendor()),
            )
            .route(
                "/{bid_id}/documents",
                web::post()
                    .to(upload_document)
                    .wrap(RateLimit::file_upload())
                    .wrap(vendor()),
            )
            .route(
                "/{bid_id}/documents",
                web::get().to(list_documents).wrap(vendor()),
            ),
    );
}
