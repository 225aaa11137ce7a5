pub mod documents;
pub mod list;
pub mod status;
pub mod submit;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::bids::requests::{SubmitBidRequest, UpdateBidStatusRequest};
use crate::storage::{Storage, blob_store::BlobStore};

pub struct BidService {
    storage: Option<Arc<dyn Storage>>,
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl BidService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            blob_store: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::app_storage(request),
        }
    }

    pub(crate) fn get_blob_store(&self, request: &HttpRequest) -> ActixResult<Arc<dyn BlobStore>> {
        match &self.blob_store {
            Some(blob_store) => Ok(blob_store.clone()),
            None => super::app_blob_store(request),
        }
    }

    // 供应商投标
    pub async fn submit_bid(
        &self,
        request: &HttpRequest,
        submit_request: SubmitBidRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_bid(self, request, submit_request).await
    }

    pub async fn list_bids(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_bids(self, request).await
    }

    pub async fn get_bid(&self, request: &HttpRequest, bid_id: i64) -> ActixResult<HttpResponse> {
        list::get_bid(self, request, bid_id).await
    }

    // 撤回投标
    pub async fn update_status(
        &self,
        request: &HttpRequest,
        bid_id: i64,
        body: UpdateBidStatusRequest,
    ) -> ActixResult<HttpResponse> {
        status::update_status(self, request, bid_id, body).await
    }

    pub async fn upload_document(
        &self,
        request: &HttpRequest,
        bid_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        documents::upload_document(self, request, bid_id, payload).await
    }

    pub async fn list_documents(
        &self,
        request: &HttpRequest,
        bid_id: i64,
    ) -> ActixResult<HttpResponse> {
        documents::list_documents(self, request, bid_id).await
    }
}
