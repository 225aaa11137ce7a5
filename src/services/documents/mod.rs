pub mod download;
pub mod upload;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::documents::entities::DocumentKind;
use crate::storage::{Storage, blob_store::BlobStore};

/// 招标/投标文档下载
pub struct DocumentService {
    storage: Option<Arc<dyn Storage>>,
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl DocumentService {
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

    pub async fn download(
        &self,
        request: &HttpRequest,
        kind: DocumentKind,
        document_id: i64,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, kind, document_id).await
    }
}
