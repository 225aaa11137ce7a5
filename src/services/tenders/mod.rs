pub mod amendments;
pub mod clarifications;
pub mod create;
pub mod documents;
pub mod list;
pub mod publish;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    PaginationQuery,
    tenders::requests::{
        AnswerClarificationRequest, AskClarificationRequest, CreateCorrigendumRequest,
        CreateCriterionRequest, CreateTenderRequest, UpdateTenderRequest,
    },
};
use crate::storage::{Storage, blob_store::BlobStore};

pub struct TenderService {
    storage: Option<Arc<dyn Storage>>,
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl TenderService {
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

    // 部门创建招标（草稿）
    pub async fn create_tender(
        &self,
        request: &HttpRequest,
        create_request: CreateTenderRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_tender(self, request, create_request).await
    }

    pub async fn update_tender(
        &self,
        request: &HttpRequest,
        tender_id: i64,
        update_request: UpdateTenderRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_tender(self, request, tender_id, update_request).await
    }

    // 软删除，级联到投标
    pub async fn delete_tender(
        &self,
        request: &HttpRequest,
        tender_id: i64,
    ) -> ActixResult<HttpResponse> {
        update::delete_tender(self, request, tender_id).await
    }

    // 机构管理员发布
    pub async fn publish_tender(
        &self,
        request: &HttpRequest,
        tender_id: i64,
    ) -> ActixResult<HttpResponse> {
        publish::publish_tender(self, request, tender_id).await
    }

    // 公开列表
    pub async fn list_public(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_public(self, request, query).await
    }

    pub async fn list_institute(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_institute(self, request, query).await
    }

    pub async fn list_department(
        &self,
        request: &HttpRequest,
        dept_id: i64,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_department(self, request, dept_id, query).await
    }

    pub async fn list_my_department(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_my_department(self, request, query).await
    }

    pub async fn add_corrigendum(
        &self,
        request: &HttpRequest,
        tender_id: i64,
        body: CreateCorrigendumRequest,
    ) -> ActixResult<HttpResponse> {
        amendments::add_corrigendum(self, request, tender_id, body).await
    }

    pub async fn add_evaluation_criterion(
        &self,
        request: &HttpRequest,
        tender_id: i64,
        body: CreateCriterionRequest,
    ) -> ActixResult<HttpResponse> {
        amendments::add_evaluation_criterion(self, request, tender_id, body).await
    }

    // 供应商提问
    pub async fn ask_clarification(
        &self,
        request: &HttpRequest,
        tender_id: i64,
        body: AskClarificationRequest,
    ) -> ActixResult<HttpResponse> {
        clarifications::ask_clarification(self, request, tender_id, body).await
    }

    // 部门答复
    pub async fn answer_clarification(
        &self,
        request: &HttpRequest,
        clarification_id: i64,
        body: AnswerClarificationRequest,
    ) -> ActixResult<HttpResponse> {
        clarifications::answer_clarification(self, request, clarification_id, body).await
    }

    pub async fn upload_document(
        &self,
        request: &HttpRequest,
        tender_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        documents::upload_document(self, request, tender_id, payload).await
    }
}
