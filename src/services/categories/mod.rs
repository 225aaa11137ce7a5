use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::ETenderError;
use crate::models::{
    ApiResponse, ErrorCode,
    tenders::{requests::CreateCategoryRequest, responses::CategoryListResponse},
};
use crate::storage::Storage;
use crate::utils::validate::require_text;

use super::{default_error_code, error_response, failure};

/// 招标分类，部门与机构管理员均可创建，列表公开
pub struct CategoryService {
    storage: Option<Arc<dyn Storage>>,
}

impl CategoryService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::app_storage(request),
        }
    }

    pub async fn create_category(
        &self,
        request: &HttpRequest,
        create_request: CreateCategoryRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let name = match require_text(&create_request.category_name, "category_name") {
            Ok(name) => name,
            Err(msg) => return Ok(failure(&ETenderError::validation(msg))),
        };

        match storage.create_category(&name, chrono::Utc::now()).await {
            Ok(category) => {
                Ok(HttpResponse::Created().json(ApiResponse::success(category, "Category created")))
            }
            Err(e) => {
                let code = match &e {
                    ETenderError::Conflict(_) => ErrorCode::CategoryAlreadyExists,
                    e => default_error_code(e),
                };
                Ok(error_response(&e, code))
            }
        }
    }

    pub async fn list_categories(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        match storage.list_categories().await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                CategoryListResponse { items },
                "Tender categories",
            ))),
            Err(e) => Ok(failure(&e)),
        }
    }
}
