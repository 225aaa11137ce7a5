pub mod create;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, auth::entities::require_institute_admin,
    awards::{requests::CreateAwardRequest, responses::AwardListResponse},
};
use crate::storage::Storage;

use super::failure;

pub struct AwardService {
    storage: Option<Arc<dyn Storage>>,
}

impl AwardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::app_storage(request),
        }
    }

    // 授标
    pub async fn create_award(
        &self,
        request: &HttpRequest,
        award_request: CreateAwardRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_award(self, request, award_request).await
    }

    // 本机构全部授标
    pub async fn list_awards(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref())
        {
            Ok(admin) => admin,
            Err(e) => return Ok(failure(&e)),
        };
        let storage = self.get_storage(request)?;

        match storage.list_awards(admin.institute_id).await {
            Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                AwardListResponse { items },
                "Awards",
            ))),
            Err(e) => Ok(failure(&e)),
        }
    }
}
