use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery, auth::entities::require_user};
use crate::storage::Storage;

use super::failure;

/// 站内通知，只对平台用户开放
pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

impl NotificationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::app_storage(request),
        }
    }

    pub async fn list_notifications(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        let user = match require_user(RequireJWT::extract_principal(request).as_ref()) {
            Ok(user) => user,
            Err(e) => return Ok(failure(&e)),
        };
        let storage = self.get_storage(request)?;

        match storage.list_notifications(user.user_id, query).await {
            Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "Notifications"))),
            Err(e) => Ok(failure(&e)),
        }
    }

    // 标记已读，他人的通知按不存在处理
    pub async fn mark_read(
        &self,
        request: &HttpRequest,
        notification_id: i64,
    ) -> ActixResult<HttpResponse> {
        let user = match require_user(RequireJWT::extract_principal(request).as_ref()) {
            Ok(user) => user,
            Err(e) => return Ok(failure(&e)),
        };
        let storage = self.get_storage(request)?;

        match storage
            .mark_notification_read(user.user_id, notification_id)
            .await
        {
            Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Marked as read"))),
            Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::NotificationNotFound,
                format!("Notification {notification_id} not found"),
            ))),
            Err(e) => Ok(failure(&e)),
        }
    }
}
