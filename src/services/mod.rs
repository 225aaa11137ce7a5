//! 业务逻辑层
//!
//! 每个业务域一个 Service，按操作拆分文件；路由层通过懒加载的全局实例调用。

pub mod auth;
pub mod awards;
pub mod bids;
pub mod categories;
pub mod departments;
pub mod documents;
pub mod notifications;
pub mod tenders;

pub use auth::AuthService;
pub use awards::AwardService;
pub use bids::BidService;
pub use categories::CategoryService;
pub use departments::DepartmentService;
pub use documents::DocumentService;
pub use notifications::NotificationService;
pub use tenders::TenderService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error, web};
use std::sync::Arc;

use crate::errors::ETenderError;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::{Storage, blob_store::BlobStore};

/// 从 app_data 取出存储实例
pub(crate) fn app_storage(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|s| s.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("Storage not found in app data"))
}

/// 从 app_data 取出文档存储实例
pub(crate) fn app_blob_store(request: &HttpRequest) -> ActixResult<Arc<dyn BlobStore>> {
    request
        .app_data::<web::Data<Arc<dyn BlobStore>>>()
        .map(|s| s.get_ref().clone())
        .ok_or_else(|| error::ErrorInternalServerError("Blob store not found in app data"))
}

/// 领域错误对应的通用业务码
pub(crate) fn default_error_code(err: &ETenderError) -> ErrorCode {
    match err {
        ETenderError::NotFound(_) => ErrorCode::NotFound,
        ETenderError::Authentication(_) => ErrorCode::Unauthorized,
        ETenderError::Authorization(_) => ErrorCode::Forbidden,
        ETenderError::Conflict(_) => ErrorCode::Conflict,
        ETenderError::Validation(_)
        | ETenderError::InvalidState(_)
        | ETenderError::DateParse(_) => ErrorCode::BadRequest,
        ETenderError::FileTooLarge(_) => ErrorCode::FileSizeExceeded,
        ETenderError::FileRejected(_) => ErrorCode::FileTypeNotAllowed,
        _ => ErrorCode::InternalServerError,
    }
}

/// 领域错误转 HTTP 响应，状态码取自错误本身
pub(crate) fn error_response(err: &ETenderError, code: ErrorCode) -> HttpResponse {
    if err.is_server_error() {
        tracing::error!("{}", err);
    }
    HttpResponse::build(err.status_code()).json(ApiResponse::from_error(err, code))
}

/// 使用通用业务码的错误响应
pub(crate) fn failure(err: &ETenderError) -> HttpResponse {
    error_response(err, default_error_code(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (ETenderError::not_found("x"), StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (ETenderError::authorization("x"), StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            (ETenderError::conflict("x"), StatusCode::CONFLICT, ErrorCode::Conflict),
            (ETenderError::invalid_state("x"), StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
            (
                ETenderError::file_too_large("x"),
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCode::FileSizeExceeded,
            ),
            (
                ETenderError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(failure(&err).status(), status);
            assert_eq!(default_error_code(&err), code);
        }
    }
}
