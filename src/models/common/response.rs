use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::ETenderError;
use crate::models::ErrorCode;

/// 统一的 API 响应信封
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// 由领域错误构造响应体，服务端错误只返回通用描述
    pub fn from_error(err: &ETenderError, code: ErrorCode) -> Self {
        let message = if err.is_server_error() {
            "Internal server error".to_string()
        } else {
            err.message().to_string()
        };
        Self::error_empty(code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_masked() {
        let body = ApiResponse::from_error(
            &ETenderError::database_operation("UNIQUE constraint failed: secret"),
            ErrorCode::InternalServerError,
        );
        assert_eq!(body.message, "Internal server error");
        assert_eq!(body.code, 1500);
    }

    #[test]
    fn test_client_errors_keep_reason() {
        let body = ApiResponse::from_error(
            &ETenderError::conflict("Tender number already exists"),
            ErrorCode::TenderNumberAlreadyExists,
        );
        assert_eq!(body.message, "Tender number already exists");
        assert_eq!(body.code, ErrorCode::TenderNumberAlreadyExists as i32);
        assert!(body.data.is_none());
    }
}
