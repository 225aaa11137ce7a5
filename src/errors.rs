//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，每个变体携带错误代码、类型名称和对应的 HTTP 状态码。

use actix_web::http::StatusCode;
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() / error_type() / message() / status_code()
/// - snake_case 便捷构造函数
macro_rules! define_etender_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $status:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ETenderError {
            $($variant(String),)*
        }

        impl ETenderError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ETenderError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ETenderError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ETenderError::$variant(msg) => msg,)*
                }
            }

            /// 对外暴露时使用的 HTTP 状态码
            pub fn status_code(&self) -> StatusCode {
                match self {
                    $(ETenderError::$variant(_) => StatusCode::$status,)*
                }
            }
        }

        paste::paste! {
            impl ETenderError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ETenderError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_etender_errors! {
    CacheConnection("E001", "Cache Connection Error", INTERNAL_SERVER_ERROR),
    CachePluginNotFound("E002", "Cache Plugin Not Found", INTERNAL_SERVER_ERROR),
    DatabaseConfig("E003", "Database Configuration Error", INTERNAL_SERVER_ERROR),
    DatabaseConnection("E004", "Database Connection Error", INTERNAL_SERVER_ERROR),
    DatabaseOperation("E005", "Database Operation Error", INTERNAL_SERVER_ERROR),
    FileOperation("E006", "File Operation Error", INTERNAL_SERVER_ERROR),
    Validation("E007", "Validation Error", BAD_REQUEST),
    NotFound("E008", "Resource Not Found", NOT_FOUND),
    Serialization("E009", "Serialization Error", INTERNAL_SERVER_ERROR),
    DateParse("E011", "Date Parse Error", BAD_REQUEST),
    Authentication("E012", "Authentication Error", UNAUTHORIZED),
    Authorization("E013", "Authorization Error", FORBIDDEN),
    Conflict("E014", "Conflict", CONFLICT),
    InvalidState("E015", "Invalid State", BAD_REQUEST),
    Internal("E016", "Internal Error", INTERNAL_SERVER_ERROR),
    FileTooLarge("E017", "File Too Large", PAYLOAD_TOO_LARGE),
    FileRejected("E018", "File Rejected", BAD_REQUEST),
}

impl ETenderError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 服务端错误不把内部细节透出给调用方
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl fmt::Display for ETenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ETenderError {}

impl From<sea_orm::DbErr> for ETenderError {
    fn from(err: sea_orm::DbErr) -> Self {
        ETenderError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ETenderError {
    fn from(err: std::io::Error) -> Self {
        ETenderError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ETenderError {
    fn from(err: serde_json::Error) -> Self {
        ETenderError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ETenderError {
    fn from(err: chrono::ParseError) -> Self {
        ETenderError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ETenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ETenderError::cache_connection("test").code(), "E001");
        assert_eq!(ETenderError::database_config("test").code(), "E003");
        assert_eq!(ETenderError::validation("test").code(), "E007");
        assert_eq!(ETenderError::conflict("test").code(), "E014");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ETenderError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ETenderError::authorization("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ETenderError::authentication("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ETenderError::conflict("x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ETenderError::invalid_state("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert!(ETenderError::internal("x").is_server_error());
        assert!(ETenderError::database_operation("x").is_server_error());
        assert!(!ETenderError::validation("x").is_server_error());
    }

    #[test]
    fn test_error_message() {
        let err = ETenderError::validation("company_name is required");
        assert_eq!(err.message(), "company_name is required");
        assert_eq!(err.error_type(), "Validation Error");
    }

    #[test]
    fn test_format_simple() {
        let err = ETenderError::conflict("Tender already awarded");
        let formatted = err.format_simple();
        assert!(formatted.contains("Conflict"));
        assert!(formatted.contains("Tender already awarded"));
    }
}
