//! 数据模型定义
//!
//! 每个业务域按 entities / requests / responses 拆分，
//! 所有对外结构体通过 ts-rs 导出给前端。

pub mod audit;
pub mod auth;
pub mod awards;
pub mod bids;
pub mod common;
pub mod departments;
pub mod documents;
pub mod notifications;
pub mod tenders;
pub mod users;

pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码，随响应体中的 `code` 字段返回
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证与用户
    AuthFailed = 2000,
    UserNameAlreadyExists = 2001,
    UserEmailAlreadyExists = 2002,
    UserNameInvalid = 2003,
    UserEmailInvalid = 2004,
    UserPasswordInvalid = 2005,
    RegisterFailed = 2006,

    // 部门
    DepartmentNotFound = 3000,
    DepartmentAlreadyExists = 3001,

    // 招标
    TenderNotFound = 4000,
    TenderNotOpen = 4001,
    TenderNumberAlreadyExists = 4004,
    CategoryAlreadyExists = 4005,
    ClarificationNotFound = 4006,

    // 投标
    BidNotFound = 5000,
    BidStatusTransitionNotAllowed = 5002,

    // 文件
    FileNotFound = 7000,
    FileUploadFailed = 7001,
    FileTypeNotAllowed = 7002,
    FileSizeExceeded = 7003,
    MultifileUploadNotAllowed = 7004,

    NotificationNotFound = 8000,
}
