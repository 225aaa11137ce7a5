//! SeaORM 实体定义
//!
//! 这些实体只用于数据库读写，与 models 模块中的业务实体分离。
//! Storage 层读出实体后通过 `into_*` 转换为业务实体。

pub mod prelude;

pub mod audit_logs;
pub mod awards;
pub mod bid_documents;
pub mod bids;
pub mod clarifications;
pub mod corrigenda;
pub mod departments;
pub mod evaluation_criteria;
pub mod institutes;
pub mod notifications;
pub mod roles;
pub mod tender_categories;
pub mod tender_documents;
pub mod tenders;
pub mod user_roles;
pub mod users;
pub mod vendors;
