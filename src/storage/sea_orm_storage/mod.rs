//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 所有时间戳以 unix 秒存储；需要"当前时间"的方法都由调用方传入 `now`。

mod audit;
mod awards;
mod bids;
mod categories;
mod departments;
mod documents;
mod notifications;
mod projections;
mod tenders;
mod users;

#[cfg(test)]
mod tests;

use crate::config::AppConfig;
use crate::errors::{ETenderError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接指定数据库并执行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout_secs: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, pool_size, timeout_secs).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout_secs).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| ETenderError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + 外键约束）
    async fn connect_sqlite(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ETenderError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size.max(1))
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ETenderError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL）
    async fn connect_generic(
        url: &str,
        pool_size: u32,
        timeout_secs: u64,
    ) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout_secs))
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ETenderError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ETenderError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 唯一约束冲突
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 包装数据库错误，附带上下文
pub(crate) fn db_err(context: &'static str) -> impl Fn(DbErr) -> ETenderError {
    move |e| ETenderError::database_operation(format!("{context}: {e}"))
}

// Storage trait 实现
use crate::models::{
    PaginationQuery,
    audit::entities::{AuditEntry, NewAuditEntry},
    auth::requests::NewSignup,
    awards::{requests::CreateAwardRequest, responses::AwardDetail},
    bids::{
        entities::{Bid, BidDocument, BidStatus},
        requests::SubmitBidRequest,
        responses::{BidDetail, BidSubmissionResponse},
    },
    departments::{entities::Department, requests::NewDepartment},
    documents::entities::{DocumentKind, DocumentOwnership},
    notifications::responses::NotificationListResponse,
    tenders::{
        entities::{
            Clarification, Corrigendum, EvaluationCriterion, Tender, TenderCategory,
            TenderDocument,
        },
        requests::{NewTender, TenderScope, UpdateTenderRequest},
        responses::TenderListResponse,
    },
    users::entities::{Institute, User, UserWithProfile},
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn signup(&self, signup: NewSignup, now: DateTime<Utc>) -> Result<UserWithProfile> {
        self.signup_impl(signup, now).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserWithProfile>> {
        self.get_user_profile_impl(user_id).await
    }

    // 部门模块
    async fn create_department(
        &self,
        department: NewDepartment,
        now: DateTime<Utc>,
    ) -> Result<Department> {
        self.create_department_impl(department, now).await
    }

    async fn get_department_by_id(&self, dept_id: i64) -> Result<Option<Department>> {
        self.get_department_by_id_impl(dept_id).await
    }

    async fn get_department_by_username(&self, username: &str) -> Result<Option<Department>> {
        self.get_department_by_username_impl(username).await
    }

    async fn get_department_by_name(
        &self,
        institute_id: i64,
        department_name: &str,
    ) -> Result<Option<Department>> {
        self.get_department_by_name_impl(institute_id, department_name)
            .await
    }

    async fn list_departments(&self, institute_id: i64) -> Result<Vec<Department>> {
        self.list_departments_impl(institute_id).await
    }

    async fn get_institute_by_id(&self, institute_id: i64) -> Result<Option<Institute>> {
        self.get_institute_by_id_impl(institute_id).await
    }

    // 分类模块
    async fn create_category(&self, name: &str, now: DateTime<Utc>) -> Result<TenderCategory> {
        self.create_category_impl(name, now).await
    }

    async fn list_categories(&self) -> Result<Vec<TenderCategory>> {
        self.list_categories_impl().await
    }

    // 招标模块
    async fn create_tender(
        &self,
        tender: NewTender,
        actor: (&'static str, i64),
        now: DateTime<Utc>,
    ) -> Result<Tender> {
        self.create_tender_impl(tender, actor, now).await
    }

    async fn get_tender_by_id(&self, tender_id: i64) -> Result<Option<Tender>> {
        self.get_tender_by_id_impl(tender_id).await
    }

    async fn get_department_tender(&self, dept_id: i64, tender_id: i64) -> Result<Tender> {
        self.get_department_tender_impl(dept_id, tender_id).await
    }

    async fn update_tender(
        &self,
        dept_id: i64,
        tender_id: i64,
        update: UpdateTenderRequest,
        now: DateTime<Utc>,
    ) -> Result<Tender> {
        self.update_tender_impl(dept_id, tender_id, update, now)
            .await
    }

    async fn delete_tender(&self, dept_id: i64, tender_id: i64, now: DateTime<Utc>) -> Result<()> {
        self.delete_tender_impl(dept_id, tender_id, now).await
    }

    async fn publish_tender(
        &self,
        institute_id: i64,
        tender_id: i64,
        actor_user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Tender> {
        self.publish_tender_impl(institute_id, tender_id, actor_user_id, now)
            .await
    }

    async fn list_tenders(
        &self,
        scope: TenderScope,
        pagination: PaginationQuery,
        viewer_vendor_id: Option<i64>,
    ) -> Result<TenderListResponse> {
        self.list_tenders_impl(scope, pagination, viewer_vendor_id)
            .await
    }

    async fn add_corrigendum(
        &self,
        dept_id: i64,
        tender_id: i64,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<Corrigendum> {
        self.add_corrigendum_impl(dept_id, tender_id, description, now)
            .await
    }

    async fn add_evaluation_criterion(
        &self,
        dept_id: i64,
        tender_id: i64,
        criterion: String,
        weight: f64,
    ) -> Result<EvaluationCriterion> {
        self.add_evaluation_criterion_impl(dept_id, tender_id, criterion, weight)
            .await
    }

    async fn ask_clarification(
        &self,
        vendor_id: i64,
        tender_id: i64,
        question: String,
        now: DateTime<Utc>,
    ) -> Result<Clarification> {
        self.ask_clarification_impl(vendor_id, tender_id, question, now)
            .await
    }

    async fn answer_clarification(
        &self,
        dept_id: i64,
        clarification_id: i64,
        answer: String,
        now: DateTime<Utc>,
    ) -> Result<Clarification> {
        self.answer_clarification_impl(dept_id, clarification_id, answer, now)
            .await
    }

    async fn add_tender_document(
        &self,
        tender_id: i64,
        document_name: String,
        locator: String,
        now: DateTime<Utc>,
    ) -> Result<TenderDocument> {
        self.add_tender_document_impl(tender_id, document_name, locator, now)
            .await
    }

    // 投标模块
    async fn submit_bid(
        &self,
        vendor_id: i64,
        bid: SubmitBidRequest,
        now: DateTime<Utc>,
    ) -> Result<BidSubmissionResponse> {
        self.submit_bid_impl(vendor_id, bid, now).await
    }

    async fn list_vendor_bids(&self, vendor_id: i64) -> Result<Vec<BidDetail>> {
        self.list_vendor_bids_impl(vendor_id).await
    }

    async fn get_vendor_bid(&self, vendor_id: i64, bid_id: i64) -> Result<Option<BidDetail>> {
        self.get_vendor_bid_impl(vendor_id, bid_id).await
    }

    async fn update_bid_status(
        &self,
        vendor_id: i64,
        bid_id: i64,
        status: BidStatus,
    ) -> Result<Bid> {
        self.update_bid_status_impl(vendor_id, bid_id, status).await
    }

    async fn add_bid_document(
        &self,
        bid_id: i64,
        document_name: String,
        locator: String,
        now: DateTime<Utc>,
    ) -> Result<BidDocument> {
        self.add_bid_document_impl(bid_id, document_name, locator, now)
            .await
    }

    // 授标模块
    async fn award_bid(
        &self,
        institute_id: i64,
        actor_user_id: i64,
        request: CreateAwardRequest,
        now: DateTime<Utc>,
    ) -> Result<AwardDetail> {
        self.award_bid_impl(institute_id, actor_user_id, request, now)
            .await
    }

    async fn list_awards(&self, institute_id: i64) -> Result<Vec<AwardDetail>> {
        self.list_awards_impl(institute_id).await
    }

    // 文档模块
    async fn get_document_ownership(
        &self,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<Option<DocumentOwnership>> {
        self.get_document_ownership_impl(kind, document_id).await
    }

    // 通知与审计
    async fn list_notifications(
        &self,
        user_id: i64,
        pagination: PaginationQuery,
    ) -> Result<NotificationListResponse> {
        self.list_notifications_impl(user_id, pagination).await
    }

    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<bool> {
        self.mark_notification_read_impl(user_id, notification_id)
            .await
    }

    async fn append_audit(&self, entry: NewAuditEntry, now: DateTime<Utc>) -> Result<()> {
        audit::append_audit(&self.db, entry, now).await
    }

    async fn list_audit_logs(&self, entity_type: &str, entity_id: i64) -> Result<Vec<AuditEntry>> {
        self.list_audit_logs_impl(entity_type, entity_id).await
    }
}

#[cfg(test)]
mod url_tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("etender.db").unwrap(),
            "sqlite://etender.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@h/db").unwrap(),
            "postgres://u:p@h/db"
        );
        assert!(SeaOrmStorage::build_database_url("oracle://x").is_err());
    }
}
