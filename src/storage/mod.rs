use std::sync::Arc;

use chrono::{DateTime, Utc};

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

use crate::errors::Result;

pub mod blob_store;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户与认证
    // 注册用户，用户、角色关联与档案在同一事务内写入
    async fn signup(&self, signup: NewSignup, now: DateTime<Utc>) -> Result<UserWithProfile>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 用户及其供应商/机构档案
    async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserWithProfile>>;

    /// 部门与机构
    async fn create_department(
        &self,
        department: NewDepartment,
        now: DateTime<Utc>,
    ) -> Result<Department>;
    async fn get_department_by_id(&self, dept_id: i64) -> Result<Option<Department>>;
    async fn get_department_by_username(&self, username: &str) -> Result<Option<Department>>;
    async fn get_department_by_name(
        &self,
        institute_id: i64,
        department_name: &str,
    ) -> Result<Option<Department>>;
    async fn list_departments(&self, institute_id: i64) -> Result<Vec<Department>>;
    async fn get_institute_by_id(&self, institute_id: i64) -> Result<Option<Institute>>;

    /// 招标分类
    async fn create_category(&self, name: &str, now: DateTime<Utc>) -> Result<TenderCategory>;
    async fn list_categories(&self) -> Result<Vec<TenderCategory>>;

    /// 招标生命周期
    async fn create_tender(
        &self,
        tender: NewTender,
        actor: (&'static str, i64),
        now: DateTime<Utc>,
    ) -> Result<Tender>;
    async fn get_tender_by_id(&self, tender_id: i64) -> Result<Option<Tender>>;
    // 部门名下的未删除招标，不属于该部门时返回 NotFound
    async fn get_department_tender(&self, dept_id: i64, tender_id: i64) -> Result<Tender>;
    async fn update_tender(
        &self,
        dept_id: i64,
        tender_id: i64,
        update: UpdateTenderRequest,
        now: DateTime<Utc>,
    ) -> Result<Tender>;
    // 软删除招标并级联软删除其投标
    async fn delete_tender(&self, dept_id: i64, tender_id: i64, now: DateTime<Utc>) -> Result<()>;
    async fn publish_tender(
        &self,
        institute_id: i64,
        tender_id: i64,
        actor_user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Tender>;
    // 按可见范围列出招标详情投影
    async fn list_tenders(
        &self,
        scope: TenderScope,
        pagination: PaginationQuery,
        viewer_vendor_id: Option<i64>,
    ) -> Result<TenderListResponse>;
    async fn add_corrigendum(
        &self,
        dept_id: i64,
        tender_id: i64,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<Corrigendum>;
    async fn add_evaluation_criterion(
        &self,
        dept_id: i64,
        tender_id: i64,
        criterion: String,
        weight: f64,
    ) -> Result<EvaluationCriterion>;
    async fn ask_clarification(
        &self,
        vendor_id: i64,
        tender_id: i64,
        question: String,
        now: DateTime<Utc>,
    ) -> Result<Clarification>;
    async fn answer_clarification(
        &self,
        dept_id: i64,
        clarification_id: i64,
        answer: String,
        now: DateTime<Utc>,
    ) -> Result<Clarification>;
    async fn add_tender_document(
        &self,
        tender_id: i64,
        document_name: String,
        locator: String,
        now: DateTime<Utc>,
    ) -> Result<TenderDocument>;

    /// 投标
    async fn submit_bid(
        &self,
        vendor_id: i64,
        bid: SubmitBidRequest,
        now: DateTime<Utc>,
    ) -> Result<BidSubmissionResponse>;
    async fn list_vendor_bids(&self, vendor_id: i64) -> Result<Vec<BidDetail>>;
    // 供应商自己的未删除投标
    async fn get_vendor_bid(&self, vendor_id: i64, bid_id: i64) -> Result<Option<BidDetail>>;
    async fn update_bid_status(
        &self,
        vendor_id: i64,
        bid_id: i64,
        status: BidStatus,
    ) -> Result<Bid>;
    async fn add_bid_document(
        &self,
        bid_id: i64,
        document_name: String,
        locator: String,
        now: DateTime<Utc>,
    ) -> Result<BidDocument>;

    /// 授标
    // 授标事务：写入授标、关闭招标、淘汰其余投标
    async fn award_bid(
        &self,
        institute_id: i64,
        actor_user_id: i64,
        request: CreateAwardRequest,
        now: DateTime<Utc>,
    ) -> Result<AwardDetail>;
    async fn list_awards(&self, institute_id: i64) -> Result<Vec<AwardDetail>>;

    /// 文档
    // 解析文档的归属链，用于下载授权
    async fn get_document_ownership(
        &self,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<Option<DocumentOwnership>>;

    /// 通知与审计
    async fn list_notifications(
        &self,
        user_id: i64,
        pagination: PaginationQuery,
    ) -> Result<NotificationListResponse>;
    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<bool>;
    async fn append_audit(&self, entry: NewAuditEntry, now: DateTime<Utc>) -> Result<()>;
    async fn list_audit_logs(&self, entity_type: &str, entity_id: i64) -> Result<Vec<AuditEntry>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
