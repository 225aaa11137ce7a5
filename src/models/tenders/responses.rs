use serde::Serialize;
use ts_rs::TS;

use super::entities::{
    Clarification, Corrigendum, EvaluationCriterion, Tender, TenderCategory, TenderDocument,
};
use crate::models::PaginationInfo;
use crate::models::awards::entities::Award;
use crate::models::bids::entities::{Bid, BidDocument};
use crate::models::departments::entities::Department;
use crate::models::users::entities::Institute;

/// 嵌套在招标详情里的供应商联系人
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct VendorUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct VendorForTender {
    pub vendor_id: i64,
    pub company_name: String,
    pub user: Option<VendorUser>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct BidForTender {
    #[serde(flatten)]
    #[ts(flatten)]
    pub bid: Bid,
    pub vendor: Option<VendorForTender>,
    pub documents: Vec<BidDocument>,
    pub award: Option<Award>,
}

/// 招标详情投影，一次批量查询装配
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct TenderDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub tender: Tender,
    pub department: Option<Department>,
    pub institute: Option<Institute>,
    pub category: Option<TenderCategory>,
    pub documents: Vec<TenderDocument>,
    pub corrigenda: Vec<Corrigendum>,
    pub evaluation_criteria: Vec<EvaluationCriterion>,
    pub clarifications: Vec<Clarification>,
    pub bids: Vec<BidForTender>,
    pub bids_received: i64,
    #[serde(rename = "userBidSubmitted")]
    pub user_bid_submitted: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct TenderListResponse {
    pub items: Vec<TenderDetail>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct CategoryListResponse {
    pub items: Vec<TenderCategory>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct TenderDocumentListResponse {
    pub items: Vec<TenderDocument>,
}
