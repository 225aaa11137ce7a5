use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::entities::{Bid, BidDocument};
use crate::models::awards::entities::Award;
use crate::models::tenders::entities::TenderStatus;

/// 投标后返回的招标摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct TenderSummary {
    pub id: i64,
    pub tender_number: String,
    pub title: String,
    pub estimated_cost: f64,
    pub submission_deadline: DateTime<Utc>,
    pub status: TenderStatus,
    pub bids_received: i64,
    #[serde(rename = "userBidSubmitted")]
    pub user_bid_submitted: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct BidSubmissionResponse {
    pub bid: Bid,
    pub tender: TenderSummary,
}

/// 供应商查看自己的投标
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct BidDetail {
    #[serde(flatten)]
    #[ts(flatten)]
    pub bid: Bid,
    pub documents: Vec<BidDocument>,
    pub award: Option<Award>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct BidListResponse {
    pub items: Vec<BidDetail>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct BidDocumentListResponse {
    pub items: Vec<BidDocument>,
}
