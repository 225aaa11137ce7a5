use serde::Deserialize;
use ts_rs::TS;

use super::entities::BidStatus;

// 提交投标请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct SubmitBidRequest {
    pub tender_id: i64,
    pub amount: f64,
}

// 供应商修改投标状态
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct UpdateBidStatusRequest {
    pub status: BidStatus,
}
