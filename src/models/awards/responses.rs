use serde::Serialize;
use ts_rs::TS;

use super::entities::Award;
use crate::models::bids::entities::Bid;
use crate::models::tenders::entities::Tender;

/// 授标结果，包含中标投标及更新后的招标
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/award.ts")]
pub struct AwardDetail {
    pub award: Award,
    pub bid: Bid,
    pub tender: Tender,
    /// 本次被判为不合格的投标数量
    pub disqualified_bids: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/award.ts")]
pub struct AwardListResponse {
    pub items: Vec<AwardDetail>,
}
