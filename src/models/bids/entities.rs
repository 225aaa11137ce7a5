use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 投标状态
///
/// 供应商只能把 SUBMITTED 改为 WITHDRAWN；AWARDED 与 DISQUALIFIED
/// 只由授标事务写入，QUALIFIED 目前没有入口。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub enum BidStatus {
    Submitted,
    Withdrawn,
    Qualified,
    Disqualified,
    Awarded,
}

impl BidStatus {
    pub const SUBMITTED: &'static str = "submitted";
    pub const WITHDRAWN: &'static str = "withdrawn";
    pub const QUALIFIED: &'static str = "qualified";
    pub const DISQUALIFIED: &'static str = "disqualified";
    pub const AWARDED: &'static str = "awarded";

    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Submitted => Self::SUBMITTED,
            BidStatus::Withdrawn => Self::WITHDRAWN,
            BidStatus::Qualified => Self::QUALIFIED,
            BidStatus::Disqualified => Self::DISQUALIFIED,
            BidStatus::Awarded => Self::AWARDED,
        }
    }

    /// 供应商自助可驱动的迁移
    pub fn vendor_can_transition(from: BidStatus, to: BidStatus) -> bool {
        matches!((from, to), (BidStatus::Submitted, BidStatus::Withdrawn))
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::SUBMITTED => Ok(BidStatus::Submitted),
            Self::WITHDRAWN => Ok(BidStatus::Withdrawn),
            Self::QUALIFIED => Ok(BidStatus::Qualified),
            Self::DISQUALIFIED => Ok(BidStatus::Disqualified),
            Self::AWARDED => Ok(BidStatus::Awarded),
            _ => Err(format!("Invalid bid status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct Bid {
    pub id: i64,
    pub tender_id: i64,
    pub vendor_id: i64,
    pub amount: f64,
    pub submitted_at: DateTime<Utc>,
    pub status: BidStatus,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub committee_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/bid.ts")]
pub struct BidDocument {
    pub id: i64,
    pub bid_id: i64,
    pub document_name: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_transitions() {
        assert!(BidStatus::vendor_can_transition(
            BidStatus::Submitted,
            BidStatus::Withdrawn
        ));
        assert!(!BidStatus::vendor_can_transition(
            BidStatus::Submitted,
            BidStatus::Awarded
        ));
        assert!(!BidStatus::vendor_can_transition(
            BidStatus::Withdrawn,
            BidStatus::Submitted
        ));
        assert!(!BidStatus::vendor_can_transition(
            BidStatus::Submitted,
            BidStatus::Qualified
        ));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("disqualified".parse::<BidStatus>(), Ok(BidStatus::Disqualified));
        assert!("SUBMITTED".parse::<BidStatus>().is_err());
    }
}
