use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 招标状态
///
/// 状态是唯一的发布门槛：`is_checked` 只随状态一起写入。
/// 可达的迁移只有 DRAFT → OPEN（发布）与 OPEN → AWARDED（授标），
/// 其余状态保留但没有入口。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub enum TenderStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "published")]
    Published,
    #[serde(rename = "open_for_bidding")]
    Open,
    #[serde(rename = "under_evaluation")]
    Evaluation,
    #[serde(rename = "awarded")]
    Awarded,
    #[serde(rename = "cancelled")]
    Cancelled,
    #[serde(rename = "closed")]
    Closed,
}

impl TenderStatus {
    pub const DRAFT: &'static str = "draft";
    pub const PUBLISHED: &'static str = "published";
    pub const OPEN: &'static str = "open_for_bidding";
    pub const EVALUATION: &'static str = "under_evaluation";
    pub const AWARDED: &'static str = "awarded";
    pub const CANCELLED: &'static str = "cancelled";
    pub const CLOSED: &'static str = "closed";

    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Draft => Self::DRAFT,
            TenderStatus::Published => Self::PUBLISHED,
            TenderStatus::Open => Self::OPEN,
            TenderStatus::Evaluation => Self::EVALUATION,
            TenderStatus::Awarded => Self::AWARDED,
            TenderStatus::Cancelled => Self::CANCELLED,
            TenderStatus::Closed => Self::CLOSED,
        }
    }

    pub fn accepts_bids(&self) -> bool {
        matches!(self, TenderStatus::Open)
    }

    /// 发布后对外可见
    pub fn is_published(&self) -> bool {
        !matches!(self, TenderStatus::Draft)
    }

    /// 已到终态，不能再发布或编辑
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            TenderStatus::Awarded | TenderStatus::Cancelled | TenderStatus::Closed
        )
    }
}

impl std::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TenderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(TenderStatus::Draft),
            Self::PUBLISHED => Ok(TenderStatus::Published),
            Self::OPEN => Ok(TenderStatus::Open),
            Self::EVALUATION => Ok(TenderStatus::Evaluation),
            Self::AWARDED => Ok(TenderStatus::Awarded),
            Self::CANCELLED => Ok(TenderStatus::Cancelled),
            Self::CLOSED => Ok(TenderStatus::Closed),
            _ => Err(format!("Invalid tender status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct Tender {
    pub id: i64,
    pub tender_number: String,
    pub title: String,
    pub description: String,
    pub estimated_cost: f64,
    pub submission_deadline: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub status: TenderStatus,
    pub is_checked: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub department_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tender {
    /// 当前时刻是否仍可投标
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_deleted && self.status.accepts_bids() && now < self.submission_deadline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct TenderCategory {
    pub id: i64,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct TenderDocument {
    pub id: i64,
    pub tender_id: i64,
    pub document_name: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct Corrigendum {
    pub id: i64,
    pub tender_id: i64,
    pub description: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct EvaluationCriterion {
    pub id: i64,
    pub tender_id: i64,
    pub criterion: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct Clarification {
    pub id: i64,
    pub tender_id: i64,
    pub vendor_id: i64,
    pub question: String,
    pub answer: Option<String>,
    pub asked_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tender(status: TenderStatus, deadline: DateTime<Utc>) -> Tender {
        let now = Utc::now();
        Tender {
            id: 1,
            tender_number: "T-1".into(),
            title: "Road".into(),
            description: String::new(),
            estimated_cost: 10.0,
            submission_deadline: deadline,
            published_at: None,
            status,
            is_checked: status.is_published(),
            is_deleted: false,
            deleted_at: None,
            department_id: Some(1),
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_wire_spelling() {
        assert_eq!(TenderStatus::Open.to_string(), "open_for_bidding");
        assert_eq!(
            "under_evaluation".parse::<TenderStatus>(),
            Ok(TenderStatus::Evaluation)
        );
        let json = serde_json::to_string(&TenderStatus::Open).unwrap();
        assert_eq!(json, "\"open_for_bidding\"");
        assert!("OPEN".parse::<TenderStatus>().is_err());
    }

    #[test]
    fn test_only_open_accepts_bids() {
        for status in [
            TenderStatus::Draft,
            TenderStatus::Published,
            TenderStatus::Evaluation,
            TenderStatus::Awarded,
            TenderStatus::Cancelled,
            TenderStatus::Closed,
        ] {
            assert!(!status.accepts_bids(), "{status} must not accept bids");
        }
        assert!(TenderStatus::Open.accepts_bids());
    }

    #[test]
    fn test_is_open_at_respects_deadline_and_delete() {
        let now = Utc::now();
        let mut t = tender(TenderStatus::Open, now + Duration::hours(1));
        assert!(t.is_open_at(now));
        assert!(!t.is_open_at(now + Duration::hours(2)));
        t.is_deleted = true;
        assert!(!t.is_open_at(now));
    }
}
