use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/award.ts")]
pub struct Award {
    pub id: i64,
    pub bid_id: i64,
    pub contract_start: DateTime<Utc>,
    pub contract_end: DateTime<Utc>,
    pub awarded_at: DateTime<Utc>,
    pub is_deleted: bool,
}
