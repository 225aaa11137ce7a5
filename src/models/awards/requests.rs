use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::datetime;

// 授标请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/award.ts")]
pub struct CreateAwardRequest {
    pub bid_id: i64,
    #[serde(deserialize_with = "datetime::flexible")]
    #[ts(type = "string")]
    pub contract_start: DateTime<Utc>,
    #[serde(deserialize_with = "datetime::flexible")]
    #[ts(type = "string")]
    pub contract_end: DateTime<Utc>,
}

impl CreateAwardRequest {
    pub fn has_valid_period(&self) -> bool {
        self.contract_end >= self.contract_start
    }
}
