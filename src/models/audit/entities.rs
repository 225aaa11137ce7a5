use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

/// 审计动作
pub mod actions {
    pub const TENDER_CREATE: &str = "tender.create";
    pub const TENDER_PUBLISH: &str = "tender.publish";
    pub const TENDER_DELETE: &str = "tender.delete";
    pub const AWARD_CREATE: &str = "award.create";
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/audit.ts")]
pub struct AuditEntry {
    pub id: i64,
    pub actor_kind: String,
    pub actor_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 待追加的审计记录
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_kind: &'static str,
    pub actor_id: i64,
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: i64,
    pub details: Option<String>,
}

impl NewAuditEntry {
    pub fn new(
        actor: (&'static str, i64),
        action: &'static str,
        entity_type: &'static str,
        entity_id: i64,
    ) -> Self {
        Self {
            actor_kind: actor.0,
            actor_id: actor.1,
            action,
            entity_type,
            entity_id,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
