use super::{SeaOrmStorage, db_err};
use crate::entity::audit_logs;
use crate::errors::Result;
use crate::models::audit::entities::{AuditEntry, NewAuditEntry};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

/// 追加一条审计记录，可在事务内调用
pub(super) async fn append_audit<C: ConnectionTrait>(
    db: &C,
    entry: NewAuditEntry,
    now: DateTime<Utc>,
) -> Result<()> {
    audit_logs::ActiveModel {
        actor_kind: Set(entry.actor_kind.to_string()),
        actor_id: Set(Some(entry.actor_id)),
        action: Set(entry.action.to_string()),
        entity_type: Set(entry.entity_type.to_string()),
        entity_id: Set(Some(entry.entity_id)),
        details: Set(entry.details),
        created_at: Set(now.timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(db_err("写入审计日志失败"))?;

    Ok(())
}

impl SeaOrmStorage {
    pub async fn list_audit_logs_impl(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<AuditEntry>> {
        let rows = audit_logs::Entity::find()
            .filter(audit_logs::Column::EntityType.eq(entity_type))
            .filter(audit_logs::Column::EntityId.eq(entity_id))
            .order_by_asc(audit_logs::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询审计日志失败"))?;

        Ok(rows.into_iter().map(|m| m.into_entry()).collect())
    }
}
