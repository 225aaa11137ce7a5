//! 通知存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::notifications::{ActiveModel, Column, Entity as Notifications};
use crate::errors::Result;
use crate::models::{
    PaginationInfo, PaginationQuery,
    notifications::{entities::NewNotification, responses::NotificationListResponse},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

/// 批量写入通知，可在事务内调用
pub(super) async fn create_notifications<C: ConnectionTrait>(
    db: &C,
    notifications: Vec<NewNotification>,
    now: DateTime<Utc>,
) -> Result<()> {
    let ts = now.timestamp();
    for n in notifications {
        ActiveModel {
            user_id: Set(n.user_id),
            title: Set(n.title),
            message: Set(n.message),
            is_read: Set(false),
            created_at: Set(ts),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(db_err("创建通知失败"))?;
    }
    Ok(())
}

impl SeaOrmStorage {
    /// 列出用户通知（分页）
    pub async fn list_notifications_impl(
        &self,
        user_id: i64,
        pagination: PaginationQuery,
    ) -> Result<NotificationListResponse> {
        let (page, size) = pagination.normalized();

        let paginator = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询通知总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询通知页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询通知列表失败"))?;

        let unread_count = Notifications::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err("查询未读通知数量失败"))?;

        Ok(NotificationListResponse {
            items: rows.into_iter().map(|m| m.into_notification()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
            unread_count: unread_count as i64,
        })
    }

    /// 标记通知为已读，只能操作自己的通知
    pub async fn mark_notification_read_impl(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<bool> {
        let existing = Notifications::find_by_id(notification_id)
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询通知失败"))?;

        let Some(model) = existing else {
            return Ok(false);
        };
        if model.is_read {
            return Ok(true);
        }

        let mut active: ActiveModel = model.into();
        active.is_read = Set(true);
        active
            .update(&self.db)
            .await
            .map_err(db_err("标记通知已读失败"))?;

        Ok(true)
    }
}
