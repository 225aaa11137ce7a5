use super::{SeaOrmStorage, db_err, is_unique_violation};
use crate::entity::tender_categories;
use crate::errors::{ETenderError, Result};
use crate::models::tenders::entities::TenderCategory;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// 按名称获取或创建分类
///
/// 并发创建同名分类时，插入失败的一方回读已存在的行。
pub(super) async fn get_or_create_category<C: ConnectionTrait>(
    db: &C,
    name: &str,
    ts: i64,
) -> Result<tender_categories::Model> {
    let find = || {
        tender_categories::Entity::find().filter(tender_categories::Column::CategoryName.eq(name))
    };

    if let Some(existing) = find().one(db).await.map_err(db_err("查询分类失败"))? {
        return Ok(existing);
    }

    let inserted = tender_categories::ActiveModel {
        category_name: Set(name.to_string()),
        created_at: Set(ts),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(model) => Ok(model),
        Err(e) if is_unique_violation(&e) => find()
            .one(db)
            .await
            .map_err(db_err("查询分类失败"))?
            .ok_or_else(|| ETenderError::internal("Category vanished after conflict")),
        Err(e) => Err(ETenderError::database_operation(format!(
            "创建分类失败: {e}"
        ))),
    }
}

impl SeaOrmStorage {
    /// 显式创建分类，同名时冲突
    pub async fn create_category_impl(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<TenderCategory> {
        let result = tender_categories::ActiveModel {
            category_name: Set(name.to_string()),
            created_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ETenderError::conflict(format!("Category '{name}' already exists"))
            } else {
                ETenderError::database_operation(format!("创建分类失败: {e}"))
            }
        })?;

        Ok(result.into_category())
    }

    pub async fn list_categories_impl(&self) -> Result<Vec<TenderCategory>> {
        let rows = tender_categories::Entity::find()
            .order_by_asc(tender_categories::Column::CategoryName)
            .all(&self.db)
            .await
            .map_err(db_err("查询分类列表失败"))?;

        Ok(rows.into_iter().map(|m| m.into_category()).collect())
    }
}
