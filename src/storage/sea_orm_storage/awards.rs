//! 授标事务
//!
//! 写入授标、中标投标置为 AWARDED、招标条件更新为 AWARDED、
//! 其余 SUBMITTED 投标置为 DISQUALIFIED，连同审计与通知在同一事务内完成。
//! 招标行上的 `status <> 'awarded'` 条件更新和 `awards.bid_id` 唯一约束
//! 共同保证并发授标只有一方成功。

use std::collections::HashMap;

use super::audit::append_audit;
use super::notifications::create_notifications;
use super::tenders::find_active_tender;
use super::{SeaOrmStorage, db_err, is_unique_violation};
use crate::entity::{awards, bids, departments, tenders, vendors};
use crate::errors::{ETenderError, Result};
use crate::models::{
    audit::entities::{NewAuditEntry, actions},
    awards::{requests::CreateAwardRequest, responses::AwardDetail},
    bids::entities::BidStatus,
    notifications::entities::NewNotification,
    tenders::entities::TenderStatus,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{error, info};

impl SeaOrmStorage {
    pub async fn award_bid_impl(
        &self,
        institute_id: i64,
        actor_user_id: i64,
        req: CreateAwardRequest,
        now: DateTime<Utc>,
    ) -> Result<AwardDetail> {
        // 解析 投标 → 招标 → 部门 → 机构
        let bid = bids::Entity::find_by_id(req.bid_id)
            .filter(bids::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err("查询投标失败"))?
            .ok_or_else(|| ETenderError::not_found(format!("Bid {} not found", req.bid_id)))?;

        let tender = find_active_tender(&self.db, bid.tender_id)
            .await?
            .ok_or_else(|| ETenderError::not_found(format!("Bid {} not found", req.bid_id)))?;

        let dept_id = tender.department_id.ok_or_else(|| {
            ETenderError::invalid_state("Tender is not linked to any department")
        })?;
        let department = departments::Entity::find_by_id(dept_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询部门失败"))?
            .ok_or_else(|| ETenderError::invalid_state("Tender department no longer exists"))?;
        if department.institute_id != institute_id {
            return Err(ETenderError::authorization(
                "Tender belongs to another institute",
            ));
        }

        if tender.status == TenderStatus::AWARDED {
            return Err(ETenderError::conflict("Tender has already been awarded"));
        }
        if now.timestamp() < tender.submission_deadline {
            return Err(ETenderError::conflict(
                "Too early to award: submission deadline has not passed",
            ));
        }
        if bid.status != BidStatus::SUBMITTED {
            return Err(ETenderError::conflict(format!(
                "Bid is {} and cannot be awarded",
                bid.status
            )));
        }

        let result = self
            .run_award_transaction(bid, tender, actor_user_id, &req, now)
            .await;
        match &result {
            Ok(detail) => info!(
                "Tender {} awarded to bid {}, {} bids disqualified",
                detail.tender.id, detail.bid.id, detail.disqualified_bids
            ),
            Err(e) if e.is_server_error() => error!("Award transaction failed: {}", e),
            Err(e) => info!("Award rejected: {}", e),
        }
        result
    }

    pub(super) async fn run_award_transaction(
        &self,
        bid: bids::Model,
        tender: tenders::Model,
        actor_user_id: i64,
        req: &CreateAwardRequest,
        now: DateTime<Utc>,
    ) -> Result<AwardDetail> {
        let ts = now.timestamp();
        // 任何一步失败时 txn 被丢弃即回滚
        let txn = self.db.begin().await.map_err(db_err("开启授标事务失败"))?;

        let award = awards::ActiveModel {
            bid_id: Set(bid.id),
            contract_start: Set(req.contract_start.timestamp()),
            contract_end: Set(req.contract_end.timestamp()),
            awarded_at: Set(ts),
            is_deleted: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ETenderError::conflict("Bid has already been awarded")
            } else {
                ETenderError::database_operation(format!("创建授标失败: {e}"))
            }
        })?;

        // 事务外读到的投标状态可能已过期，以条件更新为准
        let won = bids::Entity::update_many()
            .col_expr(bids::Column::Status, Expr::value(BidStatus::AWARDED))
            .filter(bids::Column::Id.eq(bid.id))
            .filter(bids::Column::Status.eq(BidStatus::SUBMITTED))
            .filter(bids::Column::IsDeleted.eq(false))
            .exec(&txn)
            .await
            .map_err(db_err("更新中标投标失败"))?;
        if won.rows_affected == 0 {
            return Err(ETenderError::conflict(
                "Bid is no longer submitted and cannot be awarded",
            ));
        }

        let updated = tenders::Entity::update_many()
            .col_expr(tenders::Column::Status, Expr::value(TenderStatus::AWARDED))
            .col_expr(tenders::Column::UpdatedAt, Expr::value(ts))
            .filter(tenders::Column::Id.eq(tender.id))
            .filter(tenders::Column::Status.ne(TenderStatus::AWARDED))
            .filter(tenders::Column::IsDeleted.eq(false))
            .exec(&txn)
            .await
            .map_err(db_err("更新招标状态失败"))?;
        if updated.rows_affected == 0 {
            return Err(ETenderError::conflict("Tender has already been awarded"));
        }

        // 其余仍为 SUBMITTED 的投标全部淘汰，其他状态不动
        let losers = bids::Entity::find()
            .filter(bids::Column::TenderId.eq(tender.id))
            .filter(bids::Column::Id.ne(bid.id))
            .filter(bids::Column::IsDeleted.eq(false))
            .filter(bids::Column::Status.eq(BidStatus::SUBMITTED))
            .all(&txn)
            .await
            .map_err(db_err("查询落选投标失败"))?;
        let loser_ids: Vec<i64> = losers.iter().map(|b| b.id).collect();
        let mut disqualified = 0;
        if !loser_ids.is_empty() {
            disqualified = bids::Entity::update_many()
                .col_expr(bids::Column::Status, Expr::value(BidStatus::DISQUALIFIED))
                .filter(bids::Column::Id.is_in(loser_ids))
                .filter(bids::Column::Status.eq(BidStatus::SUBMITTED))
                .exec(&txn)
                .await
                .map_err(db_err("更新落选投标失败"))?
                .rows_affected;
        }

        append_audit(
            &txn,
            NewAuditEntry::new(
                ("user", actor_user_id),
                actions::AWARD_CREATE,
                "tender",
                tender.id,
            )
            .with_details(format!(
                "bid {} awarded, {} disqualified",
                bid.id, disqualified
            )),
            now,
        )
        .await?;

        // 通知中标与落选供应商
        let mut vendor_ids: Vec<i64> = losers.iter().map(|b| b.vendor_id).collect();
        vendor_ids.push(bid.vendor_id);
        let vendor_users: HashMap<i64, i64> = vendors::Entity::find()
            .filter(vendors::Column::Id.is_in(vendor_ids))
            .all(&txn)
            .await
            .map_err(db_err("查询供应商失败"))?
            .into_iter()
            .map(|v| (v.id, v.user_id))
            .collect();

        let mut notifications = Vec::with_capacity(losers.len() + 1);
        if let Some(&user_id) = vendor_users.get(&bid.vendor_id) {
            notifications.push(NewNotification {
                user_id,
                title: "Bid awarded".to_string(),
                message: format!(
                    "Your bid on tender {} ({}) has been awarded.",
                    tender.tender_number, tender.title
                ),
            });
        }
        for loser in &losers {
            if let Some(&user_id) = vendor_users.get(&loser.vendor_id) {
                notifications.push(NewNotification {
                    user_id,
                    title: "Bid not selected".to_string(),
                    message: format!(
                        "Tender {} ({}) has been awarded to another bidder.",
                        tender.tender_number, tender.title
                    ),
                });
            }
        }
        create_notifications(&txn, notifications, now).await?;

        txn.commit().await.map_err(db_err("提交授标事务失败"))?;

        let mut bid = bid.into_bid();
        bid.status = BidStatus::Awarded;
        let mut tender = tender.into_tender();
        tender.status = TenderStatus::Awarded;
        tender.updated_at = now;

        Ok(AwardDetail {
            award: award.into_award(),
            bid,
            tender,
            disqualified_bids: disqualified as i64,
        })
    }

    /// 机构下的全部授标
    pub async fn list_awards_impl(&self, institute_id: i64) -> Result<Vec<AwardDetail>> {
        let dept_ids: Vec<i64> = departments::Entity::find()
            .filter(departments::Column::InstituteId.eq(institute_id))
            .all(&self.db)
            .await
            .map_err(db_err("查询部门失败"))?
            .into_iter()
            .map(|d| d.id)
            .collect();
        if dept_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tender_rows = tenders::Entity::find()
            .filter(tenders::Column::DepartmentId.is_in(dept_ids))
            .filter(tenders::Column::Status.eq(TenderStatus::AWARDED))
            .all(&self.db)
            .await
            .map_err(db_err("查询招标失败"))?;
        if tender_rows.is_empty() {
            return Ok(Vec::new());
        }
        let tender_ids: Vec<i64> = tender_rows.iter().map(|t| t.id).collect();

        let bid_rows = bids::Entity::find()
            .filter(bids::Column::TenderId.is_in(tender_ids))
            .all(&self.db)
            .await
            .map_err(db_err("查询投标失败"))?;
        let bid_ids: Vec<i64> = bid_rows.iter().map(|b| b.id).collect();

        let award_rows = awards::Entity::find()
            .filter(awards::Column::BidId.is_in(bid_ids))
            .filter(awards::Column::IsDeleted.eq(false))
            .order_by_desc(awards::Column::AwardedAt)
            .all(&self.db)
            .await
            .map_err(db_err("查询授标失败"))?;

        let mut disqualified: HashMap<i64, i64> = HashMap::new();
        for b in &bid_rows {
            if b.status == BidStatus::DISQUALIFIED {
                *disqualified.entry(b.tender_id).or_default() += 1;
            }
        }
        let bid_map: HashMap<i64, bids::Model> =
            bid_rows.into_iter().map(|b| (b.id, b)).collect();
        let tender_map: HashMap<i64, tenders::Model> =
            tender_rows.into_iter().map(|t| (t.id, t)).collect();

        Ok(award_rows
            .into_iter()
            .filter_map(|a| {
                let bid = bid_map.get(&a.bid_id)?.clone();
                let tender = tender_map.get(&bid.tender_id)?.clone();
                Some(AwardDetail {
                    disqualified_bids: disqualified.get(&tender.id).copied().unwrap_or(0),
                    award: a.into_award(),
                    bid: bid.into_bid(),
                    tender: tender.into_tender(),
                })
            })
            .collect())
    }
}
