use super::projections::load_bid_details;
use super::tenders::find_active_tender;
use super::{SeaOrmStorage, db_err, is_unique_violation};
use crate::entity::{bid_documents, bids};
use crate::errors::{ETenderError, Result};
use crate::utils::validate::validate_positive_amount;
use crate::models::{
    bids::{
        entities::{Bid, BidDocument, BidStatus},
        requests::SubmitBidRequest,
        responses::{BidDetail, BidSubmissionResponse, TenderSummary},
    },
    tenders::entities::TenderStatus,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

impl SeaOrmStorage {
    async fn vendor_bid_model(&self, vendor_id: i64, bid_id: i64) -> Result<Option<bids::Model>> {
        bids::Entity::find_by_id(bid_id)
            .filter(bids::Column::VendorId.eq(vendor_id))
            .filter(bids::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await
            .map_err(db_err("查询投标失败"))
    }

    /// 供应商投标
    ///
    /// 先查后插只是快速失败，(tender_id, vendor_id) 上的部分唯一索引才是最终裁决。
    pub async fn submit_bid_impl(
        &self,
        vendor_id: i64,
        req: SubmitBidRequest,
        now: DateTime<Utc>,
    ) -> Result<BidSubmissionResponse> {
        validate_positive_amount(req.amount, "amount").map_err(ETenderError::validation)?;

        let tender = find_active_tender(&self.db, req.tender_id)
            .await?
            .map(|m| m.into_tender())
            .filter(|t| t.status.accepts_bids())
            .ok_or_else(|| {
                ETenderError::not_found(format!(
                    "Tender {} not found or not open for bidding",
                    req.tender_id
                ))
            })?;

        if now >= tender.submission_deadline {
            return Err(ETenderError::conflict("Submission deadline has passed"));
        }

        let existing = bids::Entity::find()
            .filter(bids::Column::TenderId.eq(tender.id))
            .filter(bids::Column::VendorId.eq(vendor_id))
            .filter(bids::Column::IsDeleted.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err("查询投标失败"))?;
        if existing > 0 {
            return Err(ETenderError::conflict(
                "You have already submitted a bid for this tender",
            ));
        }

        let model = bids::ActiveModel {
            tender_id: Set(tender.id),
            vendor_id: Set(vendor_id),
            amount: Set(req.amount),
            submitted_at: Set(now.timestamp()),
            status: Set(BidStatus::Submitted.to_string()),
            is_deleted: Set(false),
            deleted_at: Set(None),
            committee_id: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ETenderError::conflict("You have already submitted a bid for this tender")
            } else {
                ETenderError::database_operation(format!("创建投标失败: {e}"))
            }
        })?;

        let bids_received = bids::Entity::find()
            .filter(bids::Column::TenderId.eq(tender.id))
            .filter(bids::Column::IsDeleted.eq(false))
            .count(&self.db)
            .await
            .map_err(db_err("查询投标数量失败"))?;

        info!(
            "Vendor {} submitted bid {} on tender {}",
            vendor_id, model.id, tender.id
        );

        Ok(BidSubmissionResponse {
            bid: model.into_bid(),
            tender: TenderSummary {
                id: tender.id,
                tender_number: tender.tender_number,
                title: tender.title,
                estimated_cost: tender.estimated_cost,
                submission_deadline: tender.submission_deadline,
                status: tender.status,
                bids_received: bids_received as i64,
                user_bid_submitted: true,
            },
        })
    }

    pub async fn list_vendor_bids_impl(&self, vendor_id: i64) -> Result<Vec<BidDetail>> {
        let rows = bids::Entity::find()
            .filter(bids::Column::VendorId.eq(vendor_id))
            .filter(bids::Column::IsDeleted.eq(false))
            .order_by_desc(bids::Column::SubmittedAt)
            .order_by_desc(bids::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询投标列表失败"))?;

        load_bid_details(&self.db, rows).await
    }

    pub async fn get_vendor_bid_impl(
        &self,
        vendor_id: i64,
        bid_id: i64,
    ) -> Result<Option<BidDetail>> {
        let Some(model) = self.vendor_bid_model(vendor_id, bid_id).await? else {
            return Ok(None);
        };
        Ok(load_bid_details(&self.db, vec![model]).await?.pop())
    }

    /// 供应商修改自己的投标状态
    pub async fn update_bid_status_impl(
        &self,
        vendor_id: i64,
        bid_id: i64,
        status: BidStatus,
    ) -> Result<Bid> {
        let model = self
            .vendor_bid_model(vendor_id, bid_id)
            .await?
            .ok_or_else(|| ETenderError::not_found(format!("Bid {bid_id} not found")))?;

        let current = model
            .status
            .parse::<BidStatus>()
            .unwrap_or(BidStatus::Submitted);
        if !BidStatus::vendor_can_transition(current, status) {
            return Err(ETenderError::conflict(format!(
                "Bid status cannot change from {current} to {status}"
            )));
        }

        let tender_awarded = find_active_tender(&self.db, model.tender_id)
            .await?
            .is_some_and(|t| t.status == TenderStatus::AWARDED);
        if tender_awarded {
            return Err(ETenderError::conflict(
                "Tender has already been awarded",
            ));
        }

        // 条件更新，与授标事务并发时只有一方生效
        let result = bids::Entity::update_many()
            .col_expr(bids::Column::Status, Expr::value(status.to_string()))
            .filter(bids::Column::Id.eq(bid_id))
            .filter(bids::Column::Status.eq(current.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err("更新投标状态失败"))?;
        if result.rows_affected == 0 {
            return Err(ETenderError::conflict("Bid status changed concurrently"));
        }

        let mut bid = model.into_bid();
        bid.status = status;
        Ok(bid)
    }

    pub async fn add_bid_document_impl(
        &self,
        bid_id: i64,
        document_name: String,
        locator: String,
        now: DateTime<Utc>,
    ) -> Result<BidDocument> {
        let model = bid_documents::ActiveModel {
            bid_id: Set(bid_id),
            document_name: Set(document_name),
            file_path: Set(locator),
            uploaded_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("保存投标文档失败"))?;

        Ok(model.into_document())
    }
}
