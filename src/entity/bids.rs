//! 投标实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tender_id: i64,
    pub vendor_id: i64,
    pub amount: f64,
    pub submitted_at: i64,
    pub status: String,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
    pub committee_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenders::Entity",
        from = "Column::TenderId",
        to = "super::tenders::Column::Id"
    )]
    Tender,
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::bid_documents::Entity")]
    Documents,
    #[sea_orm(has_one = "super::awards::Entity")]
    Award,
}

impl Related<super::tenders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::bid_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::awards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Award.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_bid(self) -> crate::models::bids::entities::Bid {
        use crate::models::bids::entities::{Bid, BidStatus};
        use crate::models::common::datetime::from_timestamp;

        Bid {
            id: self.id,
            tender_id: self.tender_id,
            vendor_id: self.vendor_id,
            amount: self.amount,
            submitted_at: from_timestamp(self.submitted_at),
            status: self
                .status
                .parse::<BidStatus>()
                .unwrap_or(BidStatus::Submitted),
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at.map(from_timestamp),
            committee_id: self.committee_id,
        }
    }
}
