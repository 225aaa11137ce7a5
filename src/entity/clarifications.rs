//! 澄清问答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clarifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tender_id: i64,
    pub vendor_id: i64,
    #[sea_orm(column_type = "Text")]
    pub question: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub answer: Option<String>,
    pub asked_at: i64,
    pub answered_at: Option<i64>,
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

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_clarification(self) -> crate::models::tenders::entities::Clarification {
        use crate::models::common::datetime::from_timestamp;

        crate::models::tenders::entities::Clarification {
            id: self.id,
            tender_id: self.tender_id,
            vendor_id: self.vendor_id,
            question: self.question,
            answer: self.answer,
            asked_at: from_timestamp(self.asked_at),
            answered_at: self.answered_at.map(from_timestamp),
        }
    }
}
