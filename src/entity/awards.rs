//! 授标实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "awards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub bid_id: i64,
    pub contract_start: i64,
    pub contract_end: i64,
    pub awarded_at: i64,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bids::Entity",
        from = "Column::BidId",
        to = "super::bids::Column::Id"
    )]
    Bid,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bid.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_award(self) -> crate::models::awards::entities::Award {
        use crate::models::common::datetime::from_timestamp;

        crate::models::awards::entities::Award {
            id: self.id,
            bid_id: self.bid_id,
            contract_start: from_timestamp(self.contract_start),
            contract_end: from_timestamp(self.contract_end),
            awarded_at: from_timestamp(self.awarded_at),
            is_deleted: self.is_deleted,
        }
    }
}
