//! 供应商实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub company_name: String,
    pub registration_number: Option<String>,
    pub gst_number: Option<String>,
    pub address: Option<String>,
    pub verification_status: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_vendor(self) -> crate::models::users::entities::Vendor {
        use crate::models::common::datetime::from_timestamp;
        use crate::models::users::entities::{Vendor, VerificationStatus};

        Vendor {
            id: self.id,
            user_id: self.user_id,
            company_name: self.company_name,
            registration_number: self.registration_number,
            gst_number: self.gst_number,
            address: self.address,
            verification_status: self
                .verification_status
                .parse::<VerificationStatus>()
                .unwrap_or(VerificationStatus::Pending),
            created_at: from_timestamp(self.created_at),
        }
    }
}
