//! 机构实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "institutes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub institute_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
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
    #[sea_orm(has_many = "super::departments::Entity")]
    Departments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_institute(self) -> crate::models::users::entities::Institute {
        use crate::models::common::datetime::from_timestamp;
        use crate::models::users::entities::{Institute, VerificationStatus};

        Institute {
            id: self.id,
            user_id: self.user_id,
            institute_name: self.institute_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            address: self.address,
            verification_status: self
                .verification_status
                .parse::<VerificationStatus>()
                .unwrap_or(VerificationStatus::Pending),
            created_at: from_timestamp(self.created_at),
        }
    }
}
