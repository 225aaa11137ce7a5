//! 更正公告实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "corrigenda")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tender_id: i64,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub issued_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenders::Entity",
        from = "Column::TenderId",
        to = "super::tenders::Column::Id"
    )]
    Tender,
}

impl Related<super::tenders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_corrigendum(self) -> crate::models::tenders::entities::Corrigendum {
        crate::models::tenders::entities::Corrigendum {
            id: self.id,
            tender_id: self.tender_id,
            description: self.description,
            issued_at: crate::models::common::datetime::from_timestamp(self.issued_at),
        }
    }
}
