//! 招标实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tenders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub tender_number: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub estimated_cost: f64,
    pub submission_deadline: i64,
    pub published_at: Option<i64>,
    pub status: String,
    pub is_checked: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
    pub department_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_delete = "SetNull"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::tender_categories::Entity",
        from = "Column::CategoryId",
        to = "super::tender_categories::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(has_many = "super::tender_documents::Entity")]
    Documents,
    #[sea_orm(has_many = "super::corrigenda::Entity")]
    Corrigenda,
    #[sea_orm(has_many = "super::evaluation_criteria::Entity")]
    EvaluationCriteria,
    #[sea_orm(has_many = "super::clarifications::Entity")]
    Clarifications,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::tender_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::tender_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::corrigenda::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Corrigenda.def()
    }
}

impl Related<super::evaluation_criteria::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationCriteria.def()
    }
}

impl Related<super::clarifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clarifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_tender(self) -> crate::models::tenders::entities::Tender {
        use crate::models::common::datetime::from_timestamp;
        use crate::models::tenders::entities::{Tender, TenderStatus};

        Tender {
            id: self.id,
            tender_number: self.tender_number,
            title: self.title,
            description: self.description,
            estimated_cost: self.estimated_cost,
            submission_deadline: from_timestamp(self.submission_deadline),
            published_at: self.published_at.map(from_timestamp),
            status: self
                .status
                .parse::<TenderStatus>()
                .unwrap_or(TenderStatus::Draft),
            is_checked: self.is_checked,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at.map(from_timestamp),
            department_id: self.department_id,
            category_id: self.category_id,
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
