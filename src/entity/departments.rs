//! 部门实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub institute_id: i64,
    pub department_name: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub head_of_department: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::institutes::Entity",
        from = "Column::InstituteId",
        to = "super::institutes::Column::Id"
    )]
    Institute,
    #[sea_orm(has_many = "super::tenders::Entity")]
    Tenders,
}

impl Related<super::institutes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institute.def()
    }
}

impl Related<super::tenders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_department(self) -> crate::models::departments::entities::Department {
        use crate::models::common::datetime::from_timestamp;
        use crate::models::departments::entities::Department;

        Department {
            id: self.id,
            institute_id: self.institute_id,
            department_name: self.department_name,
            username: self.username,
            password_hash: self.password_hash,
            head_of_department: self.head_of_department,
            created_at: from_timestamp(self.created_at),
        }
    }
}
