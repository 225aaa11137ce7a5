//! 预导入模块

pub use super::audit_logs::{ActiveModel as AuditLogActiveModel, Entity as AuditLogs};
pub use super::awards::{ActiveModel as AwardActiveModel, Entity as Awards, Model as AwardModel};
pub use super::bid_documents::{
    ActiveModel as BidDocumentActiveModel, Entity as BidDocuments, Model as BidDocumentModel,
};
pub use super::bids::{ActiveModel as BidActiveModel, Entity as Bids, Model as BidModel};
pub use super::clarifications::{
    ActiveModel as ClarificationActiveModel, Entity as Clarifications,
};
pub use super::corrigenda::{ActiveModel as CorrigendumActiveModel, Entity as Corrigenda};
pub use super::departments::{
    ActiveModel as DepartmentActiveModel, Entity as Departments, Model as DepartmentModel,
};
pub use super::evaluation_criteria::{
    ActiveModel as EvaluationCriterionActiveModel, Entity as EvaluationCriteria,
};
pub use super::institutes::{
    ActiveModel as InstituteActiveModel, Entity as Institutes, Model as InstituteModel,
};
pub use super::notifications::{ActiveModel as NotificationActiveModel, Entity as Notifications};
pub use super::roles::{Entity as Roles, Model as RoleModel};
pub use super::tender_categories::{
    ActiveModel as TenderCategoryActiveModel, Entity as TenderCategories,
};
pub use super::tender_documents::{
    ActiveModel as TenderDocumentActiveModel, Entity as TenderDocuments,
};
pub use super::tenders::{ActiveModel as TenderActiveModel, Entity as Tenders, Model as TenderModel};
pub use super::user_roles::{ActiveModel as UserRoleActiveModel, Entity as UserRoles};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::vendors::{ActiveModel as VendorActiveModel, Entity as Vendors, Model as VendorModel};
