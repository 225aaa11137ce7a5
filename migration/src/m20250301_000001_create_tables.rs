use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表（供应商与机构管理员共用）
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk(Users::Id))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 角色表
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(pk(Roles::Id))
                    .col(ColumnDef::new(Roles::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // 用户-角色关联表
        manager
            .create_table(
                Table::create()
                    .table(UserRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserRoles::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserRoles::RoleId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserRoles::UserId)
                            .col(UserRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserRoles::Table, UserRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserRoles::Table, UserRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 机构表，与用户一对一
        manager
            .create_table(
                Table::create()
                    .table(Institutes::Table)
                    .if_not_exists()
                    .col(pk(Institutes::Id))
                    .col(
                        ColumnDef::new(Institutes::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Institutes::InstituteName).string().not_null())
                    .col(ColumnDef::new(Institutes::ContactEmail).string().not_null())
                    .col(ColumnDef::new(Institutes::ContactPhone).string().null())
                    .col(ColumnDef::new(Institutes::Address).text().null())
                    .col(
                        ColumnDef::new(Institutes::VerificationStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Institutes::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Institutes::Table, Institutes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 供应商表，与用户一对一
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(pk(Vendors::Id))
                    .col(
                        ColumnDef::new(Vendors::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Vendors::CompanyName).string().not_null())
                    .col(ColumnDef::new(Vendors::RegistrationNumber).string().null())
                    .col(ColumnDef::new(Vendors::GstNumber).string().null())
                    .col(ColumnDef::new(Vendors::Address).text().null())
                    .col(
                        ColumnDef::new(Vendors::VerificationStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Vendors::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Vendors::Table, Vendors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 部门表，独立登录凭据
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(pk(Departments::Id))
                    .col(
                        ColumnDef::new(Departments::InstituteId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Departments::DepartmentName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Departments::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Departments::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Departments::HeadOfDepartment)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Departments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Departments::Table, Departments::InstituteId)
                            .to(Institutes::Table, Institutes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 招标分类表
        manager
            .create_table(
                Table::create()
                    .table(TenderCategories::Table)
                    .if_not_exists()
                    .col(pk(TenderCategories::Id))
                    .col(
                        ColumnDef::new(TenderCategories::CategoryName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TenderCategories::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 招标表
        manager
            .create_table(
                Table::create()
                    .table(Tenders::Table)
                    .if_not_exists()
                    .col(pk(Tenders::Id))
                    .col(
                        ColumnDef::new(Tenders::TenderNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tenders::Title).string().not_null())
                    .col(ColumnDef::new(Tenders::Description).text().not_null())
                    .col(ColumnDef::new(Tenders::EstimatedCost).double().not_null())
                    .col(
                        ColumnDef::new(Tenders::SubmissionDeadline)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tenders::PublishedAt).big_integer().null())
                    .col(ColumnDef::new(Tenders::Status).string().not_null())
                    .col(
                        ColumnDef::new(Tenders::IsChecked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tenders::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tenders::DeletedAt).big_integer().null())
                    .col(ColumnDef::new(Tenders::DepartmentId).big_integer().null())
                    .col(ColumnDef::new(Tenders::CategoryId).big_integer().null())
                    .col(ColumnDef::new(Tenders::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tenders::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tenders::Table, Tenders::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tenders::Table, Tenders::CategoryId)
                            .to(TenderCategories::Table, TenderCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 招标文件表
        manager
            .create_table(
                Table::create()
                    .table(TenderDocuments::Table)
                    .if_not_exists()
                    .col(pk(TenderDocuments::Id))
                    .col(
                        ColumnDef::new(TenderDocuments::TenderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenderDocuments::DocumentName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TenderDocuments::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(TenderDocuments::UploadedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TenderDocuments::Table, TenderDocuments::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 更正公告表
        manager
            .create_table(
                Table::create()
                    .table(Corrigenda::Table)
                    .if_not_exists()
                    .col(pk(Corrigenda::Id))
                    .col(ColumnDef::new(Corrigenda::TenderId).big_integer().not_null())
                    .col(ColumnDef::new(Corrigenda::Description).text().not_null())
                    .col(ColumnDef::new(Corrigenda::IssuedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Corrigenda::Table, Corrigenda::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 评标标准表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationCriteria::Table)
                    .if_not_exists()
                    .col(pk(EvaluationCriteria::Id))
                    .col(
                        ColumnDef::new(EvaluationCriteria::TenderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationCriteria::Criterion)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationCriteria::Weight).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationCriteria::Table, EvaluationCriteria::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 澄清问答表
        manager
            .create_table(
                Table::create()
                    .table(Clarifications::Table)
                    .if_not_exists()
                    .col(pk(Clarifications::Id))
                    .col(
                        ColumnDef::new(Clarifications::TenderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clarifications::VendorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Clarifications::Question).text().not_null())
                    .col(ColumnDef::new(Clarifications::Answer).text().null())
                    .col(
                        ColumnDef::new(Clarifications::AskedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clarifications::AnsweredAt)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Clarifications::Table, Clarifications::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Clarifications::Table, Clarifications::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 投标表
        manager
            .create_table(
                Table::create()
                    .table(Bids::Table)
                    .if_not_exists()
                    .col(pk(Bids::Id))
                    .col(ColumnDef::new(Bids::TenderId).big_integer().not_null())
                    .col(ColumnDef::new(Bids::VendorId).big_integer().not_null())
                    .col(ColumnDef::new(Bids::Amount).double().not_null())
                    .col(ColumnDef::new(Bids::SubmittedAt).big_integer().not_null())
                    .col(ColumnDef::new(Bids::Status).string().not_null())
                    .col(
                        ColumnDef::new(Bids::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Bids::DeletedAt).big_integer().null())
                    .col(ColumnDef::new(Bids::CommitteeId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bids::Table, Bids::TenderId)
                            .to(Tenders::Table, Tenders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bids::Table, Bids::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 投标文件表
        manager
            .create_table(
                Table::create()
                    .table(BidDocuments::Table)
                    .if_not_exists()
                    .col(pk(BidDocuments::Id))
                    .col(ColumnDef::new(BidDocuments::BidId).big_integer().not_null())
                    .col(
                        ColumnDef::new(BidDocuments::DocumentName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BidDocuments::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(BidDocuments::UploadedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BidDocuments::Table, BidDocuments::BidId)
                            .to(Bids::Table, Bids::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 中标表，一个投标最多一条
        manager
            .create_table(
                Table::create()
                    .table(Awards::Table)
                    .if_not_exists()
                    .col(pk(Awards::Id))
                    .col(
                        ColumnDef::new(Awards::BidId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Awards::ContractStart).big_integer().not_null())
                    .col(ColumnDef::new(Awards::ContractEnd).big_integer().not_null())
                    .col(ColumnDef::new(Awards::AwardedAt).big_integer().not_null())
                    .col(
                        ColumnDef::new(Awards::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Awards::Table, Awards::BidId)
                            .to(Bids::Table, Bids::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(pk(Notifications::Id))
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 审计日志表
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(pk(AuditLogs::Id))
                    .col(ColumnDef::new(AuditLogs::ActorKind).string().not_null())
                    .col(ColumnDef::new(AuditLogs::ActorId).big_integer().null())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                    .col(ColumnDef::new(AuditLogs::EntityId).big_integer().null())
                    .col(ColumnDef::new(AuditLogs::Details).text().null())
                    .col(ColumnDef::new(AuditLogs::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_departments_institute_name")
                    .table(Departments::Table)
                    .col(Departments::InstituteId)
                    .col(Departments::DepartmentName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tenders_department_id")
                    .table(Tenders::Table)
                    .col(Tenders::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tenders_is_checked")
                    .table(Tenders::Table)
                    .col(Tenders::IsChecked)
                    .col(Tenders::IsDeleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bids_tender_id")
                    .table(Bids::Table)
                    .col(Bids::TenderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        // 每个供应商对同一招标至多一条未删除投标
        // MySQL 不支持部分索引，退化为普通唯一索引
        match manager.get_database_backend() {
            DbBackend::MySql => {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .unique()
                            .name("idx_bids_active_tender_vendor")
                            .table(Bids::Table)
                            .col(Bids::TenderId)
                            .col(Bids::VendorId)
                            .to_owned(),
                    )
                    .await?;
            }
            _ => {
                manager
                    .get_connection()
                    .execute_unprepared(
                        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bids_active_tender_vendor \
                         ON bids (tender_id, vendor_id) WHERE NOT is_deleted",
                    )
                    .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Awards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BidDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bids::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clarifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationCriteria::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Corrigenda::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TenderDocuments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TenderCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Institutes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Roles {
    #[sea_orm(iden = "roles")]
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum UserRoles {
    #[sea_orm(iden = "user_roles")]
    Table,
    UserId,
    RoleId,
}

#[derive(DeriveIden)]
enum Institutes {
    #[sea_orm(iden = "institutes")]
    Table,
    Id,
    UserId,
    InstituteName,
    ContactEmail,
    ContactPhone,
    Address,
    VerificationStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vendors {
    #[sea_orm(iden = "vendors")]
    Table,
    Id,
    UserId,
    CompanyName,
    RegistrationNumber,
    GstNumber,
    Address,
    VerificationStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Departments {
    #[sea_orm(iden = "departments")]
    Table,
    Id,
    InstituteId,
    DepartmentName,
    Username,
    PasswordHash,
    HeadOfDepartment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TenderCategories {
    #[sea_orm(iden = "tender_categories")]
    Table,
    Id,
    CategoryName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tenders {
    #[sea_orm(iden = "tenders")]
    Table,
    Id,
    TenderNumber,
    Title,
    Description,
    EstimatedCost,
    SubmissionDeadline,
    PublishedAt,
    Status,
    IsChecked,
    IsDeleted,
    DeletedAt,
    DepartmentId,
    CategoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TenderDocuments {
    #[sea_orm(iden = "tender_documents")]
    Table,
    Id,
    TenderId,
    DocumentName,
    FilePath,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Corrigenda {
    #[sea_orm(iden = "corrigenda")]
    Table,
    Id,
    TenderId,
    Description,
    IssuedAt,
}

#[derive(DeriveIden)]
enum EvaluationCriteria {
    #[sea_orm(iden = "evaluation_criteria")]
    Table,
    Id,
    TenderId,
    Criterion,
    Weight,
}

#[derive(DeriveIden)]
enum Clarifications {
    #[sea_orm(iden = "clarifications")]
    Table,
    Id,
    TenderId,
    VendorId,
    Question,
    Answer,
    AskedAt,
    AnsweredAt,
}

#[derive(DeriveIden)]
enum Bids {
    #[sea_orm(iden = "bids")]
    Table,
    Id,
    TenderId,
    VendorId,
    Amount,
    SubmittedAt,
    Status,
    IsDeleted,
    DeletedAt,
    CommitteeId,
}

#[derive(DeriveIden)]
enum BidDocuments {
    #[sea_orm(iden = "bid_documents")]
    Table,
    Id,
    BidId,
    DocumentName,
    FilePath,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Awards {
    #[sea_orm(iden = "awards")]
    Table,
    Id,
    BidId,
    ContractStart,
    ContractEnd,
    AwardedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Notifications {
    #[sea_orm(iden = "notifications")]
    Table,
    Id,
    UserId,
    Title,
    Message,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AuditLogs {
    #[sea_orm(iden = "audit_logs")]
    Table,
    Id,
    ActorKind,
    ActorId,
    Action,
    EntityType,
    EntityId,
    Details,
    CreatedAt,
}
