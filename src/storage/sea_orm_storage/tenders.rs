use super::audit::append_audit;
use super::categories::get_or_create_category;
use super::{SeaOrmStorage, db_err, is_unique_violation};
use crate::entity::{
    bids, clarifications, corrigenda, departments, evaluation_criteria, tender_documents, tenders,
};
use crate::errors::{ETenderError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    audit::entities::{NewAuditEntry, actions},
    tenders::{
        entities::{
            Clarification, Corrigendum, EvaluationCriterion, Tender, TenderDocument, TenderStatus,
        },
        requests::{NewTender, TenderScope, UpdateTenderRequest},
        responses::TenderListResponse,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, TransactionTrait,
};
use tracing::info;

/// 未软删除的招标行
pub(super) async fn find_active_tender<C: ConnectionTrait>(
    db: &C,
    tender_id: i64,
) -> Result<Option<tenders::Model>> {
    tenders::Entity::find_by_id(tender_id)
        .filter(tenders::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(db_err("查询招标失败"))
}

const FINAL_STATUSES: [&str; 3] = [
    TenderStatus::AWARDED,
    TenderStatus::CANCELLED,
    TenderStatus::CLOSED,
];

fn tender_status(model: &tenders::Model) -> TenderStatus {
    model
        .status
        .parse::<TenderStatus>()
        .unwrap_or(TenderStatus::Draft)
}

impl SeaOrmStorage {
    async fn department_tender_model(
        &self,
        dept_id: i64,
        tender_id: i64,
    ) -> Result<tenders::Model> {
        find_active_tender(&self.db, tender_id)
            .await?
            .filter(|t| t.department_id == Some(dept_id))
            .ok_or_else(|| ETenderError::not_found(format!("Tender {tender_id} not found")))
    }

    /// 创建招标，初始为草稿且不可见
    pub async fn create_tender_impl(
        &self,
        tender: NewTender,
        actor: (&'static str, i64),
        now: DateTime<Utc>,
    ) -> Result<Tender> {
        let ts = now.timestamp();

        // 分类在事务外获取或创建，冲突时回读
        let category_id = match tender
            .category_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(name) => Some(get_or_create_category(&self.db, name, ts).await?.id),
            None => None,
        };

        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let model = tenders::ActiveModel {
            tender_number: Set(tender.tender_number.clone()),
            title: Set(tender.title),
            description: Set(tender.description),
            estimated_cost: Set(tender.estimated_cost),
            submission_deadline: Set(tender.submission_deadline.timestamp()),
            published_at: Set(None),
            status: Set(TenderStatus::Draft.to_string()),
            is_checked: Set(false),
            is_deleted: Set(false),
            deleted_at: Set(None),
            department_id: Set(Some(tender.department_id)),
            category_id: Set(category_id),
            created_at: Set(ts),
            updated_at: Set(ts),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ETenderError::conflict(format!(
                    "Tender number {} already exists",
                    tender.tender_number
                ))
            } else {
                ETenderError::database_operation(format!("创建招标失败: {e}"))
            }
        })?;

        append_audit(
            &txn,
            NewAuditEntry::new(actor, actions::TENDER_CREATE, "tender", model.id)
                .with_details(model.tender_number.clone()),
            now,
        )
        .await?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        Ok(model.into_tender())
    }

    pub async fn get_tender_by_id_impl(&self, tender_id: i64) -> Result<Option<Tender>> {
        Ok(find_active_tender(&self.db, tender_id)
            .await?
            .map(|m| m.into_tender()))
    }

    pub async fn get_department_tender_impl(&self, dept_id: i64, tender_id: i64) -> Result<Tender> {
        Ok(self
            .department_tender_model(dept_id, tender_id)
            .await?
            .into_tender())
    }

    /// 部门编辑招标
    pub async fn update_tender_impl(
        &self,
        dept_id: i64,
        tender_id: i64,
        update: UpdateTenderRequest,
        now: DateTime<Utc>,
    ) -> Result<Tender> {
        let model = self.department_tender_model(dept_id, tender_id).await?;

        if tender_status(&model).is_final() {
            return Err(ETenderError::conflict(format!(
                "Tender is {} and can no longer be modified",
                model.status
            )));
        }

        let new_deadline = update
            .submission_deadline
            .map(|d| d.timestamp())
            .filter(|ts| *ts != model.submission_deadline);

        let mut query = tenders::Entity::update_many()
            .col_expr(tenders::Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(tenders::Column::Id.eq(tender_id))
            .filter(tenders::Column::IsDeleted.eq(false))
            .filter(tenders::Column::Status.is_not_in(FINAL_STATUSES));
        if let Some(title) = update.title {
            query = query.col_expr(tenders::Column::Title, Expr::value(title));
        }
        if let Some(description) = update.description {
            query = query.col_expr(tenders::Column::Description, Expr::value(description));
        }
        if let Some(cost) = update.estimated_cost {
            query = query.col_expr(tenders::Column::EstimatedCost, Expr::value(cost));
        }
        // 已有投标后截止时间不可变，条件写进同一条 UPDATE
        if let Some(ts) = new_deadline {
            let live_bids = bids::Entity::find()
                .select_only()
                .column(bids::Column::TenderId)
                .filter(bids::Column::TenderId.eq(tender_id))
                .filter(bids::Column::IsDeleted.eq(false))
                .into_query();
            query = query
                .col_expr(tenders::Column::SubmissionDeadline, Expr::value(ts))
                .filter(tenders::Column::Id.not_in_subquery(live_bids));
        }

        let result = query
            .exec(&self.db)
            .await
            .map_err(db_err("更新招标失败"))?;
        if result.rows_affected == 0 {
            return Err(if new_deadline.is_some() {
                ETenderError::conflict(
                    "Submission deadline cannot change after bids were received",
                )
            } else {
                ETenderError::conflict("Tender can no longer be modified")
            });
        }

        Ok(self
            .department_tender_model(dept_id, tender_id)
            .await?
            .into_tender())
    }

    /// 软删除招标，其投标一并软删除
    pub async fn delete_tender_impl(
        &self,
        dept_id: i64,
        tender_id: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let model = self.department_tender_model(dept_id, tender_id).await?;
        if tender_status(&model) == TenderStatus::Awarded {
            return Err(ETenderError::conflict("Awarded tender cannot be deleted"));
        }

        let cascaded = self.soft_delete_tender(dept_id, tender_id, now).await?;

        info!("Tender {} soft-deleted with {} bids", tender_id, cascaded);
        Ok(())
    }

    /// 软删除事务，返回级联删除的投标数
    pub(super) async fn soft_delete_tender(
        &self,
        dept_id: i64,
        tender_id: i64,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let ts = now.timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        // 预检之后可能已被授标
        let deleted = tenders::Entity::update_many()
            .col_expr(tenders::Column::IsDeleted, Expr::value(true))
            .col_expr(tenders::Column::DeletedAt, Expr::value(Some(ts)))
            .col_expr(tenders::Column::UpdatedAt, Expr::value(ts))
            .filter(tenders::Column::Id.eq(tender_id))
            .filter(tenders::Column::IsDeleted.eq(false))
            .filter(tenders::Column::Status.ne(TenderStatus::AWARDED))
            .exec(&txn)
            .await
            .map_err(db_err("删除招标失败"))?;
        if deleted.rows_affected == 0 {
            return Err(ETenderError::conflict("Awarded tender cannot be deleted"));
        }

        let cascaded = bids::Entity::update_many()
            .col_expr(bids::Column::IsDeleted, Expr::value(true))
            .col_expr(bids::Column::DeletedAt, Expr::value(Some(ts)))
            .filter(bids::Column::TenderId.eq(tender_id))
            .filter(bids::Column::IsDeleted.eq(false))
            .exec(&txn)
            .await
            .map_err(db_err("删除投标失败"))?;

        append_audit(
            &txn,
            NewAuditEntry::new(
                ("department", dept_id),
                actions::TENDER_DELETE,
                "tender",
                tender_id,
            )
            .with_details(format!("{} bids soft-deleted", cascaded.rows_affected)),
            now,
        )
        .await?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;
        Ok(cascaded.rows_affected)
    }

    /// 机构管理员发布招标
    pub async fn publish_tender_impl(
        &self,
        institute_id: i64,
        tender_id: i64,
        actor_user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Tender> {
        let model = find_active_tender(&self.db, tender_id)
            .await?
            .ok_or_else(|| ETenderError::not_found(format!("Tender {tender_id} not found")))?;

        let dept_id = model.department_id.ok_or_else(|| {
            ETenderError::invalid_state("Tender is not linked to any department")
        })?;
        let department = departments::Entity::find_by_id(dept_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询部门失败"))?
            .ok_or_else(|| ETenderError::invalid_state("Tender department no longer exists"))?;

        if department.institute_id != institute_id {
            return Err(ETenderError::authorization(
                "Tender belongs to another institute",
            ));
        }

        let status = tender_status(&model);
        if status.is_final() {
            return Err(ETenderError::conflict(format!(
                "Tender is {status} and cannot be published"
            )));
        }
        if status == TenderStatus::Open {
            return Ok(model.into_tender());
        }

        let ts = now.timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let mut active: tenders::ActiveModel = model.into();
        active.status = Set(TenderStatus::Open.to_string());
        active.is_checked = Set(true);
        active.published_at = Set(Some(ts));
        active.updated_at = Set(ts);
        let updated = active
            .update(&txn)
            .await
            .map_err(db_err("发布招标失败"))?;

        append_audit(
            &txn,
            NewAuditEntry::new(
                ("user", actor_user_id),
                actions::TENDER_PUBLISH,
                "tender",
                tender_id,
            ),
            now,
        )
        .await?;

        txn.commit().await.map_err(db_err("提交事务失败"))?;

        info!("Tender {} published", tender_id);
        Ok(updated.into_tender())
    }

    /// 按可见范围分页列出招标投影
    pub async fn list_tenders_impl(
        &self,
        scope: TenderScope,
        pagination: PaginationQuery,
        viewer_vendor_id: Option<i64>,
    ) -> Result<TenderListResponse> {
        let (page, size) = pagination.normalized();

        let mut select = tenders::Entity::find().filter(tenders::Column::IsDeleted.eq(false));
        select = match scope {
            TenderScope::Public => select.filter(tenders::Column::IsChecked.eq(true)),
            TenderScope::Department(dept_id) => {
                select.filter(tenders::Column::DepartmentId.eq(dept_id))
            }
            TenderScope::Institute(institute_id) => {
                let dept_ids: Vec<i64> = departments::Entity::find()
                    .filter(departments::Column::InstituteId.eq(institute_id))
                    .all(&self.db)
                    .await
                    .map_err(db_err("查询部门失败"))?
                    .into_iter()
                    .map(|d| d.id)
                    .collect();
                select.filter(tenders::Column::DepartmentId.is_in(dept_ids))
            }
        };

        let paginator = select
            .order_by_desc(tenders::Column::CreatedAt)
            .order_by_desc(tenders::Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("查询招标总数失败"))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(db_err("查询招标页数失败"))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_err("查询招标列表失败"))?;

        let items = self.load_tender_details(rows, viewer_vendor_id).await?;

        Ok(TenderListResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    pub async fn add_corrigendum_impl(
        &self,
        dept_id: i64,
        tender_id: i64,
        description: String,
        now: DateTime<Utc>,
    ) -> Result<Corrigendum> {
        self.department_tender_model(dept_id, tender_id).await?;

        let model = corrigenda::ActiveModel {
            tender_id: Set(tender_id),
            description: Set(description),
            issued_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建更正公告失败"))?;

        Ok(model.into_corrigendum())
    }

    pub async fn add_evaluation_criterion_impl(
        &self,
        dept_id: i64,
        tender_id: i64,
        criterion: String,
        weight: f64,
    ) -> Result<EvaluationCriterion> {
        self.department_tender_model(dept_id, tender_id).await?;

        let model = evaluation_criteria::ActiveModel {
            tender_id: Set(tender_id),
            criterion: Set(criterion),
            weight: Set(weight),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建评标标准失败"))?;

        Ok(model.into_criterion())
    }

    /// 供应商对已发布招标提问
    pub async fn ask_clarification_impl(
        &self,
        vendor_id: i64,
        tender_id: i64,
        question: String,
        now: DateTime<Utc>,
    ) -> Result<Clarification> {
        let published = find_active_tender(&self.db, tender_id)
            .await?
            .filter(|t| t.is_checked && tender_status(t).is_published());
        if published.is_none() {
            return Err(ETenderError::not_found(format!(
                "Tender {tender_id} not found or not published"
            )));
        }

        let model = clarifications::ActiveModel {
            tender_id: Set(tender_id),
            vendor_id: Set(vendor_id),
            question: Set(question),
            answer: Set(None),
            asked_at: Set(now.timestamp()),
            answered_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("创建澄清问题失败"))?;

        Ok(model.into_clarification())
    }

    /// 招标所属部门回复澄清
    pub async fn answer_clarification_impl(
        &self,
        dept_id: i64,
        clarification_id: i64,
        answer: String,
        now: DateTime<Utc>,
    ) -> Result<Clarification> {
        let clarification = clarifications::Entity::find_by_id(clarification_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询澄清问题失败"))?
            .ok_or_else(|| {
                ETenderError::not_found(format!("Clarification {clarification_id} not found"))
            })?;

        // 其他部门的问题同样按不存在处理
        match self
            .department_tender_model(dept_id, clarification.tender_id)
            .await
        {
            Err(ETenderError::NotFound(_)) => {
                return Err(ETenderError::not_found(format!(
                    "Clarification {clarification_id} not found"
                )));
            }
            other => other?,
        };

        let mut active: clarifications::ActiveModel = clarification.into();
        active.answer = Set(Some(answer));
        active.answered_at = Set(Some(now.timestamp()));
        let updated = active
            .update(&self.db)
            .await
            .map_err(db_err("回复澄清问题失败"))?;

        Ok(updated.into_clarification())
    }

    pub async fn add_tender_document_impl(
        &self,
        tender_id: i64,
        document_name: String,
        locator: String,
        now: DateTime<Utc>,
    ) -> Result<TenderDocument> {
        let model = tender_documents::ActiveModel {
            tender_id: Set(tender_id),
            document_name: Set(document_name),
            file_path: Set(locator),
            uploaded_at: Set(now.timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_err("保存招标文档失败"))?;

        Ok(model.into_document())
    }
}
