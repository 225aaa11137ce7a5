//! 招标详情投影
//!
//! 一页招标对应固定数量的批量查询：先取招标行，再按外键集合 `IN (...)`
//! 拉取各类子表，最后在内存中按父 ID 分组装配。不走懒加载。

use std::collections::{HashMap, HashSet};

use super::{SeaOrmStorage, db_err};
use crate::entity::{
    awards, bid_documents, bids, clarifications, corrigenda, departments, evaluation_criteria,
    institutes, tender_categories, tender_documents, tenders, users, vendors,
};
use crate::errors::Result;
use crate::models::awards::entities::Award;
use crate::models::bids::entities::BidDocument;
use crate::models::bids::responses::BidDetail;
use crate::models::tenders::responses::{BidForTender, TenderDetail, VendorForTender, VendorUser};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

fn unique_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let set: HashSet<i64> = ids.into_iter().collect();
    set.into_iter().collect()
}

fn group_by<T, K: Fn(&T) -> i64>(rows: Vec<T>, key: K) -> HashMap<i64, Vec<T>> {
    let mut map: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        map.entry(key(&row)).or_default().push(row);
    }
    map
}

/// 按投标 ID 批量加载文档与授标
pub(super) async fn load_bid_children<C: ConnectionTrait>(
    db: &C,
    bid_ids: &[i64],
) -> Result<(HashMap<i64, Vec<BidDocument>>, HashMap<i64, Award>)> {
    if bid_ids.is_empty() {
        return Ok((HashMap::new(), HashMap::new()));
    }

    let docs = bid_documents::Entity::find()
        .filter(bid_documents::Column::BidId.is_in(bid_ids.to_vec()))
        .order_by_asc(bid_documents::Column::Id)
        .all(db)
        .await
        .map_err(db_err("查询投标文档失败"))?;

    let award_rows = awards::Entity::find()
        .filter(awards::Column::BidId.is_in(bid_ids.to_vec()))
        .filter(awards::Column::IsDeleted.eq(false))
        .all(db)
        .await
        .map_err(db_err("查询授标失败"))?;

    let docs = group_by(docs, |d| d.bid_id)
        .into_iter()
        .map(|(k, v)| (k, v.into_iter().map(|d| d.into_document()).collect()))
        .collect();
    let award_map = award_rows
        .into_iter()
        .map(|a| (a.bid_id, a.into_award()))
        .collect();

    Ok((docs, award_map))
}

/// 把投标行装配成带文档与授标的详情
pub(super) async fn load_bid_details<C: ConnectionTrait>(
    db: &C,
    rows: Vec<bids::Model>,
) -> Result<Vec<BidDetail>> {
    let ids: Vec<i64> = rows.iter().map(|b| b.id).collect();
    let (mut docs, mut award_map) = load_bid_children(db, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|b| BidDetail {
            documents: docs.remove(&b.id).unwrap_or_default(),
            award: award_map.remove(&b.id),
            bid: b.into_bid(),
        })
        .collect())
}

impl SeaOrmStorage {
    /// 为一批招标行装配完整投影，保持输入顺序
    pub(super) async fn load_tender_details(
        &self,
        rows: Vec<tenders::Model>,
        viewer_vendor_id: Option<i64>,
    ) -> Result<Vec<TenderDetail>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let db = &self.db;
        let tender_ids: Vec<i64> = rows.iter().map(|t| t.id).collect();

        // 部门 → 机构
        let dept_ids = unique_ids(rows.iter().filter_map(|t| t.department_id));
        let dept_rows = if dept_ids.is_empty() {
            Vec::new()
        } else {
            departments::Entity::find()
                .filter(departments::Column::Id.is_in(dept_ids))
                .all(db)
                .await
                .map_err(db_err("查询部门失败"))?
        };
        let institute_ids = unique_ids(dept_rows.iter().map(|d| d.institute_id));
        let institute_rows = if institute_ids.is_empty() {
            Vec::new()
        } else {
            institutes::Entity::find()
                .filter(institutes::Column::Id.is_in(institute_ids))
                .all(db)
                .await
                .map_err(db_err("查询机构失败"))?
        };

        let category_ids = unique_ids(rows.iter().filter_map(|t| t.category_id));
        let category_rows = if category_ids.is_empty() {
            Vec::new()
        } else {
            tender_categories::Entity::find()
                .filter(tender_categories::Column::Id.is_in(category_ids))
                .all(db)
                .await
                .map_err(db_err("查询分类失败"))?
        };

        // 招标子表
        let doc_rows = tender_documents::Entity::find()
            .filter(tender_documents::Column::TenderId.is_in(tender_ids.clone()))
            .order_by_asc(tender_documents::Column::Id)
            .all(db)
            .await
            .map_err(db_err("查询招标文档失败"))?;
        let corrigendum_rows = corrigenda::Entity::find()
            .filter(corrigenda::Column::TenderId.is_in(tender_ids.clone()))
            .order_by_asc(corrigenda::Column::Id)
            .all(db)
            .await
            .map_err(db_err("查询更正公告失败"))?;
        let criterion_rows = evaluation_criteria::Entity::find()
            .filter(evaluation_criteria::Column::TenderId.is_in(tender_ids.clone()))
            .order_by_asc(evaluation_criteria::Column::Id)
            .all(db)
            .await
            .map_err(db_err("查询评标标准失败"))?;
        let clarification_rows = clarifications::Entity::find()
            .filter(clarifications::Column::TenderId.is_in(tender_ids.clone()))
            .order_by_asc(clarifications::Column::Id)
            .all(db)
            .await
            .map_err(db_err("查询澄清问答失败"))?;

        // 投标 → 供应商 → 用户
        let bid_rows = bids::Entity::find()
            .filter(bids::Column::TenderId.is_in(tender_ids))
            .filter(bids::Column::IsDeleted.eq(false))
            .order_by_asc(bids::Column::Id)
            .all(db)
            .await
            .map_err(db_err("查询投标失败"))?;
        let vendor_ids = unique_ids(bid_rows.iter().map(|b| b.vendor_id));
        let vendor_rows = if vendor_ids.is_empty() {
            Vec::new()
        } else {
            vendors::Entity::find()
                .filter(vendors::Column::Id.is_in(vendor_ids))
                .all(db)
                .await
                .map_err(db_err("查询供应商失败"))?
        };
        let user_ids = unique_ids(vendor_rows.iter().map(|v| v.user_id));
        let user_rows = if user_ids.is_empty() {
            Vec::new()
        } else {
            users::Entity::find()
                .filter(users::Column::Id.is_in(user_ids))
                .all(db)
                .await
                .map_err(db_err("查询用户失败"))?
        };
        let bid_ids: Vec<i64> = bid_rows.iter().map(|b| b.id).collect();
        let (mut bid_docs, mut bid_awards) = load_bid_children(db, &bid_ids).await?;

        // 内存装配
        let dept_map: HashMap<i64, _> = dept_rows
            .into_iter()
            .map(|d| (d.id, d.into_department()))
            .collect();
        let institute_map: HashMap<i64, _> = institute_rows
            .into_iter()
            .map(|i| (i.id, i.into_institute()))
            .collect();
        let category_map: HashMap<i64, _> = category_rows
            .into_iter()
            .map(|c| (c.id, c.into_category()))
            .collect();
        let user_map: HashMap<i64, VendorUser> = user_rows
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    VendorUser {
                        user_id: u.id,
                        username: u.username,
                        email: u.email,
                    },
                )
            })
            .collect();
        let vendor_map: HashMap<i64, VendorForTender> = vendor_rows
            .into_iter()
            .map(|v| {
                (
                    v.id,
                    VendorForTender {
                        vendor_id: v.id,
                        company_name: v.company_name,
                        user: user_map.get(&v.user_id).cloned(),
                    },
                )
            })
            .collect();

        let mut docs = group_by(doc_rows, |d| d.tender_id);
        let mut corrigenda_by = group_by(corrigendum_rows, |c| c.tender_id);
        let mut criteria_by = group_by(criterion_rows, |c| c.tender_id);
        let mut clarifications_by = group_by(clarification_rows, |c| c.tender_id);
        let mut bids_by = group_by(bid_rows, |b| b.tender_id);

        let details = rows
            .into_iter()
            .map(|t| {
                let department = t.department_id.and_then(|id| dept_map.get(&id).cloned());
                let institute = department
                    .as_ref()
                    .and_then(|d| institute_map.get(&d.institute_id).cloned());
                let category = t.category_id.and_then(|id| category_map.get(&id).cloned());

                let bids: Vec<BidForTender> = bids_by
                    .remove(&t.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|b| BidForTender {
                        vendor: vendor_map.get(&b.vendor_id).cloned(),
                        documents: bid_docs.remove(&b.id).unwrap_or_default(),
                        award: bid_awards.remove(&b.id),
                        bid: b.into_bid(),
                    })
                    .collect();
                let user_bid_submitted = viewer_vendor_id
                    .is_some_and(|vid| bids.iter().any(|b| b.bid.vendor_id == vid));

                TenderDetail {
                    department,
                    institute,
                    category,
                    documents: docs
                        .remove(&t.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|d| d.into_document())
                        .collect(),
                    corrigenda: corrigenda_by
                        .remove(&t.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|c| c.into_corrigendum())
                        .collect(),
                    evaluation_criteria: criteria_by
                        .remove(&t.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|c| c.into_criterion())
                        .collect(),
                    clarifications: clarifications_by
                        .remove(&t.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|c| c.into_clarification())
                        .collect(),
                    bids_received: bids.len() as i64,
                    user_bid_submitted,
                    bids,
                    tender: t.into_tender(),
                }
            })
            .collect();

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_keeps_row_order() {
        let grouped = group_by(vec![(1, "a"), (2, "b"), (1, "c")], |r| r.0);
        assert_eq!(grouped[&1], vec![(1, "a"), (1, "c")]);
        assert_eq!(grouped[&2], vec![(2, "b")]);
    }

    #[test]
    fn test_unique_ids_dedups() {
        let mut ids = unique_ids([3, 1, 3, 2, 1]);
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
