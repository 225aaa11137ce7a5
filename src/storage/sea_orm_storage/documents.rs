use super::tenders::find_active_tender;
use super::{SeaOrmStorage, db_err};
use crate::entity::{bid_documents, bids, departments, tender_documents};
use crate::errors::Result;
use crate::models::documents::entities::{DocumentKind, DocumentOwnership};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

impl SeaOrmStorage {
    /// 解析文档归属链，上级投标或招标已软删除时视为不存在
    pub async fn get_document_ownership_impl(
        &self,
        kind: DocumentKind,
        document_id: i64,
    ) -> Result<Option<DocumentOwnership>> {
        let (document_name, locator, tender_id, bid_vendor_id) = match kind {
            DocumentKind::Tender => {
                let Some(doc) = tender_documents::Entity::find_by_id(document_id)
                    .one(&self.db)
                    .await
                    .map_err(db_err("查询招标文档失败"))?
                else {
                    return Ok(None);
                };
                (doc.document_name, doc.file_path, doc.tender_id, None)
            }
            DocumentKind::Bid => {
                let Some(doc) = bid_documents::Entity::find_by_id(document_id)
                    .one(&self.db)
                    .await
                    .map_err(db_err("查询投标文档失败"))?
                else {
                    return Ok(None);
                };
                let Some(bid) = bids::Entity::find_by_id(doc.bid_id)
                    .filter(bids::Column::IsDeleted.eq(false))
                    .one(&self.db)
                    .await
                    .map_err(db_err("查询投标失败"))?
                else {
                    return Ok(None);
                };
                (
                    doc.document_name,
                    doc.file_path,
                    bid.tender_id,
                    Some(bid.vendor_id),
                )
            }
        };

        let Some(tender) = find_active_tender(&self.db, tender_id).await? else {
            return Ok(None);
        };
        let tender_department_id = tender.department_id;
        let tender_published = tender.is_checked;

        let tender_institute_id = match tender_department_id {
            Some(dept_id) => departments::Entity::find_by_id(dept_id)
                .one(&self.db)
                .await
                .map_err(db_err("查询部门失败"))?
                .map(|d| d.institute_id),
            None => None,
        };

        Ok(Some(DocumentOwnership {
            kind,
            document_name,
            locator,
            tender_department_id,
            tender_institute_id,
            tender_published,
            bid_vendor_id,
        }))
    }
}
