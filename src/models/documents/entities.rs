//! 文档归属与下载授权
//!
//! 招标文档和投标文档共用同一条授权规则，归属链由存储层一次解析好，
//! 判定本身是纯函数。

use crate::models::auth::entities::Principal;

/// 文档所属实体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Tender,
    Bid,
}

impl DocumentKind {
    /// 上传根目录下的子目录
    pub fn dir_name(&self) -> &'static str {
        match self {
            DocumentKind::Tender => "tender",
            DocumentKind::Bid => "bids",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Tender => write!(f, "tender"),
            DocumentKind::Bid => write!(f, "bid"),
        }
    }
}

/// 文档的归属链：文档 → (投标 →) 招标 → 部门 → 机构
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOwnership {
    pub kind: DocumentKind,
    pub document_name: String,
    pub locator: String,
    pub tender_department_id: Option<i64>,
    pub tender_institute_id: Option<i64>,
    pub tender_published: bool,
    /// 仅投标文档
    pub bid_vendor_id: Option<i64>,
}

impl DocumentOwnership {
    pub fn can_download(&self, principal: &Principal) -> bool {
        if let Some(dept) = principal.as_department()
            && self.tender_department_id == Some(dept.dept_id)
        {
            return true;
        }

        if let Some(vendor) = principal.as_vendor() {
            match self.kind {
                DocumentKind::Bid => {
                    if self.bid_vendor_id == Some(vendor.vendor_id) {
                        return true;
                    }
                }
                // 投标前需要阅读招标文件
                DocumentKind::Tender => {
                    if self.tender_published {
                        return true;
                    }
                }
            }
        }

        if let Some(admin) = principal.as_institute_admin()
            && self.tender_institute_id == Some(admin.institute_id)
        {
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::entities::{DepartmentPrincipal, UserPrincipal};
    use crate::models::users::entities::RoleName;

    fn bid_doc() -> DocumentOwnership {
        DocumentOwnership {
            kind: DocumentKind::Bid,
            document_name: "quote.pdf".into(),
            locator: "bids/1_quote.pdf".into(),
            tender_department_id: Some(10),
            tender_institute_id: Some(100),
            tender_published: true,
            bid_vendor_id: Some(5),
        }
    }

    fn vendor(vendor_id: i64) -> Principal {
        Principal::User(UserPrincipal {
            user_id: vendor_id + 1000,
            username: format!("v{vendor_id}"),
            roles: vec![RoleName::Vendor],
            vendor_id: Some(vendor_id),
            institute_id: None,
        })
    }

    fn admin(institute_id: i64) -> Principal {
        Principal::User(UserPrincipal {
            user_id: 1,
            username: "admin".into(),
            roles: vec![RoleName::InstituteAdmin],
            vendor_id: None,
            institute_id: Some(institute_id),
        })
    }

    fn dept(dept_id: i64) -> Principal {
        Principal::Department(DepartmentPrincipal {
            dept_id,
            username: "d".into(),
            institute_id: 100,
        })
    }

    #[test]
    fn test_bid_document_three_way_or() {
        let doc = bid_doc();
        assert!(doc.can_download(&dept(10)));
        assert!(doc.can_download(&vendor(5)));
        assert!(doc.can_download(&admin(100)));

        assert!(!doc.can_download(&dept(11)));
        assert!(!doc.can_download(&vendor(6)));
        assert!(!doc.can_download(&admin(101)));
    }

    #[test]
    fn test_tender_document_visible_to_vendors_once_published() {
        let mut doc = bid_doc();
        doc.kind = DocumentKind::Tender;
        doc.bid_vendor_id = None;
        assert!(doc.can_download(&vendor(42)));

        doc.tender_published = false;
        assert!(!doc.can_download(&vendor(42)));
        assert!(doc.can_download(&dept(10)));
    }
}
