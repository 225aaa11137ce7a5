use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use crate::models::PaginationQuery;
use crate::models::common::datetime;

// 招标列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct TenderListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}

/// 招标列表的可见范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenderScope {
    /// 已发布且未删除
    Public,
    /// 机构下全部未删除招标
    Institute(i64),
    /// 部门自己的全部未删除招标
    Department(i64),
}

// 创建招标请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct CreateTenderRequest {
    pub tender_number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub estimated_cost: f64,
    #[serde(deserialize_with = "datetime::flexible")]
    #[ts(type = "string")]
    pub submission_deadline: DateTime<Utc>,
    /// 按名称获取或创建分类
    pub category_name: Option<String>,
}

// 更新招标请求，所有字段可选
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct UpdateTenderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_cost: Option<f64>,
    #[serde(default, deserialize_with = "datetime::flexible_option")]
    #[ts(type = "string | null")]
    pub submission_deadline: Option<DateTime<Utc>>,
}

impl UpdateTenderRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.estimated_cost.is_none()
            && self.submission_deadline.is_none()
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct CreateCategoryRequest {
    pub category_name: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct CreateCorrigendumRequest {
    pub description: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct CreateCriterionRequest {
    pub criterion: String,
    /// 0 到 100
    pub weight: f64,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct AskClarificationRequest {
    pub question: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/tender.ts")]
pub struct AnswerClarificationRequest {
    pub answer: String,
}

/// 存储层的招标插入参数
#[derive(Debug, Clone)]
pub struct NewTender {
    pub tender_number: String,
    pub title: String,
    pub description: String,
    pub estimated_cost: f64,
    pub submission_deadline: DateTime<Utc>,
    pub department_id: i64,
    pub category_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_naive_deadline() {
        let req: CreateTenderRequest = serde_json::from_str(
            r#"{"tender_number":"T-9","title":"Lab","estimated_cost":12.5,"submission_deadline":"2030-01-02T03:04"}"#,
        )
        .unwrap();
        assert_eq!(req.submission_deadline.to_rfc3339(), "2030-01-02T03:04:00+00:00");
        assert!(req.category_name.is_none());
        assert!(req.description.is_empty());
    }

    #[test]
    fn test_update_empty() {
        let req: UpdateTenderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
        let req: UpdateTenderRequest =
            serde_json::from_str(r#"{"submission_deadline":"2030-01-02T03:04:05Z"}"#).unwrap();
        assert!(!req.is_empty());
    }
}
