use serde::Serialize;
use ts_rs::TS;

use super::entities::Department;
use crate::models::users::entities::Institute;

// 创建部门响应，明文密码只在这里返回一次
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/department.ts")]
pub struct DepartmentCreatedResponse {
    pub department: Department,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/department.ts")]
pub struct DepartmentListResponse {
    pub items: Vec<Department>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/department.ts")]
pub struct DepartmentWithInstitute {
    pub department: Department,
    pub institute: Institute,
}
