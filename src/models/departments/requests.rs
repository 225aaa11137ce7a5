use serde::Deserialize;
use ts_rs::TS;

// 创建部门请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/department.ts")]
pub struct CreateDepartmentRequest {
    pub department_name: String,
    pub head_of_department: Option<String>,
    /// 不提供时随机生成
    pub password: Option<String>,
}

/// 存储层使用的部门插入参数，密码已哈希
#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub institute_id: i64,
    pub department_name: String,
    pub username: String,
    pub password_hash: String,
    pub head_of_department: Option<String>,
}
