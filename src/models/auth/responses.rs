use serde::Serialize;
use ts_rs::TS;

use super::entities::Principal;
use crate::models::users::entities::{Institute, RoleName, Vendor};

// 登录响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// 秒
    pub expires_in: i64,
    pub principal: Principal,
}

// 注册响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct SignupResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: RoleName,
    pub vendor: Option<Vendor>,
    pub institute: Option<Institute>,
}

// 当前用户信息，合并档案
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<RoleName>,
    pub vendor: Option<Vendor>,
    pub institute: Option<Institute>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
