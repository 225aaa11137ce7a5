use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::RoleName;

// 登录请求（用户与部门共用）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    /// 用户名、邮箱或部门用户名
    pub username: String,
    pub password: String,
}

// 注册请求，按角色携带不同的档案字段
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: RoleName,

    // 供应商
    pub company_name: Option<String>,
    pub registration_number: Option<String>,
    pub gst_number: Option<String>,

    // 机构
    pub institute_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,

    pub address: Option<String>,
}

/// 注册时要落库的档案
#[derive(Debug, Clone)]
pub enum SignupProfile {
    Vendor {
        company_name: String,
        registration_number: Option<String>,
        gst_number: Option<String>,
        address: Option<String>,
    },
    Institute {
        institute_name: String,
        contact_email: String,
        contact_phone: Option<String>,
        address: Option<String>,
    },
}

/// 存储层的注册参数，密码已哈希
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: RoleName,
    pub profile: SignupProfile,
}

fn required(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl SignupRequest {
    /// 按角色抽取档案，缺少必填字段时返回缺失字段名
    pub fn profile(&self) -> Result<SignupProfile, &'static str> {
        match self.role {
            RoleName::Vendor => Ok(SignupProfile::Vendor {
                company_name: required(&self.company_name).ok_or("company_name")?,
                registration_number: self.registration_number.clone(),
                gst_number: self.gst_number.clone(),
                address: self.address.clone(),
            }),
            RoleName::InstituteAdmin => Ok(SignupProfile::Institute {
                institute_name: required(&self.institute_name).ok_or("institute_name")?,
                contact_email: required(&self.contact_email).ok_or("contact_email")?,
                contact_phone: self.contact_phone.clone(),
                address: self.address.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(role: &str) -> SignupRequest {
        serde_json::from_value(serde_json::json!({
            "username": "acme",
            "email": "acme@example.com",
            "password": "secret123",
            "role": role,
        }))
        .unwrap()
    }

    #[test]
    fn test_vendor_requires_company_name() {
        let mut req = base("VENDOR");
        assert_eq!(req.profile().unwrap_err(), "company_name");
        req.company_name = Some("   ".into());
        assert_eq!(req.profile().unwrap_err(), "company_name");
        req.company_name = Some("Acme Pvt".into());
        assert!(matches!(req.profile(), Ok(SignupProfile::Vendor { .. })));
    }

    #[test]
    fn test_institute_requires_name_and_contact() {
        let mut req = base("INSTITUTE_ADMIN");
        req.institute_name = Some("IIT".into());
        assert_eq!(req.profile().unwrap_err(), "contact_email");
        req.contact_email = Some("office@iit.example".into());
        assert!(matches!(req.profile(), Ok(SignupProfile::Institute { .. })));
    }
}
