//! 请求主体
//!
//! 凭据解析后得到的调用方身份。平台用户与部门是两套独立的登录体系，
//! 统一收敛为 [`Principal`]，各处按标签匹配。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{ETenderError, Result};
use crate::models::users::entities::RoleName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct UserPrincipal {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<RoleName>,
    /// 具有 VENDOR 角色且已建档时存在
    pub vendor_id: Option<i64>,
    /// 具有 INSTITUTE_ADMIN 角色且已建档时存在
    pub institute_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct DepartmentPrincipal {
    pub dept_id: i64,
    pub username: String,
    pub institute_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub enum Principal {
    User(UserPrincipal),
    Department(DepartmentPrincipal),
}

/// 已解析的供应商身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorIdentity {
    pub user_id: i64,
    pub vendor_id: i64,
}

/// 已解析的机构管理员身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstituteAdminIdentity {
    pub user_id: i64,
    pub institute_id: i64,
}

impl Principal {
    pub fn username(&self) -> &str {
        match self {
            Principal::User(u) => &u.username,
            Principal::Department(d) => &d.username,
        }
    }

    /// 审计日志里的 (actor_kind, actor_id)
    pub fn actor(&self) -> (&'static str, i64) {
        match self {
            Principal::User(u) => ("user", u.user_id),
            Principal::Department(d) => ("department", d.dept_id),
        }
    }

    pub fn as_user(&self) -> Option<&UserPrincipal> {
        match self {
            Principal::User(u) => Some(u),
            Principal::Department(_) => None,
        }
    }

    pub fn as_vendor(&self) -> Option<VendorIdentity> {
        match self {
            Principal::User(u) if u.roles.contains(&RoleName::Vendor) => {
                u.vendor_id.map(|vendor_id| VendorIdentity {
                    user_id: u.user_id,
                    vendor_id,
                })
            }
            _ => None,
        }
    }

    pub fn as_institute_admin(&self) -> Option<InstituteAdminIdentity> {
        match self {
            Principal::User(u) if u.roles.contains(&RoleName::InstituteAdmin) => {
                u.institute_id.map(|institute_id| InstituteAdminIdentity {
                    user_id: u.user_id,
                    institute_id,
                })
            }
            _ => None,
        }
    }

    pub fn as_department(&self) -> Option<&DepartmentPrincipal> {
        match self {
            Principal::Department(d) => Some(d),
            Principal::User(_) => None,
        }
    }

    /// 是否满足某个能力门槛
    pub fn satisfies(&self, capability: Capability) -> bool {
        match capability {
            Capability::User => self.as_user().is_some(),
            Capability::Vendor => self.as_vendor().is_some(),
            Capability::InstituteAdmin => self.as_institute_admin().is_some(),
            Capability::Department => self.as_department().is_some(),
        }
    }
}

/// 路由级别的能力门槛
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    User,
    Vendor,
    InstituteAdmin,
    Department,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::User => write!(f, "user"),
            Capability::Vendor => write!(f, "vendor"),
            Capability::InstituteAdmin => write!(f, "institute admin"),
            Capability::Department => write!(f, "department"),
        }
    }
}

pub fn require_vendor(principal: Option<&Principal>) -> Result<VendorIdentity> {
    let principal = principal.ok_or_else(|| ETenderError::authentication("Not authenticated"))?;
    principal
        .as_vendor()
        .ok_or_else(|| ETenderError::authorization("Vendor access required"))
}

pub fn require_institute_admin(principal: Option<&Principal>) -> Result<InstituteAdminIdentity> {
    let principal = principal.ok_or_else(|| ETenderError::authentication("Not authenticated"))?;
    principal
        .as_institute_admin()
        .ok_or_else(|| ETenderError::authorization("Institute admin access required"))
}

pub fn require_department(principal: Option<&Principal>) -> Result<DepartmentPrincipal> {
    let principal = principal.ok_or_else(|| ETenderError::authentication("Not authenticated"))?;
    principal
        .as_department()
        .cloned()
        .ok_or_else(|| ETenderError::authorization("Department access required"))
}

pub fn require_user(principal: Option<&Principal>) -> Result<UserPrincipal> {
    let principal = principal.ok_or_else(|| ETenderError::authentication("Not authenticated"))?;
    principal
        .as_user()
        .cloned()
        .ok_or_else(|| ETenderError::authorization("User access required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor() -> Principal {
        Principal::User(UserPrincipal {
            user_id: 1,
            username: "acme".into(),
            roles: vec![RoleName::Vendor],
            vendor_id: Some(7),
            institute_id: None,
        })
    }

    fn department() -> Principal {
        Principal::Department(DepartmentPrincipal {
            dept_id: 3,
            username: "civil_412".into(),
            institute_id: 9,
        })
    }

    #[test]
    fn test_gates_reject_missing_principal_as_unauthenticated() {
        let err = require_vendor(None).unwrap_err();
        assert_eq!(err.status_code(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_gates_reject_wrong_kind_as_forbidden() {
        let dept = department();
        let err = require_vendor(Some(&dept)).unwrap_err();
        assert_eq!(err.status_code(), actix_web::http::StatusCode::FORBIDDEN);

        let v = vendor();
        assert!(require_department(Some(&v)).is_err());
        assert!(require_institute_admin(Some(&v)).is_err());
        assert_eq!(
            require_vendor(Some(&v)).unwrap(),
            VendorIdentity {
                user_id: 1,
                vendor_id: 7
            }
        );
    }

    #[test]
    fn test_role_without_profile_is_not_a_vendor() {
        let p = Principal::User(UserPrincipal {
            user_id: 2,
            username: "ghost".into(),
            roles: vec![RoleName::Vendor],
            vendor_id: None,
            institute_id: None,
        });
        assert!(p.as_vendor().is_none());
        assert!(p.satisfies(Capability::User));
    }

    #[test]
    fn test_principal_serde_tag() {
        let json = serde_json::to_value(department()).unwrap();
        assert_eq!(json["kind"], "department");
        assert_eq!(json["dept_id"], 3);
        let back: Principal = serde_json::from_value(json).unwrap();
        assert_eq!(back, department());
    }
}
