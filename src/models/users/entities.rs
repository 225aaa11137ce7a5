use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 平台用户角色（部门不走用户体系，不在此列）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum RoleName {
    Vendor,
    InstituteAdmin,
}

impl RoleName {
    pub const VENDOR: &'static str = "VENDOR";
    pub const INSTITUTE_ADMIN: &'static str = "INSTITUTE_ADMIN";
    /// 部门凭据里的合成角色
    pub const DEPARTMENT: &'static str = "DEPARTMENT";

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Vendor => Self::VENDOR,
            RoleName::InstituteAdmin => Self::INSTITUTE_ADMIN,
        }
    }
}

impl<'de> Deserialize<'de> for RoleName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "invalid role: '{s}'. Supported roles: VENDOR, INSTITUTE_ADMIN"
            ))
        })
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            Self::VENDOR => Ok(RoleName::Vendor),
            Self::INSTITUTE_ADMIN => Ok(RoleName::InstituteAdmin),
            _ => Err(format!("Invalid role: {s}")),
        }
    }
}

/// 供应商/机构的审核状态，当前不作为业务门槛
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "pending"),
            VerificationStatus::Verified => write!(f, "verified"),
            VerificationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(format!("Invalid verification status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub roles: Vec<RoleName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct Vendor {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub registration_number: Option<String>,
    pub gst_number: Option<String>,
    pub address: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct Institute {
    pub id: i64,
    pub user_id: i64,
    pub institute_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

/// 用户及其角色档案
#[derive(Debug, Clone)]
pub struct UserWithProfile {
    pub user: User,
    pub vendor: Option<Vendor>,
    pub institute: Option<Institute>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("vendor".parse::<RoleName>(), Ok(RoleName::Vendor));
        assert_eq!(
            "INSTITUTE_ADMIN".parse::<RoleName>(),
            Ok(RoleName::InstituteAdmin)
        );
        assert!("DEPARTMENT".parse::<RoleName>().is_err());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&RoleName::InstituteAdmin).unwrap();
        assert_eq!(json, "\"INSTITUTE_ADMIN\"");
        let err = serde_json::from_str::<RoleName>("\"ADMIN\"").unwrap_err();
        assert!(err.to_string().contains("Supported roles"));
    }
}
