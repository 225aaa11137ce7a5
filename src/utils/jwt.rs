use crate::config::AppConfig;
use crate::models::users::entities::RoleName;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
//
// 用户令牌携带 user_id + roles；部门令牌携带 dept_id + institute_id，
// roles 固定为 ["DEPARTMENT"]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute_id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize, // Expiration time (时间戳)
    pub iat: usize, // Issued at (签发时间)
}

/// 令牌中的身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSubject {
    User {
        user_id: i64,
        username: String,
        roles: Vec<RoleName>,
    },
    Department {
        dept_id: i64,
        username: String,
        institute_id: i64,
    },
}

impl Claims {
    /// 把原始 claims 还原为身份，字段组合不完整时视为无效令牌
    pub fn subject(&self) -> Option<TokenSubject> {
        match (self.user_id, self.dept_id, self.institute_id) {
            (Some(user_id), None, _) => Some(TokenSubject::User {
                user_id,
                username: self.username.clone(),
                roles: self
                    .roles
                    .iter()
                    .filter_map(|r| r.parse::<RoleName>().ok())
                    .collect(),
            }),
            (None, Some(dept_id), Some(institute_id))
                if self.roles.iter().any(|r| r == RoleName::DEPARTMENT) =>
            {
                Some(TokenSubject::Department {
                    dept_id,
                    username: self.username.clone(),
                    institute_id,
                })
            }
            _ => None,
        }
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    /// 访问令牌有效期（秒）
    pub fn access_token_ttl_secs() -> i64 {
        AppConfig::get().jwt.access_token_expiry * 60
    }

    fn build_claims(subject: &TokenSubject, expiry: chrono::Duration) -> Claims {
        let now = chrono::Utc::now();
        let expiration = now + expiry;

        let (user_id, dept_id, institute_id, username, roles) = match subject {
            TokenSubject::User {
                user_id,
                username,
                roles,
            } => (
                Some(*user_id),
                None,
                None,
                username.clone(),
                roles.iter().map(|r| r.to_string()).collect(),
            ),
            TokenSubject::Department {
                dept_id,
                username,
                institute_id,
            } => (
                None,
                Some(*dept_id),
                Some(*institute_id),
                username.clone(),
                vec![RoleName::DEPARTMENT.to_string()],
            ),
        };

        Claims {
            user_id,
            dept_id,
            institute_id,
            username,
            roles,
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    // 生成 Access Token
    pub fn generate_access_token(
        subject: &TokenSubject,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_secret(
            subject,
            chrono::Duration::minutes(config.jwt.access_token_expiry),
            &Self::get_secret(),
        )
    }

    pub fn generate_token_with_secret(
        subject: &TokenSubject,
        expiry_duration: chrono::Duration,
        secret: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Self::build_claims(subject, expiry_duration);
        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // 验证 JWT token
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_with_secret(token, &Self::get_secret())
    }

    pub fn verify_token_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    /// 从 Authorization 头提取 Bearer token
    pub fn extract_bearer_token(req: &actix_web::HttpRequest) -> Option<String> {
        req.headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| {
                h.strip_prefix("Bearer ")
                    .or_else(|| h.strip_prefix("bearer "))
            })
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_user_token_round_trip() {
        let subject = TokenSubject::User {
            user_id: 42,
            username: "acme".into(),
            roles: vec![RoleName::Vendor],
        };
        let token =
            JwtUtils::generate_token_with_secret(&subject, chrono::Duration::minutes(5), SECRET)
                .unwrap();
        let claims = JwtUtils::verify_token_with_secret(&token, SECRET).unwrap();
        assert_eq!(claims.user_id, Some(42));
        assert_eq!(claims.roles, vec!["VENDOR".to_string()]);
        assert_eq!(claims.subject(), Some(subject));
    }

    #[test]
    fn test_department_token_carries_institute() {
        let subject = TokenSubject::Department {
            dept_id: 3,
            username: "civil_512".into(),
            institute_id: 8,
        };
        let token =
            JwtUtils::generate_token_with_secret(&subject, chrono::Duration::minutes(5), SECRET)
                .unwrap();
        let claims = JwtUtils::verify_token_with_secret(&token, SECRET).unwrap();
        assert_eq!(claims.roles, vec!["DEPARTMENT".to_string()]);
        assert_eq!(claims.user_id, None);
        assert_eq!(claims.subject(), Some(subject));
    }

    #[test]
    fn test_wrong_secret_and_expired_fail_closed() {
        let subject = TokenSubject::User {
            user_id: 1,
            username: "admin".into(),
            roles: vec![RoleName::InstituteAdmin],
        };
        let token =
            JwtUtils::generate_token_with_secret(&subject, chrono::Duration::minutes(5), SECRET)
                .unwrap();
        assert!(JwtUtils::verify_token_with_secret(&token, "other").is_err());

        let expired =
            JwtUtils::generate_token_with_secret(&subject, chrono::Duration::minutes(-10), SECRET)
                .unwrap();
        assert!(JwtUtils::verify_token_with_secret(&expired, SECRET).is_err());
    }

    #[test]
    fn test_incomplete_claims_have_no_subject() {
        let claims = Claims {
            user_id: None,
            dept_id: Some(1),
            institute_id: None,
            username: "x".into(),
            roles: vec!["DEPARTMENT".into()],
            exp: 0,
            iat: 0,
        };
        assert!(claims.subject().is_none());
    }
}
