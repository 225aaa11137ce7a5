//! 请求字段校验
//!
//! 校验函数只返回失败原因，由服务层包装成 `ETenderError::validation`。

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 3-32 characters of letters, numbers, dots, underscores or hyphens",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 密码至少 8 位，且同时包含字母和数字
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err("Password must contain both letters and digits");
    }
    Ok(())
}

/// 金额必须为正的有限数
pub fn validate_positive_amount(value: f64, field: &'static str) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{field} must be greater than zero"));
    }
    Ok(())
}

pub fn validate_weight(weight: f64) -> Result<(), &'static str> {
    if !weight.is_finite() || !(0.0..=100.0).contains(&weight) {
        return Err("Weight must be between 0 and 100");
    }
    Ok(())
}

/// 去掉首尾空白后不能为空
pub fn require_text(value: &str, field: &'static str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(validate_username("acme_corp").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("buyer@iit.example.in").is_ok());
        assert!(validate_email("buyer@localhost").is_err());
        assert!(validate_email("no-at.example.com").is_err());
    }

    #[test]
    fn test_password() {
        assert!(validate_password("Tender2025").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("1234567890").is_err());
    }

    #[test]
    fn test_numbers() {
        assert!(validate_positive_amount(1.5, "amount").is_ok());
        assert!(validate_positive_amount(0.0, "amount").is_err());
        assert!(validate_positive_amount(f64::NAN, "amount").is_err());
        assert!(validate_weight(100.0).is_ok());
        assert!(validate_weight(100.5).is_err());
        assert!(validate_weight(-1.0).is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("  road  ", "title").unwrap(), "road");
        assert_eq!(
            require_text("   ", "title").unwrap_err(),
            "title must not be empty"
        );
    }
}
