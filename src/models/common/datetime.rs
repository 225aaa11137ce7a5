//! 时间字段的宽松解析
//!
//! 接受 RFC 3339，也接受不带时区的 `YYYY-MM-DDTHH:MM[:SS]`（按 UTC 处理），
//! 兼容 HTML datetime-local 输入框的提交格式。

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_flexible(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn flexible<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: '{raw}'")))
}

pub fn flexible_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_flexible(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: '{raw}'"))),
    }
}

/// 数据库中以 unix 秒存储
pub fn from_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_and_naive() {
        let a = parse_flexible("2025-03-01T10:00:00+05:30").unwrap();
        assert_eq!(a.to_rfc3339(), "2025-03-01T04:30:00+00:00");

        let b = parse_flexible("2025-03-01T10:00").unwrap();
        assert_eq!(b.timestamp(), parse_flexible("2025-03-01T10:00:00Z").unwrap().timestamp());

        assert!(parse_flexible("next tuesday").is_none());
    }
}
