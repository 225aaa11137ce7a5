//! 路径参数提取器
//!
//! 路径中的 ID 必须是正整数，解析失败直接返回 400 统一响应体，
//! 不让 actix 的默认纯文本错误泄露出去。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路由中第一个路径参数解析出的 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

fn bad_path(message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

pub(crate) fn parse_id(name: &str, raw: &str) -> Result<i64, String> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(format!("Invalid path parameter '{name}': '{raw}'")),
    }
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().iter().next() {
            Some((name, raw)) => parse_id(name, raw).map(SafeIDI64).map_err(bad_path),
            None => Err(bad_path("Missing path parameter".to_string())),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("id", "17"), Ok(17));
        assert!(parse_id("id", "0").is_err());
        assert!(parse_id("id", "-3").is_err());
        assert!(parse_id("id", "1;drop").is_err());
    }
}
