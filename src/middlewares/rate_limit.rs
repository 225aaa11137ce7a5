/*!
 * 限流中间件
 *
 * 登录、注册按客户端 IP 计数，文档上传按已认证主体计数。
 * 每个键一个固定时间窗口，窗口内超出次数返回 429，并在 `Retry-After` 中给出窗口剩余秒数。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login));
 * ```
 *
 * 上传路由需要放在 RequireJWT 之内，否则拿不到主体，会退化为按 IP 计数。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::{IpAddr, SocketAddr};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, auth::entities::Principal};

const MAX_WINDOW_SECS: u64 = 60;

/// 键 -> 当前窗口
static RATE_WINDOWS: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(MAX_WINDOW_SECS))
        .max_capacity(100_000)
        .build()
});

/// 受限的端点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedAction {
    Login,
    Signup,
    DocumentUpload,
}

impl LimitedAction {
    fn name(self) -> &'static str {
        match self {
            LimitedAction::Login => "login",
            LimitedAction::Signup => "signup",
            LimitedAction::DocumentUpload => "upload",
        }
    }

    /// (窗口内上限, 窗口长度)
    fn quota(self) -> (u32, Duration) {
        match self {
            LimitedAction::Login => (5, Duration::from_secs(60)),
            LimitedAction::Signup => (3, Duration::from_secs(60)),
            LimitedAction::DocumentUpload => (10, Duration::from_secs(60)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// 计入一次请求；上一个窗口已过期时重新开窗
fn advance(previous: Option<Window>, now: Instant, length: Duration) -> Window {
    match previous {
        Some(w) if now.saturating_duration_since(w.started) < length => Window {
            count: w.count.saturating_add(1),
            started: w.started,
        },
        _ => Window {
            count: 1,
            started: now,
        },
    }
}

/// 超限时返回需要等待的秒数
fn retry_after(window: Window, now: Instant, limit: u32, length: Duration) -> Option<u64> {
    if window.count <= limit {
        return None;
    }
    let left = length.saturating_sub(now.saturating_duration_since(window.started));
    Some(left.as_secs().max(1))
}

fn normalize_ip(raw: &str) -> Option<String> {
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|s| s.ip()))
        .map(|ip| ip.to_string())
}

/// 主体优先，其次是转发头或连接给出的客户端 IP
fn limit_key(
    action: LimitedAction,
    principal: Option<&Principal>,
    client: Option<&str>,
) -> String {
    let subject = match principal {
        Some(p) => {
            let (kind, id) = p.actor();
            format!("{kind}:{id}")
        }
        None => format!(
            "ip:{}",
            client.and_then(normalize_ip).as_deref().unwrap_or("unknown")
        ),
    };
    format!("{}:{subject}", action.name())
}

fn too_many_requests(wait_secs: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", wait_secs.to_string()))
        .json(ApiResponse::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

#[derive(Clone)]
pub struct RateLimit {
    action: LimitedAction,
}

impl RateLimit {
    pub fn new(action: LimitedAction) -> Self {
        Self { action }
    }

    pub fn login() -> Self {
        Self::new(LimitedAction::Login)
    }

    pub fn signup() -> Self {
        Self::new(LimitedAction::Signup)
    }

    pub fn file_upload() -> Self {
        Self::new(LimitedAction::DocumentUpload)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            action: self.action,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    action: LimitedAction,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let action = self.action;

        Box::pin(async move {
            let key = {
                let principal = req.extensions().get::<Principal>().cloned();
                let client = req.connection_info().realip_remote_addr().map(str::to_string);
                limit_key(action, principal.as_ref(), client.as_deref())
            };
            let (limit, length) = action.quota();
            let now = Instant::now();

            // upsert 在同一个键上串行执行，并发请求不会丢计数
            let window = RATE_WINDOWS
                .entry(key.clone())
                .and_upsert_with(|existing| {
                    let previous = existing.map(|e| e.into_value());
                    ready(advance(previous, now, length))
                })
                .await
                .into_value();

            if let Some(wait_secs) = retry_after(window, now, limit, length) {
                warn!(
                    "Rate limit exceeded for {} ({}/{} in window)",
                    key, window.count, limit
                );
                return Ok(req.into_response(too_many_requests(wait_secs).map_into_right_body()));
            }

            let res = srv.call(req).await?.map_into_left_body();
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::entities::DepartmentPrincipal;

    #[test]
    fn test_window_counts_then_resets() {
        let length = Duration::from_secs(60);
        let t0 = Instant::now();

        let mut window = advance(None, t0, length);
        for _ in 0..4 {
            window = advance(Some(window), t0 + Duration::from_secs(10), length);
        }
        assert_eq!(window.count, 5);
        assert_eq!(retry_after(window, t0 + Duration::from_secs(10), 5, length), None);

        let sixth = advance(Some(window), t0 + Duration::from_secs(20), length);
        assert_eq!(
            retry_after(sixth, t0 + Duration::from_secs(20), 5, length),
            Some(40)
        );

        // 窗口过期后重新计数
        let fresh = advance(Some(sixth), t0 + Duration::from_secs(61), length);
        assert_eq!(fresh.count, 1);
        assert_eq!(fresh.started, t0 + Duration::from_secs(61));
    }

    #[test]
    fn test_limit_key_prefers_principal() {
        let dept = Principal::Department(DepartmentPrincipal {
            dept_id: 9,
            username: "stores_204".into(),
            institute_id: 1,
        });
        assert_eq!(
            limit_key(LimitedAction::DocumentUpload, Some(&dept), Some("10.0.0.7")),
            "upload:department:9"
        );
        assert_eq!(
            limit_key(LimitedAction::Login, None, Some("10.0.0.7:52311")),
            "login:ip:10.0.0.7"
        );
        assert_eq!(
            limit_key(LimitedAction::Signup, None, Some("not-an-ip")),
            "signup:ip:unknown"
        );
    }

    #[test]
    fn test_quotas() {
        assert_eq!(LimitedAction::Login.quota().0, 5);
        assert_eq!(LimitedAction::Signup.quota().0, 3);
        assert_eq!(LimitedAction::DocumentUpload.quota().0, 10);
        assert!(
            [LimitedAction::Login, LimitedAction::Signup, LimitedAction::DocumentUpload]
                .iter()
                .all(|a| a.quota().1.as_secs() <= MAX_WINDOW_SECS)
        );
    }
}
