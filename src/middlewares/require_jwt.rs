/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <token>`，并把令牌解析成请求主体 [`Principal`]。
 * 平台用户与部门共用这一个中间件，解析结果按令牌缓存在 ObjectCache 中。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::scope("/api/v1/bids")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_bids));
 *
 * async fn list_bids(req: HttpRequest) -> Result<HttpResponse> {
 *     let principal = RequireJWT::extract_principal(&req);
 *     // ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 提取 Bearer 令牌并校验签名与过期时间，失败返回 401
 * 2. 命中缓存 `principal:{token}` 时直接使用
 * 3. 否则按令牌身份回源：用户查档案，部门查部门表；记录不存在返回 401
 * 4. 主体写入请求扩展，供 RequireRole 与各服务读取
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::auth::entities::{DepartmentPrincipal, Principal, UserPrincipal};
use crate::storage::Storage;
use crate::utils::jwt::{JwtUtils, TokenSubject};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败原因
#[derive(Debug, PartialEq)]
pub(crate) enum AuthFailure {
    /// 401，令牌缺失、无效或主体已不存在
    Unauthorized(String),
    /// 500，存储不可用
    Internal(String),
}

fn cache_key(token: &str) -> String {
    format!("principal:{token}")
}

/// 按令牌中的身份回源，构造最新的请求主体
pub(crate) async fn load_principal(
    storage: &dyn Storage,
    subject: TokenSubject,
) -> Result<Principal, AuthFailure> {
    match subject {
        TokenSubject::User { user_id, .. } => {
            let profile = storage
                .get_user_profile(user_id)
                .await
                .map_err(|e| AuthFailure::Internal(format!("Failed to load user: {e}")))?
                .ok_or_else(|| AuthFailure::Unauthorized("User not found".to_string()))?;

            Ok(Principal::User(UserPrincipal {
                user_id: profile.user.id,
                username: profile.user.username,
                roles: profile.user.roles,
                vendor_id: profile.vendor.map(|v| v.id),
                institute_id: profile.institute.map(|i| i.id),
            }))
        }
        TokenSubject::Department { dept_id, .. } => {
            let department = storage
                .get_department_by_id(dept_id)
                .await
                .map_err(|e| AuthFailure::Internal(format!("Failed to load department: {e}")))?
                .ok_or_else(|| AuthFailure::Unauthorized("Department not found".to_string()))?;

            Ok(Principal::Department(DepartmentPrincipal {
                dept_id: department.id,
                username: department.username,
                institute_id: department.institute_id,
            }))
        }
    }
}

// 提取并验证令牌，解析出请求主体
async fn extract_and_resolve(req: &ServiceRequest) -> Result<Principal, AuthFailure> {
    let token = JwtUtils::extract_bearer_token(req.request()).ok_or_else(|| {
        AuthFailure::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    let claims = JwtUtils::verify_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid or expired token".to_string())
    })?;
    let subject = claims
        .subject()
        .ok_or_else(|| AuthFailure::Unauthorized("Malformed token claims".to_string()))?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone());

    if let Some(cache) = &cache {
        match cache.get_json::<Principal>(&cache_key(&token)).await {
            CacheResult::Found(principal) => return Ok(principal),
            _ => debug!("Principal cache miss for {}", claims.username),
        }
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|s| s.get_ref().clone())
        .ok_or_else(|| AuthFailure::Internal("Storage not found in app data".to_string()))?;

    let principal = load_principal(storage.as_ref(), subject).await?;

    if let Some(cache) = &cache {
        cache
            .insert_json(
                cache_key(&token),
                &principal,
                AppConfig::get().cache.default_ttl,
            )
            .await;
    }

    Ok(principal)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
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
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_resolve(&req).await {
                Ok(principal) => {
                    debug!(
                        "JWT authentication successful for {}",
                        principal.username()
                    );
                    req.extensions_mut().insert(principal);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(AuthFailure::Unauthorized(reason)) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        reason
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {reason}"),
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(AuthFailure::Internal(reason)) => {
                    error!("Authentication backend failure: {}", reason);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Internal server error",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中提取请求主体
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_principal(req: &actix_web::HttpRequest) -> Option<Principal> {
        req.extensions().get::<Principal>().cloned()
    }

    /// 审计用的 (actor_kind, actor_id)
    pub fn extract_actor(req: &actix_web::HttpRequest) -> Option<(&'static str, i64)> {
        req.extensions().get::<Principal>().map(|p| p.actor())
    }
}
