/*!
 * 基于能力的访问控制中间件
 *
 * 此中间件必须在 RequireJWT 中间件之后使用，用于验证请求主体是否满足路由的能力门槛。
 * 没有主体返回 401，主体类型不符返回 403。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use crate::middlewares::{RequireJWT, RequireRole};
 * use crate::models::auth::entities::Capability;
 *
 * web::scope("/api/v1/awards")
 *     .wrap(RequireJWT)
 *     .route(
 *         "",
 *         web::post()
 *             .to(create_award)
 *             .wrap(RequireRole::new(Capability::InstituteAdmin)),
 *     )
 * ```
 *
 * 或者任一能力即可：
 *
 * ```rust,ignore
 * .wrap(RequireRole::new_any(&[Capability::InstituteAdmin, Capability::Department]))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{
    ErrorCode,
    auth::entities::{Capability, Principal},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required: Vec<Capability>,
}

impl RequireRole {
    /// 创建需要特定能力的中间件
    pub fn new(capability: Capability) -> Self {
        Self {
            required: vec![capability],
        }
    }

    /// 创建需要任一能力的中间件
    pub fn new_any(capabilities: &[Capability]) -> Self {
        Self {
            required: capabilities.to_vec(),
        }
    }

    fn permits(required: &[Capability], principal: &Principal) -> bool {
        required.iter().any(|c| principal.satisfies(*c))
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required: self.required.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required: Vec<Capability>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required = self.required.clone();

        Box::pin(async move {
            let principal = req.extensions().get::<Principal>().cloned();

            match principal {
                Some(principal) if RequireRole::permits(&required, &principal) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(principal) => {
                    info!(
                        "Access denied for {} (actor: {:?}). Required: {:?}",
                        principal.username(),
                        principal.actor(),
                        required
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "Access denied.",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!(
                        "Role check failed: No principal found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::entities::{DepartmentPrincipal, UserPrincipal};
    use crate::models::users::entities::RoleName;

    #[test]
    fn test_any_of_capabilities() {
        let dept = Principal::Department(DepartmentPrincipal {
            dept_id: 1,
            username: "works_100".into(),
            institute_id: 2,
        });
        let admin = Principal::User(UserPrincipal {
            user_id: 5,
            username: "admin".into(),
            roles: vec![RoleName::InstituteAdmin],
            vendor_id: None,
            institute_id: Some(2),
        });
        let either = [Capability::InstituteAdmin, Capability::Department];

        assert!(RequireRole::permits(&either, &dept));
        assert!(RequireRole::permits(&either, &admin));
        assert!(!RequireRole::permits(&[Capability::Vendor], &admin));
        assert!(!RequireRole::permits(&[Capability::User], &dept));
    }
}
