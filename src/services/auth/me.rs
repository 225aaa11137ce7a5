use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{entities::require_user, responses::MeResponse},
};
use crate::services::failure;

pub async fn handle_me(service: &AuthService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    // 部门没有用户档案，走 /departments/current
    let user = match require_user(RequireJWT::extract_principal(request).as_ref()) {
        Ok(user) => user,
        Err(e) => return Ok(failure(&e)),
    };

    let storage = service.get_storage(request)?;
    match storage.get_user_profile(user.user_id).await {
        Ok(Some(profile)) => {
            let response = MeResponse {
                user_id: profile.user.id,
                username: profile.user.username,
                email: profile.user.email,
                roles: profile.user.roles,
                vendor: profile.vendor,
                institute: profile.institute,
                created_at: profile.user.created_at,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "User profile")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "User not found",
        ))),
        Err(e) => Ok(failure(&e)),
    }
}
