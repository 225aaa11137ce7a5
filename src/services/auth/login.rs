use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{
        entities::{DepartmentPrincipal, Principal, UserPrincipal},
        requests::LoginRequest,
        responses::LoginResponse,
    },
};
use crate::services::failure;
use crate::utils::jwt::{JwtUtils, TokenSubject};
use crate::utils::password::verify_password;

fn auth_failed() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let identifier = login_request.username.trim();

    // 1. 平台用户：用户名或邮箱
    let user = match storage.get_user_by_username_or_email(identifier).await {
        Ok(user) => user,
        Err(e) => return Ok(failure(&e)),
    };

    let (subject, principal) = if let Some(user) = user {
        if !verify_password(&login_request.password, &user.password_hash) {
            tracing::info!("Login failed for user {}", user.username);
            return Ok(auth_failed());
        }
        let profile = match storage.get_user_profile(user.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return Ok(auth_failed()),
            Err(e) => return Ok(failure(&e)),
        };
        (
            TokenSubject::User {
                user_id: user.id,
                username: user.username.clone(),
                roles: user.roles.clone(),
            },
            Principal::User(UserPrincipal {
                user_id: user.id,
                username: user.username,
                roles: user.roles,
                vendor_id: profile.vendor.map(|v| v.id),
                institute_id: profile.institute.map(|i| i.id),
            }),
        )
    } else {
        // 2. 部门账号
        let department = match storage.get_department_by_username(identifier).await {
            Ok(Some(department)) => department,
            Ok(None) => return Ok(auth_failed()),
            Err(e) => return Ok(failure(&e)),
        };
        if !verify_password(&login_request.password, &department.password_hash) {
            tracing::info!("Login failed for department {}", department.username);
            return Ok(auth_failed());
        }
        (
            TokenSubject::Department {
                dept_id: department.id,
                username: department.username.clone(),
                institute_id: department.institute_id,
            },
            Principal::Department(DepartmentPrincipal {
                dept_id: department.id,
                username: department.username,
                institute_id: department.institute_id,
            }),
        )
    };

    match JwtUtils::generate_access_token(&subject) {
        Ok(access_token) => {
            tracing::info!("{} logged in successfully", principal.username());
            let response = LoginResponse {
                access_token,
                token_type: "bearer".to_string(),
                expires_in: JwtUtils::access_token_ttl_secs(),
                principal,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
        }
        Err(e) => {
            tracing::error!("Failed to generate JWT token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            )
        }
    }
}
