use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::errors::ETenderError;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{
        requests::{NewSignup, SignupRequest},
        responses::SignupResponse,
    },
};
use crate::services::{default_error_code, error_response, failure};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub async fn handle_signup(
    service: &AuthService,
    signup_request: SignupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let username = signup_request.username.trim().to_string();
    let email = signup_request.email.trim().to_ascii_lowercase();

    if let Err(msg) = validate_username(&username) {
        return Ok(bad_request(ErrorCode::UserNameInvalid, msg));
    }
    if let Err(msg) = validate_email(&email) {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }
    if let Err(msg) = validate_password(&signup_request.password) {
        return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
    }
    let profile = match signup_request.profile() {
        Ok(profile) => profile,
        Err(field) => {
            return Ok(bad_request(
                ErrorCode::BadRequest,
                format!("{field} is required for role {}", signup_request.role),
            ));
        }
    };

    // 提前检查以给出具体的冲突原因，唯一索引兜底
    match storage.get_user_by_username(&username).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserNameAlreadyExists,
                "Username already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(failure(&e)),
    }
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(failure(&e)),
    }

    let password_hash = match hash_password(&signup_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ErrorCode::RegisterFailed)),
    };

    let new_signup = NewSignup {
        username,
        email,
        password_hash,
        role: signup_request.role,
        profile,
    };

    match storage.signup(new_signup, chrono::Utc::now()).await {
        Ok(created) => {
            info!(
                "User {} signed up as {}",
                created.user.username, signup_request.role
            );
            let response = SignupResponse {
                user_id: created.user.id,
                username: created.user.username,
                email: created.user.email,
                role: signup_request.role,
                vendor: created.vendor,
                institute: created.institute,
            };
            Ok(HttpResponse::Created().json(ApiResponse::success(response, "Signup successful")))
        }
        Err(e) => {
            let code = match &e {
                ETenderError::Conflict(_) => ErrorCode::Conflict,
                e if e.is_server_error() => ErrorCode::RegisterFailed,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
