use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::DepartmentService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::entities::require_institute_admin,
    departments::{
        requests::{CreateDepartmentRequest, NewDepartment},
        responses::DepartmentCreatedResponse,
    },
};
use crate::services::{default_error_code, error_response, failure};
use crate::utils::password::hash_password;
use crate::utils::random_code::{generate_department_username, generate_password};
use crate::utils::validate::{require_text, validate_password};

const USERNAME_ATTEMPTS: usize = 20;
const GENERATED_PASSWORD_LEN: usize = 8;

pub async fn create_department(
    service: &DepartmentService,
    request: &HttpRequest,
    create_request: CreateDepartmentRequest,
) -> ActixResult<HttpResponse> {
    let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref()) {
        Ok(admin) => admin,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    let department_name = match require_text(&create_request.department_name, "department_name")
    {
        Ok(name) => name,
        Err(msg) => return Ok(failure(&ETenderError::validation(msg))),
    };

    match storage
        .get_department_by_name(admin.institute_id, &department_name)
        .await
    {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::DepartmentAlreadyExists,
                format!("Department '{department_name}' already exists in this institute"),
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(failure(&e)),
    }

    // 用户名全局唯一，碰撞时重新生成
    let mut username = None;
    for _ in 0..USERNAME_ATTEMPTS {
        let candidate = generate_department_username(&department_name);
        match storage.get_department_by_username(&candidate).await {
            Ok(None) => {
                username = Some(candidate);
                break;
            }
            Ok(Some(_)) => continue,
            Err(e) => return Ok(failure(&e)),
        }
    }
    let Some(username) = username else {
        warn!(
            "Could not find a free username for department '{}'",
            department_name
        );
        return Ok(failure(&ETenderError::conflict(
            "Could not generate a unique department username, please retry",
        )));
    };

    let password = match create_request.password {
        Some(password) => {
            if let Err(msg) = validate_password(&password) {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::UserPasswordInvalid,
                    msg,
                )));
            }
            password
        }
        None => generate_password(GENERATED_PASSWORD_LEN),
    };
    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => return Ok(failure(&e)),
    };

    let new_department = NewDepartment {
        institute_id: admin.institute_id,
        department_name,
        username: username.clone(),
        password_hash,
        head_of_department: create_request
            .head_of_department
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty()),
    };

    match storage
        .create_department(new_department, chrono::Utc::now())
        .await
    {
        Ok(department) => {
            info!(
                "Institute {} created department {} ({})",
                admin.institute_id, department.id, department.username
            );
            let response = DepartmentCreatedResponse {
                department,
                username,
                password,
            };
            Ok(HttpResponse::Created().json(ApiResponse::success(
                response,
                "Department created. Store the password now, it will not be shown again",
            )))
        }
        Err(e) => {
            let code = match &e {
                ETenderError::Conflict(_) => ErrorCode::DepartmentAlreadyExists,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
