use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DepartmentService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_department,
    departments::responses::DepartmentWithInstitute,
};
use crate::services::failure;

pub async fn current_department(
    service: &DepartmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage.get_department_by_id(dept.dept_id).await {
        Ok(Some(department)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(department, "Current department")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::DepartmentNotFound,
            "Department not found",
        ))),
        Err(e) => Ok(failure(&e)),
    }
}

pub async fn my_institute(
    service: &DepartmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    let department = match storage.get_department_by_id(dept.dept_id).await {
        Ok(Some(department)) => department,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::DepartmentNotFound,
                "Department not found",
            )));
        }
        Err(e) => return Ok(failure(&e)),
    };

    match storage.get_institute_by_id(department.institute_id).await {
        Ok(Some(institute)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            DepartmentWithInstitute {
                department,
                institute,
            },
            "Institute of current department",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Institute not found",
        ))),
        Err(e) => Ok(failure(&e)),
    }
}
