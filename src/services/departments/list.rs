use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DepartmentService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, auth::entities::require_institute_admin,
    departments::responses::DepartmentListResponse,
};
use crate::services::failure;

pub async fn list_departments(
    service: &DepartmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref()) {
        Ok(admin) => admin,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage.list_departments(admin.institute_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            DepartmentListResponse { items },
            "Departments",
        ))),
        Err(e) => Ok(failure(&e)),
    }
}
