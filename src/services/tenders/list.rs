//! 招标列表，四种可见范围共用同一份详情投影

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TenderService;
use crate::middlewares::require_jwt::load_principal;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, PaginationQuery,
    auth::entities::{require_department, require_institute_admin},
    tenders::requests::TenderScope,
};
use crate::services::failure;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

/// 公开列表不要求登录；带着有效的供应商令牌时用于标记 userBidSubmitted
async fn optional_vendor_id(storage: &dyn Storage, request: &HttpRequest) -> Option<i64> {
    let token = JwtUtils::extract_bearer_token(request)?;
    let subject = JwtUtils::verify_token(&token).ok()?.subject()?;
    load_principal(storage, subject)
        .await
        .ok()?
        .as_vendor()
        .map(|v| v.vendor_id)
}

async fn respond(
    storage: &dyn Storage,
    scope: TenderScope,
    query: PaginationQuery,
    viewer_vendor_id: Option<i64>,
) -> HttpResponse {
    match storage.list_tenders(scope, query, viewer_vendor_id).await {
        Ok(list) => HttpResponse::Ok().json(ApiResponse::success(list, "Tenders")),
        Err(e) => failure(&e),
    }
}

pub async fn list_public(
    service: &TenderService,
    request: &HttpRequest,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let viewer = optional_vendor_id(storage.as_ref(), request).await;
    Ok(respond(storage.as_ref(), TenderScope::Public, query, viewer).await)
}

pub async fn list_institute(
    service: &TenderService,
    request: &HttpRequest,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref()) {
        Ok(admin) => admin,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;
    Ok(respond(
        storage.as_ref(),
        TenderScope::Institute(admin.institute_id),
        query,
        None,
    )
    .await)
}

/// 机构管理员查看本机构某个部门的招标
pub async fn list_department(
    service: &TenderService,
    request: &HttpRequest,
    dept_id: i64,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let admin = match require_institute_admin(RequireJWT::extract_principal(request).as_ref()) {
        Ok(admin) => admin,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage.get_department_by_id(dept_id).await {
        Ok(Some(department)) if department.institute_id == admin.institute_id => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "Department belongs to another institute",
            )));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::DepartmentNotFound,
                format!("Department {dept_id} not found"),
            )));
        }
        Err(e) => return Ok(failure(&e)),
    }

    Ok(respond(
        storage.as_ref(),
        TenderScope::Department(dept_id),
        query,
        None,
    )
    .await)
}

pub async fn list_my_department(
    service: &TenderService,
    request: &HttpRequest,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;
    Ok(respond(
        storage.as_ref(),
        TenderScope::Department(dept.dept_id),
        query,
        None,
    )
    .await)
}
