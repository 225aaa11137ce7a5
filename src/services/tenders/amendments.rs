use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TenderService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::entities::require_department,
    tenders::requests::{CreateCorrigendumRequest, CreateCriterionRequest},
};
use crate::services::{default_error_code, error_response, failure};
use crate::utils::validate::{require_text, validate_weight};

fn tender_error(e: ETenderError) -> HttpResponse {
    let code = match &e {
        ETenderError::NotFound(_) => ErrorCode::TenderNotFound,
        e => default_error_code(e),
    };
    error_response(&e, code)
}

// 发布勘误
pub async fn add_corrigendum(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
    body: CreateCorrigendumRequest,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let description = match require_text(&body.description, "description") {
        Ok(text) => text,
        Err(msg) => return Ok(failure(&ETenderError::validation(msg))),
    };
    let storage = service.get_storage(request)?;

    match storage
        .add_corrigendum(dept.dept_id, tender_id, description, chrono::Utc::now())
        .await
    {
        Ok(corrigendum) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(corrigendum, "Corrigendum added"))),
        Err(e) => Ok(tender_error(e)),
    }
}

// 添加评标标准
pub async fn add_evaluation_criterion(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
    body: CreateCriterionRequest,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let criterion = match require_text(&body.criterion, "criterion") {
        Ok(text) => text,
        Err(msg) => return Ok(failure(&ETenderError::validation(msg))),
    };
    if let Err(msg) = validate_weight(body.weight) {
        return Ok(failure(&ETenderError::validation(msg)));
    }
    let storage = service.get_storage(request)?;

    match storage
        .add_evaluation_criterion(dept.dept_id, tender_id, criterion, body.weight)
        .await
    {
        Ok(criterion) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(criterion, "Evaluation criterion added"))),
        Err(e) => Ok(tender_error(e)),
    }
}
