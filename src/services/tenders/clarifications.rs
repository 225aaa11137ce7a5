use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TenderService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::entities::{require_department, require_vendor},
    tenders::requests::{AnswerClarificationRequest, AskClarificationRequest},
};
use crate::services::{default_error_code, error_response, failure};
use crate::utils::validate::require_text;

pub async fn ask_clarification(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
    body: AskClarificationRequest,
) -> ActixResult<HttpResponse> {
    let vendor = match require_vendor(RequireJWT::extract_principal(request).as_ref()) {
        Ok(vendor) => vendor,
        Err(e) => return Ok(failure(&e)),
    };
    let question = match require_text(&body.question, "question") {
        Ok(text) => text,
        Err(msg) => return Ok(failure(&ETenderError::validation(msg))),
    };
    let storage = service.get_storage(request)?;

    match storage
        .ask_clarification(vendor.vendor_id, tender_id, question, chrono::Utc::now())
        .await
    {
        Ok(clarification) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(clarification, "Question submitted"))),
        Err(e) => {
            let code = match &e {
                ETenderError::NotFound(_) => ErrorCode::TenderNotFound,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}

pub async fn answer_clarification(
    service: &TenderService,
    request: &HttpRequest,
    clarification_id: i64,
    body: AnswerClarificationRequest,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let answer = match require_text(&body.answer, "answer") {
        Ok(text) => text,
        Err(msg) => return Ok(failure(&ETenderError::validation(msg))),
    };
    let storage = service.get_storage(request)?;

    match storage
        .answer_clarification(dept.dept_id, clarification_id, answer, chrono::Utc::now())
        .await
    {
        Ok(clarification) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(clarification, "Clarification answered"))),
        Err(e) => {
            let code = match &e {
                ETenderError::NotFound(_) => ErrorCode::ClarificationNotFound,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}
