use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TenderService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, auth::entities::require_department,
    tenders::requests::UpdateTenderRequest,
};
use crate::services::{default_error_code, error_response, failure};
use crate::utils::validate::{require_text, validate_positive_amount};

fn tender_error(e: ETenderError) -> HttpResponse {
    let code = match &e {
        ETenderError::NotFound(_) => ErrorCode::TenderNotFound,
        e => default_error_code(e),
    };
    error_response(&e, code)
}

fn normalize(mut update: UpdateTenderRequest) -> Result<UpdateTenderRequest, ETenderError> {
    if update.is_empty() {
        return Err(ETenderError::validation("No fields to update"));
    }
    if let Some(title) = &update.title {
        update.title = Some(require_text(title, "title").map_err(ETenderError::validation)?);
    }
    if let Some(cost) = update.estimated_cost {
        validate_positive_amount(cost, "estimated_cost").map_err(ETenderError::validation)?;
    }
    Ok(update)
}

pub async fn update_tender(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
    update_request: UpdateTenderRequest,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let update = match normalize(update_request) {
        Ok(update) => update,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage
        .update_tender(dept.dept_id, tender_id, update, chrono::Utc::now())
        .await
    {
        Ok(tender) => Ok(HttpResponse::Ok().json(ApiResponse::success(tender, "Tender updated"))),
        Err(e) => Ok(tender_error(e)),
    }
}

pub async fn delete_tender(
    service: &TenderService,
    request: &HttpRequest,
    tender_id: i64,
) -> ActixResult<HttpResponse> {
    let dept = match require_department(RequireJWT::extract_principal(request).as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    match storage
        .delete_tender(dept.dept_id, tender_id, chrono::Utc::now())
        .await
    {
        Ok(()) => {
            info!("Department {} deleted tender {}", dept.dept_id, tender_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Tender deleted")))
        }
        Err(e) => Ok(tender_error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert!(normalize(UpdateTenderRequest::default()).is_err());

        let bad_cost = UpdateTenderRequest {
            estimated_cost: Some(-1.0),
            ..Default::default()
        };
        assert!(matches!(normalize(bad_cost), Err(ETenderError::Validation(_))));

        let ok = normalize(UpdateTenderRequest {
            title: Some("  Bridge  ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.title.as_deref(), Some("Bridge"));
    }
}
