use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TenderService;
use crate::errors::ETenderError;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::entities::require_department,
    tenders::requests::{CreateTenderRequest, NewTender},
};
use crate::services::{default_error_code, error_response, failure};
use crate::utils::validate::{require_text, validate_positive_amount};

fn validate(req: CreateTenderRequest, department_id: i64) -> Result<NewTender, ETenderError> {
    let tender_number =
        require_text(&req.tender_number, "tender_number").map_err(ETenderError::validation)?;
    let title = require_text(&req.title, "title").map_err(ETenderError::validation)?;
    validate_positive_amount(req.estimated_cost, "estimated_cost")
        .map_err(ETenderError::validation)?;

    Ok(NewTender {
        tender_number,
        title,
        description: req.description.trim().to_string(),
        estimated_cost: req.estimated_cost,
        submission_deadline: req.submission_deadline,
        department_id,
        category_name: req
            .category_name
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    })
}

pub async fn create_tender(
    service: &TenderService,
    request: &HttpRequest,
    create_request: CreateTenderRequest,
) -> ActixResult<HttpResponse> {
    let principal = RequireJWT::extract_principal(request);
    let dept = match require_department(principal.as_ref()) {
        Ok(dept) => dept,
        Err(e) => return Ok(failure(&e)),
    };
    let storage = service.get_storage(request)?;

    let new_tender = match validate(create_request, dept.dept_id) {
        Ok(t) => t,
        Err(e) => return Ok(failure(&e)),
    };

    match storage
        .create_tender(new_tender, ("department", dept.dept_id), chrono::Utc::now())
        .await
    {
        Ok(tender) => {
            info!(
                "Department {} created tender {} ({})",
                dept.dept_id, tender.id, tender.tender_number
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(tender, "Tender created")))
        }
        Err(e) => {
            let code = match &e {
                ETenderError::Conflict(_) => ErrorCode::TenderNumberAlreadyExists,
                e => default_error_code(e),
            };
            Ok(error_response(&e, code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cost: f64, number: &str) -> CreateTenderRequest {
        serde_json::from_value(serde_json::json!({
            "tender_number": number,
            "title": " Road works ",
            "estimated_cost": cost,
            "submission_deadline": "2030-01-01T00:00:00Z",
            "category_name": "  ",
        }))
        .unwrap()
    }

    #[test]
    fn test_validation() {
        let ok = validate(request(10.0, "T-1"), 4).unwrap();
        assert_eq!(ok.title, "Road works");
        assert_eq!(ok.department_id, 4);
        assert!(ok.category_name.is_none());

        assert!(matches!(
            validate(request(0.0, "T-1"), 4),
            Err(ETenderError::Validation(_))
        ));
        assert!(matches!(
            validate(request(5.0, "  "), 4),
            Err(ETenderError::Validation(_))
        ));
    }
}
