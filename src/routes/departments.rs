use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::auth::entities::Capability;
use crate::models::departments::requests::CreateDepartmentRequest;
use crate::services::DepartmentService;

static DEPARTMENT_SERVICE: Lazy<DepartmentService> = Lazy::new(DepartmentService::new_lazy);

pub async fn create_department(
    req: HttpRequest,
    body: web::Json<CreateDepartmentRequest>,
) -> ActixResult<HttpResponse> {
    DEPARTMENT_SERVICE
        .create_department(&req, body.into_inner())
        .await
}

pub async fn list_departments(req: HttpRequest) -> ActixResult<HttpResponse> {
    DEPARTMENT_SERVICE.list_departments(&req).await
}

pub async fn current_department(req: HttpRequest) -> ActixResult<HttpResponse> {
    DEPARTMENT_SERVICE.current_department(&req).await
}

pub async fn my_institute(req: HttpRequest) -> ActixResult<HttpResponse> {
    DEPARTMENT_SERVICE.my_institute(&req).await
}

// 配置路由
pub fn configure_department_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/departments")
            .wrap(middlewares::RequireJWT)
            .route(
                "",
                web::post()
                    .to(create_department)
                    .wrap(RequireRole::new(Capability::InstituteAdmin)),
            )
            .route(
                "",
                web::get()
                    .to(list_departments)
                    .wrap(RequireRole::new(Capability::InstituteAdmin)),
            )
            .route(
                "/current",
                web::get()
                    .to(current_department)
                    .wrap(RequireRole::new(Capability::Department)),
            )
            .route(
                "/my-institute",
                web::get()
                    .to(my_institute)
                    .wrap(RequireRole::new(Capability::Department)),
            ),
    );
}
