use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::auth::entities::Capability;
use crate::models::tenders::requests::CreateCategoryRequest;
use crate::services::CategoryService;

static CATEGORY_SERVICE: Lazy<CategoryService> = Lazy::new(CategoryService::new_lazy);

pub async fn list_categories(req: HttpRequest) -> ActixResult<HttpResponse> {
    CATEGORY_SERVICE.list_categories(&req).await
}

pub async fn create_category(
    req: HttpRequest,
    body: web::Json<CreateCategoryRequest>,
) -> ActixResult<HttpResponse> {
    CATEGORY_SERVICE
        .create_category(&req, body.into_inner())
        .await
}

// 配置路由
pub fn configure_category_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/tender-categories")
            .route("", web::get().to(list_categories))
            .route(
                "",
                web::post()
                    .to(create_category)
                    .wrap(RequireRole::new_any(&[
                        Capability::InstituteAdmin,
                        Capability::Department,
                    ]))
                    .wrap(RequireJWT),
            ),
    );
}
