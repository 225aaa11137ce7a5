use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RequireRole};
use crate::models::auth::entities::Capability;
use crate::models::awards::requests::CreateAwardRequest;
use crate::services::AwardService;

static AWARD_SERVICE: Lazy<AwardService> = Lazy::new(AwardService::new_lazy);

pub async fn create_award(
    req: HttpRequest,
    body: web::Json<CreateAwardRequest>,
) -> ActixResult<HttpResponse> {
    AWARD_SERVICE.create_award(&req, body.into_inner()).await
}

pub async fn list_awards(req: HttpRequest) -> ActixResult<HttpResponse> {
    AWARD_SERVICE.list_awards(&req).await
}

// 配置路由
pub fn configure_award_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/awards")
            // 后注册的中间件先执行，认证需在角色检查之前
            .wrap(RequireRole::new(Capability::InstituteAdmin))
            .wrap(middlewares::RequireJWT)
            .route("", web::post().to(create_award))
            .route("", web::get().to(list_awards)),
    );
}
