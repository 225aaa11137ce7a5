use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit, RequireRole};
use crate::models::auth::entities::Capability;
use crate::models::documents::entities::DocumentKind;
use crate::models::tenders::requests::{
    AnswerClarificationRequest, AskClarificationRequest, CreateCorrigendumRequest,
    CreateCriterionRequest, CreateTenderRequest, TenderListParams, UpdateTenderRequest,
};
use crate::services::{DocumentService, TenderService};
use crate::utils::SafeIDI64;

// 懒加载的全局 TenderService 实例
static TENDER_SERVICE: Lazy<TenderService> = Lazy::new(TenderService::new_lazy);
static DOCUMENT_SERVICE: Lazy<DocumentService> = Lazy::new(DocumentService::new_lazy);

pub async fn create_tender(
    req: HttpRequest,
    body: web::Json<CreateTenderRequest>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE.create_tender(&req, body.into_inner()).await
}

pub async fn list_public(
    req: HttpRequest,
    query: web::Query<TenderListParams>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .list_public(&req, query.into_inner().pagination)
        .await
}

pub async fn list_institute(
    req: HttpRequest,
    query: web::Query<TenderListParams>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .list_institute(&req, query.into_inner().pagination)
        .await
}

pub async fn list_department(
    req: HttpRequest,
    dept_id: SafeIDI64,
    query: web::Query<TenderListParams>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .list_department(&req, dept_id.0, query.into_inner().pagination)
        .await
}

pub async fn list_my_department(
    req: HttpRequest,
    query: web::Query<TenderListParams>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .list_my_department(&req, query.into_inner().pagination)
        .await
}

pub async fn update_tender(
    req: HttpRequest,
    tender_id: SafeIDI64,
    body: web::Json<UpdateTenderRequest>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .update_tender(&req, tender_id.0, body.into_inner())
        .await
}

pub async fn delete_tender(req: HttpRequest, tender_id: SafeIDI64) -> ActixResult<HttpResponse> {
    TENDER_SERVICE.delete_tender(&req, tender_id.0).await
}

pub async fn publish_tender(req: HttpRequest, tender_id: SafeIDI64) -> ActixResult<HttpResponse> {
    TENDER_SERVICE.publish_tender(&req, tender_id.0).await
}

pub async fn upload_document(
    req: HttpRequest,
    tender_id: SafeIDI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .upload_document(&req, tender_id.0, payload)
        .await
}

pub async fn download_document(
    req: HttpRequest,
    document_id: SafeIDI64,
) -> ActixResult<HttpResponse> {
    DOCUMENT_SERVICE
        .download(&req, DocumentKind::Tender, document_id.0)
        .await
}

pub async fn add_corrigendum(
    req: HttpRequest,
    tender_id: SafeIDI64,
    body: web::Json<CreateCorrigendumRequest>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .add_corrigendum(&req, tender_id.0, body.into_inner())
        .await
}

pub async fn add_evaluation_criterion(
    req: HttpRequest,
    tender_id: SafeIDI64,
    body: web::Json<CreateCriterionRequest>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .add_evaluation_criterion(&req, tender_id.0, body.into_inner())
        .await
}

pub async fn ask_clarification(
    req: HttpRequest,
    tender_id: SafeIDI64,
    body: web::Json<AskClarificationRequest>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .ask_clarification(&req, tender_id.0, body.into_inner())
        .await
}

pub async fn answer_clarification(
    req: HttpRequest,
    clarification_id: SafeIDI64,
    body: web::Json<AnswerClarificationRequest>,
) -> ActixResult<HttpResponse> {
    TENDER_SERVICE
        .answer_clarification(&req, clarification_id.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_tender_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/tenders")
            // 公开列表
            .route("/all", web::get().to(list_public))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route(
                        "",
                        web::post()
                            .to(create_tender)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/institute",
                        web::get()
                            .to(list_institute)
                            .wrap(RequireRole::new(Capability::InstituteAdmin)),
                    )
                    .route(
                        "/department/{dept_id}",
                        web::get()
                            .to(list_department)
                            .wrap(RequireRole::new(Capability::InstituteAdmin)),
                    )
                    .route(
                        "/my-department",
                        web::get()
                            .to(list_my_department)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    // 下载授权在服务内按归属判定
                    .route(
                        "/documents/{document_id}/download",
                        web::get().to(download_document),
                    )
                    .route(
                        "/clarifications/{clarification_id}/answer",
                        web::patch()
                            .to(answer_clarification)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/{tender_id}",
                        web::patch()
                            .to(update_tender)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/{tender_id}",
                        web::delete()
                            .to(delete_tender)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/{tender_id}/publish",
                        web::patch()
                            .to(publish_tender)
                            .wrap(RequireRole::new(Capability::InstituteAdmin)),
                    )
                    .route(
                        "/{tender_id}/documents",
                        web::post()
                            .to(upload_document)
                            .wrap(RateLimit::file_upload())
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/{tender_id}/corrigenda",
                        web::post()
                            .to(add_corrigendum)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/{tender_id}/evaluation-criteria",
                        web::post()
                            .to(add_evaluation_criterion)
                            .wrap(RequireRole::new(Capability::Department)),
                    )
                    .route(
                        "/{tender_id}/clarifications",
                        web::post()
                            .to(ask_clarification)
                            .wrap(RequireRole::new(Capability::Vendor)),
                    ),
            ),
    );
}
