//! 基于 actix_web::test 的端到端场景

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use super::configure_api_routes;
use crate::storage::Storage;
use crate::storage::blob_store::{BlobStore, LocalBlobStore};
use crate::storage::sea_orm_storage::SeaOrmStorage;
use crate::utils::{json_error_handler, query_error_handler};

struct Fixture {
    storage: Arc<dyn Storage>,
    blob_store: Arc<dyn BlobStore>,
    db_path: PathBuf,
    blob_root: PathBuf,
    /// 每个测试独占一段地址，避免限流计数互相干扰
    ip_prefix: String,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.db_path.display()));
        }
        let _ = std::fs::remove_dir_all(&self.blob_root);
    }
}

async fn fixture() -> Fixture {
    let id = uuid::Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("etender-e2e-{id}.db"));
    let blob_root = std::env::temp_dir().join(format!("etender-e2e-blobs-{id}"));
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::connect(&url, 5, 30).await.unwrap();
    let blob_store = LocalBlobStore::new(
        &blob_root,
        1024 * 1024,
        vec![".pdf".into(), ".txt".into()],
    );
    let bytes = id.as_bytes();
    Fixture {
        storage: Arc::new(storage),
        blob_store: Arc::new(blob_store),
        db_path,
        blob_root,
        ip_prefix: format!("10.{}.{}", bytes[0], bytes[1]),
    }
}

impl Fixture {
    fn ip(&self, host: u8) -> String {
        format!("{}.{host}", self.ip_prefix)
    }
}

macro_rules! init_app {
    ($fx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($fx.storage.clone()))
                .app_data(web::Data::new($fx.blob_store.clone()))
                .configure(configure_api_routes),
        )
        .await
    };
}

async fn into_json<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

macro_rules! send {
    ($app:expr, $req:expr $(,)?) => {
        into_json(test::call_service($app, $req.to_request()).await).await
    };
}

fn with_auth(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
}

fn from_ip(req: test::TestRequest, ip: &str) -> test::TestRequest {
    req.insert_header(("X-Forwarded-For", ip.to_string()))
}

fn vendor_signup(name: &str) -> Value {
    json!({
        "username": name,
        "email": format!("{name}@example.com"),
        "password": "vendorpass1",
        "role": "VENDOR",
        "company_name": format!("{name} Pvt Ltd"),
    })
}

fn admin_signup(name: &str) -> Value {
    json!({
        "username": name,
        "email": format!("{name}@example.edu"),
        "password": "adminpass1",
        "role": "INSTITUTE_ADMIN",
        "institute_name": "Institute of Testing",
        "contact_email": "office@example.edu",
    })
}

fn multipart_body(boundary: &str, file_name: &str, content: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    )
}

#[actix_web::test]
async fn test_tender_lifecycle() {
    let fx = fixture().await;
    let app = init_app!(fx);

    // 注册
    let (status, _) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/signup"), &fx.ip(1))
            .set_json(vendor_signup("acme")),
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/signup"), &fx.ip(2))
            .set_json(admin_signup("iitadmin")),
    );
    assert_eq!(status, StatusCode::CREATED);

    // 登录
    let (status, body) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/login"), &fx.ip(1))
            .set_json(json!({"username": "acme@example.com", "password": "vendorpass1"})),
    );
    assert_eq!(status, StatusCode::OK);
    let vendor_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (_, body) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/login"), &fx.ip(2))
            .set_json(json!({"username": "iitadmin", "password": "adminpass1"})),
    );
    let admin_token = body["data"]["access_token"].as_str().unwrap().to_string();

    // 机构管理员创建部门
    let (status, body) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/departments"), &admin_token)
            .set_json(json!({"name": "Civil Works"})),
    );
    assert_eq!(status, StatusCode::CREATED);
    let dept_username = body["data"]["username"].as_str().unwrap().to_string();
    let dept_password = body["data"]["password"].as_str().unwrap().to_string();

    let (status, body) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/login"), &fx.ip(3))
            .set_json(json!({"username": dept_username, "password": dept_password})),
    );
    assert_eq!(status, StatusCode::OK);
    let dept_token = body["data"]["access_token"].as_str().unwrap().to_string();

    // 部门创建草稿招标，截止时间设在几秒后以便随后授标
    let deadline_at = Utc::now() + Duration::seconds(4);
    let deadline = deadline_at.to_rfc3339();
    let (status, body) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/tenders"), &dept_token).set_json(json!({
            "tender_number": "T-2030-001",
            "title": "Road resurfacing",
            "description": "Phase one",
            "estimated_cost": 250000.0,
            "submission_deadline": deadline,
            "category_name": "Construction",
        })),
    );
    assert_eq!(status, StatusCode::CREATED);
    let tender_id = body["data"]["id"].as_i64().unwrap();

    // 草稿不在公开列表，也不能投标
    let (status, body) = send!(&app, test::TestRequest::get().uri("/api/v1/tenders/all"));
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());

    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/bids"), &vendor_token)
            .set_json(json!({"tender_id": tender_id, "amount": 240000.0})),
    );
    assert!(status.is_client_error());

    // 招标文件
    let boundary = "etenderboundary";
    let (status, body) = send!(
        &app,
        with_auth(
            test::TestRequest::post().uri(&format!("/api/v1/tenders/{tender_id}/documents")),
            &dept_token,
        )
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(multipart_body(boundary, "scope.txt", "scope of work")),
    );
    assert_eq!(status, StatusCode::CREATED);
    let document_id = body["data"]["id"].as_i64().unwrap();
    let download_uri = format!("/api/v1/tenders/documents/{document_id}/download");

    // 发布前供应商无权下载
    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::get().uri(&download_uri), &vendor_token),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 部门不能发布
    let publish_uri = format!("/api/v1/tenders/{tender_id}/publish");
    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::patch().uri(&publish_uri), &dept_token),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::patch().uri(&publish_uri), &admin_token),
    );
    assert_eq!(status, StatusCode::OK);

    let resp = test::call_service(
        &app,
        with_auth(test::TestRequest::get().uri(&download_uri), &vendor_token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "scope of work".as_bytes());

    // 投标
    let (status, body) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/bids"), &vendor_token)
            .set_json(json!({"tender_id": tender_id, "amount": 240000.0})),
    );
    assert_eq!(status, StatusCode::CREATED);
    let bid_id = body["data"]["bid"]["id"].as_i64().unwrap();

    // 公开列表带上当前供应商的投标标记
    let (_, body) = send!(
        &app,
        with_auth(test::TestRequest::get().uri("/api/v1/tenders/all"), &vendor_token),
    );
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["userBidSubmitted"], json!(true));

    // 截止前不能授标
    let start = Utc::now() + Duration::days(30);
    let award_body = json!({
        "bid_id": bid_id,
        "contract_start": start.to_rfc3339(),
        "contract_end": (start + Duration::days(90)).to_rfc3339(),
    });
    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/awards"), &admin_token)
            .set_json(&award_body),
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let wait = (deadline_at - Utc::now()).to_std().unwrap_or_default();
    tokio::time::sleep(wait + std::time::Duration::from_secs(1)).await;

    // 授标
    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/awards"), &dept_token).set_json(&award_body),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/awards"), &admin_token).set_json(&award_body),
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");

    // 供应商收到通知并标记已读
    let (status, body) = send!(
        &app,
        with_auth(test::TestRequest::get().uri("/api/v1/notifications"), &vendor_token),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unread_count"], json!(1));
    let notification_id = body["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, _) = send!(
        &app,
        with_auth(
            test::TestRequest::patch()
                .uri(&format!("/api/v1/notifications/{notification_id}/read")),
            &vendor_token,
        ),
    );
    assert_eq!(status, StatusCode::OK);

    // 别人的通知按不存在处理
    let (status, _) = send!(
        &app,
        with_auth(
            test::TestRequest::patch()
                .uri(&format!("/api/v1/notifications/{notification_id}/read")),
            &admin_token,
        ),
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_authentication_gates() {
    let fx = fixture().await;
    let app = init_app!(fx);

    let (status, body) = send!(&app, test::TestRequest::get().uri("/api/v1/bids"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(1001));

    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::get().uri("/api/v1/auth/me"), "not-a-token"),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 预检请求不需要令牌
    let (status, _) = send!(
        &app,
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/v1/bids"),
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    // 分类列表公开
    let (status, _) = send!(&app, test::TestRequest::get().uri("/api/v1/tender-categories"));
    assert_eq!(status, StatusCode::OK);

    // 供应商不能创建分类或访问部门接口
    let (status, _) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/signup"), &fx.ip(1))
            .set_json(vendor_signup("globex"))
    );
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/login"), &fx.ip(1))
            .set_json(json!({"username": "globex", "password": "vendorpass1"})),
    );
    let vendor_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::post().uri("/api/v1/tender-categories"), &vendor_token)
            .set_json(json!({"name": "Furniture"})),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send!(
        &app,
        with_auth(test::TestRequest::get().uri("/api/v1/departments/current"), &vendor_token),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send!(
        &app,
        with_auth(test::TestRequest::get().uri("/api/v1/auth/me"), &vendor_token),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], json!("globex"));
}

#[actix_web::test]
async fn test_signup_and_login_failures() {
    let fx = fixture().await;
    let app = init_app!(fx);
    let ip = fx.ip(7);

    let (status, _) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/signup"), &ip)
            .set_json(vendor_signup("initech")),
    );
    assert_eq!(status, StatusCode::CREATED);

    // 同名注册
    let (status, body) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/signup"), &ip)
            .set_json(vendor_signup("initech")),
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!(2001));

    let (status, body) = send!(
        &app,
        from_ip(test::TestRequest::post().uri("/api/v1/auth/login"), &ip)
            .set_json(json!({"username": "initech", "password": "wrongpass1"})),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], json!(2000));

}
