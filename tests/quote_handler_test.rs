mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use admin_panel_backend::dto::quote_dto::{QuotePage, QuoteQuery};
use admin_panel_backend::export::ExportFile;
use admin_panel_backend::middlewares::session_gate::SessionGateState;
use admin_panel_backend::model::quote::{Quote, QuoteView};
use admin_panel_backend::model::quote_status::{QuoteStatus, StatusCounts};
use admin_panel_backend::router::quote_router::quote_router;
use admin_panel_backend::service::quote_service::QuoteService;
use admin_panel_backend::util::error::ServiceError;
use async_trait::async_trait;
use common::{admin_app, bearer, json_body, quotes};
use tower::ServiceExt;

fn seeded() -> Vec<admin_panel_backend::model::quote::Quote> {
    quotes(12, &[QuoteStatus::Pending, QuoteStatus::Approved])
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap()
}

fn put_status(id: &str, status: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri(format!("/quotes/{}/status", id))
        .header(header::AUTHORIZATION, bearer(token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"status":"{}"}}"#, status)))
        .unwrap()
}

fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_requests_without_session_are_sent_to_login() {
    let (router, _, _) = admin_app(seeded()).await;

    let res = router
        .clone()
        .oneshot(Request::builder().uri("/quotes").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/login");

    let res = router.oneshot(get("/quotes/stats", "not-a-jwt")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_health_needs_no_session() {
    let (router, _, _) = admin_app(Vec::new()).await;
    let res = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_quotes_filters_and_pages() {
    let (router, _, token) = admin_app(seeded()).await;

    let res = router.clone().oneshot(get("/quotes", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["quotes"].as_array().unwrap().len(), 10);
    assert_eq!(body["quotes"][0]["_id"], "q11");
    assert_eq!(body["quotes"][0]["total_amount"], 100.0);

    let res = router
        .clone()
        .oneshot(get("/quotes?status=approved&page=2", &token))
        .await
        .unwrap();
    let body = json_body(res).await;
    assert_eq!(body["total"], 6);
    assert_eq!(body["page"], 2);
    assert!(body["quotes"].as_array().unwrap().is_empty());

    let res = router.oneshot(get("/quotes?search=Q03%40EXAMPLE", &token)).await.unwrap();
    let body = json_body(res).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["quotes"][0]["_id"], "q03");
}

#[tokio::test]
async fn test_list_quotes_rejects_bad_parameters() {
    let (router, _, token) = admin_app(seeded()).await;
    for uri in [
        "/quotes?status=shipped",
        "/quotes?page=0",
        "/quotes?page=18446744073709551615",
        "/quotes?page=922337203685477581",
        "/quotes/export?page=18446744073709551615",
        "/quotes?date_start=2025-02-01&date_end=2025-01-01",
    ] {
        let res = router.clone().oneshot(get(uri, &token)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_stats_cover_every_status() {
    let (router, _, token) = admin_app(seeded()).await;
    let body = json_body(router.oneshot(get("/quotes/stats", &token)).await.unwrap()).await;
    assert_eq!(body["pending"], 6);
    assert_eq!(body["approved"], 6);
    assert_eq!(body["on_delivery"], 0);
    assert_eq!(body["total"], 12);
}

#[tokio::test]
async fn test_status_update() {
    let (router, _, token) = admin_app(seeded()).await;

    let res = router.clone().oneshot(put_status("q00", "in_progress", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["quote"]["status"], "in_progress");

    let res = router.clone().oneshot(put_status("q00", "shipped", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = router.oneshot(put_status("missing", "approved", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_confirm_flag() {
    let (router, services, token) = admin_app(seeded()).await;

    let res = router.clone().oneshot(delete("/quotes/q01", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(services.quotes.get_quote("q01").await.is_ok());

    let res = router.clone().oneshot(delete("/quotes/q01?confirm=true", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["deleted"]["_id"], "q01");
    assert_eq!(body["counts"]["approved"], 5);

    let res = router.oneshot(delete("/quotes/q01?confirm=true", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_is_a_zip_download() {
    let (router, _, token) = admin_app(seeded()).await;

    let res = router.clone().oneshot(get("/quotes/q02/export", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/zip");
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"Quote_q02_"));
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let res = router.oneshot(get("/quotes/export?status=pending", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("quotes_"));
}

#[tokio::test]
async fn test_unknown_paths_are_gated_too() {
    let (router, _, token) = admin_app(Vec::new()).await;

    let res = router
        .clone()
        .oneshot(Request::builder().uri("/no-such-page").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/login");

    let res = router.oneshot(get("/no-such-page", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

/// Writes go through; every read after them fails.
struct ReadsDown(Arc<dyn QuoteService>);

fn reads_down() -> ServiceError {
    ServiceError::InternalError("replica unavailable".to_string())
}

#[async_trait]
impl QuoteService for ReadsDown {
    async fn list_quotes(&self, _query: QuoteQuery) -> Result<QuotePage, ServiceError> {
        Err(reads_down())
    }

    async fn get_quote(&self, _id: &str) -> Result<QuoteView, ServiceError> {
        Err(reads_down())
    }

    async fn update_quote_status(&self, id: &str, status: QuoteStatus) -> Result<(), ServiceError> {
        self.0.update_quote_status(id, status).await
    }

    async fn delete_quote(&self, id: &str) -> Result<Quote, ServiceError> {
        self.0.delete_quote(id).await
    }

    async fn status_counts(&self) -> Result<StatusCounts, ServiceError> {
        Err(reads_down())
    }

    async fn export_quote(&self, _id: &str) -> Result<ExportFile, ServiceError> {
        Err(reads_down())
    }

    async fn export_quotes(&self, _query: QuoteQuery) -> Result<ExportFile, ServiceError> {
        Err(reads_down())
    }
}

#[tokio::test]
async fn test_committed_writes_report_success_when_follow_up_reads_fail() {
    let (_, services, token) = admin_app(seeded()).await;
    let gate = Arc::new(SessionGateState {
        jwt_utils: services.jwt_utils.clone(),
        auth_service: services.auth.clone(),
        login_path: "/login".to_string(),
    });
    let router = quote_router(Arc::new(ReadsDown(services.quotes.clone())), gate);

    let res = router.clone().oneshot(put_status("q00", "approved", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["id"], "q00");
    assert_eq!(body["status"], "approved");
    assert!(body["quote"].is_null());

    let res = router.oneshot(delete("/quotes/q01?confirm=true", &token)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["deleted"]["_id"], "q01");
    assert!(body["counts"].is_null());
    assert!(services.quotes.get_quote("q01").await.is_err());
}
