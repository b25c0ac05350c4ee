use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use burrow_cache::MokaUrlCache;
use burrow_gateway::{App, AppState};
use burrow_generator::HashGenerator;
use burrow_limiter::{ManualClock, MokaWindowStore, RateLimitSettings, RateLimiter};
use burrow_shortener::{LinkService, ServiceSettings};
use burrow_storage::{InMemoryStore, ShardRouter};
use jiff::Timestamp;
use serde_json::{json, Value};
use tower::ServiceExt;

fn service(store: InMemoryStore) -> AppState {
    let service = LinkService::new(
        ShardRouter::single(store),
        MokaUrlCache::new(),
        HashGenerator::default(),
        ServiceSettings::default(),
    );
    AppState::new(Arc::new(service))
}

fn app() -> (Router, InMemoryStore) {
    let store = InMemoryStore::new();
    (App::router(service(store.clone())), store)
}

fn limited_app() -> Router {
    let settings = RateLimitSettings::default();
    let clock = ManualClock::new(Timestamp::from_second(1_700_000_000).unwrap());
    let limiter = RateLimiter::with_clock(
        Arc::new(MokaWindowStore::new(settings.window)),
        Arc::new(clock),
        settings,
    );
    App::router(service(InMemoryStore::new()).with_rate_limiter(limiter))
}

fn from_peer(mut request: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    request
}

fn create_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/shorten")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create(app: &Router, url: &str) -> String {
    let (status, body) = send(app, create_request(json!({ "original_url": url }))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["short_url"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health() {
    let (app, _) = app();
    let (status, body) = send(&app, request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_resolve_count_delete() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        create_request(json!({ "original_url": "https://example.com/a/long/path" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original_url"], "https://example.com/a/long/path");
    assert!(body["id"].as_i64().unwrap() > 0);
    let code = body["short_url"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);

    let (status, body) = send(&app, request("GET", &format!("/shorten/{code}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "original_url": "https://example.com/a/long/path" }));

    // the hit is counted in the background
    awaitility::at_most(Duration::from_secs(2))
        .poll_interval(Duration::from_millis(10))
        .until_async(|| async {
            let (_, body) = send(&app, request("GET", &format!("/shorten/{code}/count"))).await;
            body["count"] == 1
        })
        .await;
    let (status, body) = send(&app, request("GET", &format!("/shorten/{code}/count"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "url": code, "count": 1 }));

    let (status, body) = send(&app, request("DELETE", &format!("/shorten/{code}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Short URL deleted successfully" }));

    let (status, body) = send(&app, request("GET", &format!("/shorten/{code}"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "The short URL does not exist" }));
}

#[tokio::test]
async fn short_url_uses_the_public_base() {
    let store = InMemoryStore::new();
    let app = App::router(service(store).with_public_base_url("https://bur.row/"));

    let short_url = create(&app, "https://example.com").await;
    assert!(short_url.starts_with("https://bur.row/"), "{short_url}");
}

#[tokio::test]
async fn malformed_body_is_invalid_input() {
    let (app, _) = app();

    let (status, body) = send(&app, create_request(json!({ "url": "https://example.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid input" }));

    let missing_content_type = Request::builder()
        .method("POST")
        .uri("/shorten")
        .body(Body::from(r#"{"original_url":"https://example.com"}"#))
        .unwrap();
    let (status, _) = send(&app, missing_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_urls_are_invalid_input() {
    let (app, _) = app();
    for url in ["", "example.com", "ftp://example.com", "https://"] {
        let (status, body) = send(&app, create_request(json!({ "original_url": url }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{url}");
        assert_eq!(body, json!({ "error": "Invalid input" }));
    }
}

#[tokio::test]
async fn duplicate_url_is_a_generation_failure() {
    let (app, _) = app();
    create(&app, "https://example.com/dup").await;

    let (status, body) = send(
        &app,
        create_request(json!({ "original_url": "https://example.com/dup" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Failed to generate short URL, URL may already exist" })
    );
}

#[tokio::test]
async fn store_outage_does_not_leak_details() {
    let (app, store) = app();
    store.set_unavailable(true);

    let (status, body) = send(
        &app,
        create_request(json!({ "original_url": "https://example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to add data to the database" }));

    let (status, body) = send(&app, request("GET", "/shorten/abcdefgh/count")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to retrieve count for short URL" }));
}

#[tokio::test]
async fn malformed_codes_are_rejected_before_the_service() {
    let (app, _) = app();

    let (status, body) = send(&app, request("GET", "/shorten/ab")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Short URL is required" }));

    let (status, _) = send(&app, request("DELETE", "/shorten/not%20valid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_an_unknown_code_fails() {
    let (app, _) = app();
    let (status, body) = send(&app, request("DELETE", "/shorten/abcdefgh")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Failed to delete short URL, it may not exist" })
    );
}

#[tokio::test]
async fn sixth_request_from_one_client_is_limited() {
    let app = limited_app();

    for _ in 0..5 {
        let (status, _) = send(&app, from_peer(request("GET", "/health"), [10, 0, 0, 1])).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, from_peer(request("GET", "/health"), [10, 0, 0, 1])).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Rate limit exceeded" }));

    // another client has its own window
    let (status, _) = send(&app, from_peer(request("GET", "/health"), [10, 0, 0, 2])).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn limiter_is_off_unless_configured() {
    let (app, _) = app();
    for _ in 0..10 {
        let (status, _) = send(&app, from_peer(request("GET", "/health"), [10, 0, 0, 1])).await;
        assert_eq!(status, StatusCode::OK);
    }
}
