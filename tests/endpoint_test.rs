//! End-to-end tests for the validation endpoint over real sockets: a fixture
//! content site on one port, the validate-link service on another.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::Router;

use course_health::server;
use course_health::types::{CheckOutcome, LinkState};
use course_health::validator::{LinkChecker, LinkKind, LinkValidator, RemoteValidator};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Content site with a healthy page, a missing page, and a page that
/// rejects HEAD with 405 but serves GET.
async fn spawn_content_site() -> String {
    let app = Router::new()
        .route("/ok", get(|| async { "lesson page" }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/quiz",
            any(|method: Method| async move {
                if method == Method::HEAD {
                    StatusCode::METHOD_NOT_ALLOWED.into_response()
                } else {
                    "quiz form".into_response()
                }
            }),
        );
    spawn(app).await
}

async fn spawn_endpoint() -> String {
    let app = server::router(Arc::new(LinkValidator::new()));
    format!("{}/api/validate-link", spawn(app).await)
}

async fn post_check(endpoint: &str, body: serde_json::Value) -> CheckOutcome {
    reqwest::Client::new()
        .post(endpoint)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_endpoint_classifies_general_links() {
    let site = spawn_content_site().await;
    let endpoint = spawn_endpoint().await;

    let ok = post_check(&endpoint, serde_json::json!({"url": format!("{}/ok", site)})).await;
    assert_eq!(ok.status, LinkState::Working);
    assert_eq!(ok.code, Some(200));

    let missing =
        post_check(&endpoint, serde_json::json!({"url": format!("{}/missing", site)})).await;
    assert_eq!(missing.status, LinkState::Broken);
    assert_eq!(missing.code, Some(404));
}

#[tokio::test]
async fn test_endpoint_escalates_head_405_to_get() {
    let site = spawn_content_site().await;
    let endpoint = spawn_endpoint().await;

    let outcome =
        post_check(&endpoint, serde_json::json!({"url": format!("{}/quiz", site)})).await;
    assert_eq!(outcome.status, LinkState::Working);
    assert_eq!(outcome.code, Some(200));
}

#[tokio::test]
async fn test_endpoint_short_circuits_blank_before_type_branching() {
    let endpoint = spawn_endpoint().await;

    for body in [
        serde_json::json!({}),
        serde_json::json!({"url": ""}),
        serde_json::json!({"url": "  ", "type": "youtube"}),
    ] {
        let outcome = post_check(&endpoint, body).await;
        assert_eq!(outcome.status, LinkState::Empty);
        assert_eq!(outcome.code, None);
        assert_eq!(outcome.error, None);
    }
}

#[tokio::test]
async fn test_remote_validator_round_trips_through_endpoint() {
    let site = spawn_content_site().await;
    let endpoint = spawn_endpoint().await;
    let remote = RemoteValidator::new(endpoint);

    let outcome = remote.check(&format!("{}/ok", site), LinkKind::General).await;
    assert_eq!(outcome.status, LinkState::Working);
    assert_eq!(outcome.code, Some(200));

    let outcome = remote.check("", LinkKind::General).await;
    assert_eq!(outcome.status, LinkState::Empty);
}

#[tokio::test]
async fn test_remote_validator_absorbs_unreachable_endpoint() {
    // Nothing listens on this port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = RemoteValidator::new(format!("http://{}/api/validate-link", addr));
    let outcome = remote.check("https://example.com", LinkKind::General).await;
    assert_eq!(outcome.status, LinkState::Broken);
    assert!(outcome.error.is_some());
}
