//! Link validation HTTP endpoint
//!
//! Exposes the dispatch logic as `POST /api/validate-link` with a JSON body
//! `{url, type?}` answering `{status, code?, error?}`. The handler never
//! fails: a missing URL answers `empty` and every internal failure has
//! already collapsed into a `broken` outcome by the time it gets here.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::types::{CheckOutcome, ValidateRequest};
use crate::validator::{LinkChecker, LinkKind, LinkValidator};

pub fn router(validator: Arc<LinkValidator>) -> Router {
    Router::new()
        .route("/api/validate-link", post(validate_link))
        .with_state(validator)
}

async fn validate_link(
    State(validator): State<Arc<LinkValidator>>,
    Json(request): Json<ValidateRequest>,
) -> Json<CheckOutcome> {
    let url = request.url.unwrap_or_default();
    let kind = LinkKind::from_type_tag(request.link_type.as_deref());
    Json(validator.check(&url, kind).await)
}

/// Serve the endpoint until the process is stopped.
pub async fn serve(addr: SocketAddr, validator: Arc<LinkValidator>) -> Result<()> {
    let app = router(validator);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    println!("Link validation endpoint listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinkState;

    async fn spawn_endpoint() -> String {
        let app = router(Arc::new(LinkValidator::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/validate-link", addr)
    }

    #[tokio::test]
    async fn test_missing_url_answers_empty() {
        let endpoint = spawn_endpoint().await;
        let client = reqwest::Client::new();

        let outcome: CheckOutcome = client
            .post(&endpoint)
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(outcome.status, LinkState::Empty);

        let outcome: CheckOutcome = client
            .post(&endpoint)
            .json(&serde_json::json!({"url": "   ", "type": "youtube"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(outcome.status, LinkState::Empty);
    }

    #[tokio::test]
    async fn test_invalid_url_answers_broken() {
        let endpoint = spawn_endpoint().await;

        let outcome: CheckOutcome = reqwest::Client::new()
            .post(&endpoint)
            .json(&serde_json::json!({"url": "not a url"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(outcome.status, LinkState::Broken);
        assert_eq!(outcome.error.as_deref(), Some("invalid_url"));
    }
}
