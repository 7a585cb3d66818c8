//! YouTube video availability module
//!
//! Resolves a video id or URL through the public oEmbed endpoint and
//! classifies the answer. A response is only `working` when the body parses
//! as JSON and carries a non-empty title; private, deleted and malformed
//! responses all collapse to `broken` and are deliberately indistinguishable.

use std::time::Duration;

use reqwest::Client;

use crate::prober::{http_client, outcome_from_error};
use crate::types::CheckOutcome;

/// Public metadata-lookup endpoint used to probe availability.
pub const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// oEmbed answers slower than plain pages, so this is longer than the
/// general probe timeout.
pub const OEMBED_TIMEOUT: Duration = Duration::from_secs(8);

/// Build the canonical watch URL for a video reference. Full YouTube URLs
/// pass through unchanged; anything else is treated as a bare video id.
pub fn canonical_watch_url(video_ref: &str) -> String {
    let video_ref = video_ref.trim();
    if video_ref.contains("youtube.com") || video_ref.contains("youtu.be") {
        video_ref.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={}", video_ref)
    }
}

/// Checks video availability via oEmbed.
pub struct VideoValidator {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl Default for VideoValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoValidator {
    pub fn new() -> Self {
        Self::with_endpoint(OEMBED_ENDPOINT, OEMBED_TIMEOUT)
    }

    /// Tests point this at a local fixture server with a short timeout.
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self { client: http_client(), endpoint: endpoint.into(), timeout }
    }

    /// Check one video reference (bare id or full URL).
    ///
    /// Never returns an error; all failures collapse into `broken`.
    pub async fn validate(&self, video_ref: &str) -> CheckOutcome {
        if video_ref.trim().is_empty() {
            return CheckOutcome::empty();
        }

        let watch_url = canonical_watch_url(video_ref);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(resp) => resp,
            Err(e) => return outcome_from_error(&e),
        };

        let code = response.status().as_u16();
        if code >= 400 {
            return CheckOutcome::broken_code(code);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return outcome_from_error(&e),
        };

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => {
                let has_title = value
                    .get("title")
                    .and_then(|t| t.as_str())
                    .map(|t| !t.is_empty())
                    .unwrap_or(false);
                if has_title {
                    CheckOutcome::working(code)
                } else {
                    CheckOutcome::broken_code(code)
                }
            }
            Err(_) => CheckOutcome::broken_code(code),
        }
    }
}
