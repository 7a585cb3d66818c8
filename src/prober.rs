//! URL probing module
//!
//! Checks whether an arbitrary link is alive:
//! - HEAD request first, GET fallback when the server answers 405
//! - Fixed browser User-Agent, 5 second timeout per request
//! - Blank input short-circuits to `empty` without touching the network

use std::time::Duration;

use reqwest::{redirect, Client, Url};

use crate::types::CheckOutcome;

/// Header sent with every outbound probe so servers treat us like a browser.
pub const PROBE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default per-request timeout for general link probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the shared HTTP client used by all checkers.
///
/// Redirects are not followed: a 3xx answer is reported with its own status
/// code rather than the status of the redirect target.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .user_agent(PROBE_USER_AGENT)
        .redirect(redirect::Policy::none())
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a transport-level failure onto a `broken` outcome.
pub(crate) fn outcome_from_error(e: &reqwest::Error) -> CheckOutcome {
    if e.is_timeout() {
        CheckOutcome::broken_error("timeout")
    } else if e.is_builder() {
        CheckOutcome::broken_error("invalid_url")
    } else {
        CheckOutcome::broken_error(e.to_string())
    }
}

enum HeadResult {
    Done(CheckOutcome),
    RetryGet,
}

/// Probes general (non-video) URLs.
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    pub fn new() -> Self {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    /// Tests use a shortened timeout; production code keeps the default.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { client: http_client(), timeout }
    }

    /// Check a single URL.
    ///
    /// Never returns an error: every failure mode collapses into a
    /// `broken` outcome. A single HEAD->GET escalation is the only retry.
    pub async fn probe(&self, url: &str) -> CheckOutcome {
        let url = url.trim();
        if url.is_empty() {
            return CheckOutcome::empty();
        }

        let parsed = match Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => u,
            _ => return CheckOutcome::broken_error("invalid_url"),
        };

        match self.head(parsed.clone()).await {
            HeadResult::Done(outcome) => outcome,
            HeadResult::RetryGet => self.get(parsed).await,
        }
    }

    async fn head(&self, url: Url) -> HeadResult {
        let response = self.client.head(url).timeout(self.timeout).send().await;
        match response {
            Ok(resp) => {
                let code = resp.status().as_u16();
                if (200..400).contains(&code) {
                    HeadResult::Done(CheckOutcome::working(code))
                } else if code == 405 {
                    // Method Not Allowed: some servers reject HEAD outright,
                    // so re-check with GET before calling the link broken.
                    HeadResult::RetryGet
                } else {
                    HeadResult::Done(CheckOutcome::broken_code(code))
                }
            }
            Err(e) => HeadResult::Done(outcome_from_error(&e)),
        }
    }

    async fn get(&self, url: Url) -> CheckOutcome {
        let response = self.client.get(url).timeout(self.timeout).send().await;
        match response {
            Ok(mut resp) => {
                let code = resp.status().as_u16();
                // Only the status matters; drain the body chunk by chunk so
                // a large payload is never buffered in full.
                while let Ok(Some(_)) = resp.chunk().await {}
                if (200..400).contains(&code) {
                    CheckOutcome::working(code)
                } else {
                    CheckOutcome::broken_code(code)
                }
            }
            Err(e) => outcome_from_error(&e),
        }
    }
}
