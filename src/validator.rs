//! Link validation dispatch
//!
//! The single entry point for checking any link slot. Blank input resolves
//! to `empty` before any type branching; video references go through the
//! oEmbed validator with their result collapsed to a bare status; everything
//! else goes through the URL prober including its HEAD->GET escalation.

use async_trait::async_trait;

use crate::prober::Prober;
use crate::types::CheckOutcome;
use crate::youtube::VideoValidator;

/// What kind of check a link slot needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    General,
    YouTube,
}

impl LinkKind {
    /// Map the caller-supplied type tag. Anything but "youtube" is a
    /// general link check.
    pub fn from_type_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("youtube") => LinkKind::YouTube,
            _ => LinkKind::General,
        }
    }
}

/// Seam between the aggregator and whatever performs the actual check,
/// so runs are testable with fixed outcomes.
#[async_trait]
pub trait LinkChecker: Send + Sync {
    async fn check(&self, url: &str, kind: LinkKind) -> CheckOutcome;
}

/// Checks links directly over the network.
pub struct LinkValidator {
    prober: Prober,
    videos: VideoValidator,
}

impl Default for LinkValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkValidator {
    pub fn new() -> Self {
        Self { prober: Prober::new(), videos: VideoValidator::new() }
    }

    /// Compose from pre-built parts; tests inject fixture endpoints here.
    pub fn with_parts(prober: Prober, videos: VideoValidator) -> Self {
        Self { prober, videos }
    }
}

#[async_trait]
impl LinkChecker for LinkValidator {
    async fn check(&self, url: &str, kind: LinkKind) -> CheckOutcome {
        // The blank check comes before any type branching.
        if url.trim().is_empty() {
            return CheckOutcome::empty();
        }
        match kind {
            // Callers only observe working/broken for video checks.
            LinkKind::YouTube => self.videos.validate(url).await.status_only(),
            LinkKind::General => self.prober.probe(url).await,
        }
    }
}

/// Checks links through a remote `/api/validate-link` endpoint instead of
/// probing directly, mirroring a dashboard that fronts the backend service.
pub struct RemoteValidator {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteValidator {
    /// `endpoint` is the full URL of the validate-link route.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), endpoint: endpoint.into() }
    }
}

#[async_trait]
impl LinkChecker for RemoteValidator {
    async fn check(&self, url: &str, kind: LinkKind) -> CheckOutcome {
        let type_tag = match kind {
            LinkKind::YouTube => "youtube",
            LinkKind::General => "general",
        };
        let body = serde_json::json!({ "url": url, "type": type_tag });

        let response = self.client.post(&self.endpoint).json(&body).send().await;
        match response {
            Ok(resp) => match resp.json::<CheckOutcome>().await {
                Ok(outcome) => outcome,
                Err(e) => CheckOutcome::broken_error(e.to_string()),
            },
            Err(e) => CheckOutcome::broken_error(e.to_string()),
        }
    }
}
