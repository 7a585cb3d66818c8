//! Content catalog client
//!
//! Boundary to the course content service that owns sections, classes, days
//! and videos. The aggregator only talks to the `Catalog` trait so runs can
//! be driven from in-memory fixtures in tests.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::types::{ClassInfo, DayContent, DayInfo, SectionInfo};

/// A hung catalog connection must not stall the whole run.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_sections(&self) -> Result<Vec<SectionInfo>>;
    async fn list_classes(&self, section_id: i64) -> Result<Vec<ClassInfo>>;
    async fn list_days(&self, class_id: i64) -> Result<Vec<DayInfo>>;
    async fn day_content(&self, day_id: i64) -> Result<DayContent>;
}

/// Catalog over the admin content API
/// (`/sections`, `/classes/:id`, `/days/:id`, `/content/:id`).
pub struct HttpCatalog {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalog {
    /// `base_url` is the API prefix, e.g. `http://localhost:3000/api/admin`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, CATALOG_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("Failed to reach catalog at {}", url))?;

        let response = response
            .error_for_status()
            .with_context(|| format!("Catalog request {} failed", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse catalog response from {}", url))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn list_sections(&self) -> Result<Vec<SectionInfo>> {
        self.fetch("sections").await
    }

    async fn list_classes(&self, section_id: i64) -> Result<Vec<ClassInfo>> {
        self.fetch(&format!("classes/{}", section_id)).await
    }

    async fn list_days(&self, class_id: i64) -> Result<Vec<DayInfo>> {
        self.fetch(&format!("days/{}", class_id)).await
    }

    async fn day_content(&self, day_id: i64) -> Result<DayContent> {
        self.fetch(&format!("content/{}", day_id)).await
    }
}
