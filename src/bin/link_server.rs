//! Validation endpoint binary
//!
//! Serves `POST /api/validate-link` so dashboards can check a single URL or
//! video id without probing from the browser.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use course_health::server;
use course_health::validator::LinkValidator;

#[tokio::main]
async fn main() -> Result<()> {
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .context("PORT must be a number")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    server::serve(addr, Arc::new(LinkValidator::new())).await
}
