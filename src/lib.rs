//! Course Link Health
//!
//! Checks the liveness of every checkable link in the course content
//! catalog (quiz links, project links, English and Telugu lesson videos),
//! aggregates results into a section -> class -> day health tree with
//! percentage scores, and filters/exports the resulting report. The single
//! link check is also exposed as a small JSON HTTP endpoint.

pub mod aggregator;
pub mod catalog;
pub mod monitor;
pub mod prober;
pub mod progress;
pub mod report;
pub mod server;
pub mod types;
pub mod validator;
pub mod youtube;

pub use types::*;
