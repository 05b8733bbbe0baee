//! claimset core: the claims registry, display formatting, `{{metricId}}`
//! templates and the freshness policy.
//!
//! This crate carries no runtime or transport dependencies so the same
//! registry logic backs the HTTP server, build-time checks and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Lookups are total:
//! unknown ids resolve to `None`, `""` or `"N/A"`, never to an error.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod format;
pub mod freshness;
pub mod model;
pub mod registry;
pub mod template;

/// Shared result type.
pub use error::{ClaimsError, Result};
pub use format::{DisplayFormat, NOT_AVAILABLE};
pub use freshness::FreshnessPolicy;
pub use model::{ConfidenceLevel, ContentBlock, MetricCategory, MetricRecord, MetricValue};
pub use registry::Registry;
