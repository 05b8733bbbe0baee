//! claimset server library entry.
//!
//! Wires the registry, formatted-value cache, usage auditor and reporting
//! timer into one access context, and exposes it over a small read-only HTTP
//! API. Consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod audit;
pub mod cache;
pub mod config;
pub mod context;
pub mod ops;
pub mod report;
pub mod router;
