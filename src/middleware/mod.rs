//! # Custom Middleware
//!
//! Request-level instrumentation that runs around every handler.

pub mod metrics;

pub use metrics::RequestMetrics;
