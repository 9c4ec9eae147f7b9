//! Metrics Adapters - Prometheus Export
//!
//! Centralized metrics registry rendered on the gateway's `/metrics`
//! route. Health probes (`/live`, `/ready`) live with the API router.

pub mod prometheus;

pub use prometheus::MetricsRegistry;
