//! API Adapters - Gateway HTTP Surface
//!
//! The axum server exposing the gateway's operations: health probes,
//! metrics, protocol reads, quotes, and the submission routes.

pub mod handlers;
pub mod server;

pub use server::{router, serve, AppState};
