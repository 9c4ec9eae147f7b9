//! Gateway API Server - Router and Shared State
//!
//! One axum server carries the whole surface: liveness/readiness probes,
//! the Prometheus text endpoint, the protocol read routes, and the
//! submission routes (trade, deploy). Submissions share a single lock so
//! transactions from the gateway wallet never race for nonces, and a
//! direct rate limiter bounds how fast anything reaches the chain.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use governor::DefaultDirectRateLimiter;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::adapters::chain::{ChainAddresses, ReactorContracts};
use crate::adapters::metrics::MetricsRegistry;
use crate::adapters::persistence::TradeJournal;
use crate::domain::deploy::DeployDefaults;
use crate::domain::wallet::WalletContext;
use crate::usecases::observer::ProtocolObserver;

use super::handlers;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<ReactorContracts>,
    pub observer: Arc<ProtocolObserver<ReactorContracts>>,
    pub metrics: Arc<MetricsRegistry>,
    pub journal: Arc<TradeJournal>,
    pub wallet: WalletContext,
    pub addresses: ChainAddresses,
    pub deploy_defaults: DeployDefaults,
    pub dry_run: bool,
    /// Bounds trade/deploy submissions per minute.
    pub limiter: Arc<DefaultDirectRateLimiter>,
    /// Serializes submissions from the gateway wallet (nonce ordering).
    pub submission_lock: Arc<Mutex<()>>,
    /// Readiness flag, flipped false during shutdown.
    pub ready: watch::Receiver<bool>,
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/live", get(handlers::live))
        .route("/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .route("/status", get(handlers::status))
        .route("/portfolio/:address", get(handlers::portfolio))
        .route("/quote", post(handlers::quote))
        .route("/trade", post(handlers::trade))
        .route("/deploy", post(handlers::deploy))
        .with_state(state)
}

/// Bind and serve until the task is aborted.
pub async fn serve(state: AppState, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!(address = bind_address, "Gateway API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
