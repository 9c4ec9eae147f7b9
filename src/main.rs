//! Djed Trade Gateway — Entry Point
//!
//! Initializes configuration, logging, the chain connection, and the
//! gateway API. Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Connect the RPC provider (optional signer from GATEWAY_PRIVATE_KEY)
//! 4. Resolve + validate contract addresses on-chain (code must exist)
//! 5. Build adapters: reactor bindings, gas oracle, metrics, journal
//! 6. Spawn the gateway API server (health + metrics + trade routes)
//! 7. Spawn the snapshot refresh loop (gauges from the read surface)
//! 8. Wait for SIGINT → graceful shutdown (unready→signal→drain→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{Quota, RateLimiter};
use tokio::signal;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::api::{self, AppState};
use adapters::chain::{
    ChainAddresses, ContractValidator, EvmProvider, GasOracle, GasPolicy, ReactorContracts,
};
use adapters::metrics::MetricsRegistry;
use adapters::persistence::TradeJournal;
use domain::wad::wad_to_f64;
use usecases::observer::ProtocolObserver;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.client.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.chain.chain_id,
        dry_run = config.client.dry_run,
        "Starting Djed trade gateway"
    );

    // ── 3. Shutdown signal channels ─────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let (ready_tx, ready_rx) = watch::channel(true);

    // ── 4. Connect the RPC provider ─────────────────────────
    let provider = Arc::new(
        EvmProvider::connect(&config.chain)
            .await
            .context("Failed to connect to RPC")?,
    );
    let wallet = provider.wallet_context();
    if !wallet.connected {
        warn!("No signing key — trade and deploy routes will reject submissions");
    }

    // ── 5. Resolve + validate contract addresses ────────────
    let addresses = ChainAddresses::from_config(&config.contracts)?;
    ContractValidator::new(provider.inner())
        .validate_all(&addresses)
        .await
        .context("Contract validation failed")?;

    // ── 6. Build adapters ───────────────────────────────────
    let gas_policy = GasPolicy::new(&config.gas);
    let chain = Arc::new(ReactorContracts::new(
        Arc::clone(&provider),
        gas_policy,
        addresses,
        &config.chain,
    ));
    let gas_oracle = Arc::new(GasOracle::new(Arc::clone(&provider)));
    let observer = Arc::new(ProtocolObserver::new(
        Arc::clone(&chain),
        addresses.reactor,
        addresses.stable_coin,
        addresses.reserve_coin,
    ));
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let journal = Arc::new(
        TradeJournal::new(&config.persistence.data_dir)
            .await
            .context("Failed to open trade journal")?,
    );

    let per_minute = NonZeroU32::new(config.rate_limits.max_submissions_per_minute)
        .unwrap_or(NonZeroU32::MIN);
    let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

    // ── 7. Spawn the gateway API server ─────────────────────
    let state = AppState {
        chain: Arc::clone(&chain),
        observer: Arc::clone(&observer),
        metrics: Arc::clone(&metrics),
        journal,
        wallet,
        addresses,
        deploy_defaults: config.deploy.to_defaults(),
        dry_run: config.client.dry_run,
        limiter,
        submission_lock: Arc::new(Mutex::new(())),
        ready: ready_rx,
    };
    let bind_address = config.server.bind_address.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = api::serve(state, &bind_address).await {
            error!(error = %e, "API server failed");
        }
    });

    // ── 8. Spawn the snapshot refresh loop ──────────────────
    let refresh_handle = tokio::spawn(refresh_loop(
        Arc::clone(&observer),
        Arc::clone(&metrics),
        gas_oracle,
        config.chain.snapshot_interval_secs,
        shutdown_tx.subscribe(),
    ));

    info!("All tasks spawned — gateway is running");

    // ── 9. Wait for SIGINT ──────────────────────────────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
    }

    // ── Graceful shutdown ───────────────────────────────────

    // 1. Mark unready (readiness probe → 503) so load balancers drain
    let _ = ready_tx.send(false);

    // 2. Signal background tasks
    let _ = shutdown_tx.send(());

    // 3. Wait for the refresh loop to finish (up to 5s)
    let _ = tokio::time::timeout(Duration::from_secs(5), refresh_handle).await;

    // 4. Stop the API server
    server_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

/// Periodically refresh the protocol read surface into metrics gauges.
async fn refresh_loop(
    observer: Arc<ProtocolObserver<ReactorContracts>>,
    metrics: Arc<MetricsRegistry>,
    gas_oracle: Arc<GasOracle>,
    interval_secs: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                info!("Refresh loop received shutdown signal");
                break;
            }
            _ = interval.tick() => {
                match observer.snapshot().await {
                    Ok(snapshot) => {
                        metrics
                            .reserve_ratio_percent
                            .set(wad_to_f64(snapshot.ratio) * 100.0);
                        metrics.sc_price.set(wad_to_f64(snapshot.sc_price));
                        metrics
                            .rc_target_price
                            .set(wad_to_f64(snapshot.rc_target_price));
                        metrics.oracle_price.set(wad_to_f64(snapshot.oracle_price));
                        debug!("Protocol snapshot refreshed");
                    }
                    Err(e) => warn!(error = %e, "Snapshot refresh failed"),
                }
                match gas_oracle.current_gas_gwei().await {
                    Ok(gwei) => metrics.gas_price_gwei.set(gwei),
                    Err(e) => debug!(error = %e, "Gas price refresh failed"),
                }
            }
        }
    }
}
