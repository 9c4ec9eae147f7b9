//! Gateway API Handlers
//!
//! Request/response DTOs and the route handlers. Validation errors come
//! back as 400 with the domain's user-facing message; submission
//! failures as 502 with the collaborator's message verbatim plus the
//! gas-ceiling hint when one applies. A failed attempt is journaled just
//! like a confirmed one.

use std::sync::Arc;
use std::time::Instant;

use alloy::primitives::Address;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::adapters::persistence::TradeRecord;
use crate::domain::deploy::DeployRequest;
use crate::domain::error::TradeError;
use crate::domain::intent::{TradeDirection, TradeIntent, TxHandle};
use crate::domain::quote::{self, PriceFeeds, Quote};
use crate::ports::protocol_reader::ProtocolReader;
use crate::usecases::deployer::ReactorDeployer;
use crate::usecases::observer::{PortfolioView, ProtocolView};
use crate::usecases::sequencer::{TradeOutcome, TradeSequencer};

use super::server::AppState;

/// Error envelope returned by every route.
pub struct ApiError {
    status: StatusCode,
    message: String,
    hint: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), hint: None }
    }

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        let status = match &err {
            TradeError::Validation(_) | TradeError::WalletNotConnected => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::BAD_GATEWAY,
        };
        let hint = err.gas_ceiling_hint().map(str::to_string);
        Self { status, message: err.to_string(), hint }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message, "hint": self.hint });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub direction: TradeDirection,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub attempt_id: Uuid,
    pub direction: TradeDirection,
    pub trade_tx: TxHandle,
    pub approvals: Vec<TxHandle>,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub attempt_id: Uuid,
    pub tx: TxHandle,
}

/// Liveness probe: 200 while the process runs.
pub async fn live() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 503 once shutdown has begun.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    if *state.ready.borrow() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Market snapshot: ratio, reserves, prices, fees, supplies.
pub async fn status(State(state): State<AppState>) -> Result<Json<ProtocolView>, ApiError> {
    let snapshot = state
        .observer
        .snapshot()
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;
    Ok(Json(snapshot.view()))
}

/// One account's balances and standing allowances.
pub async fn portfolio(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PortfolioView>, ApiError> {
    let owner: Address = address.trim().parse().map_err(|_| {
        ApiError::new(StatusCode::BAD_REQUEST, "address must be a 20-byte hex address")
    })?;
    let portfolio = state
        .observer
        .portfolio(owner)
        .await
        .map_err(|e| ApiError::bad_gateway(e.to_string()))?;
    Ok(Json(portfolio.view()))
}

/// Pure estimate against the latest observed feeds.
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Json<Quote> {
    // A feed that cannot be read simply yields the zero quote.
    let feeds = PriceFeeds {
        sc_price: state.chain.sc_price().await.ok(),
        rc_target_price: state.chain.rc_target_price().await.ok(),
    };
    let estimate = quote::estimate(request.direction, &request.amount, &feeds);
    state.metrics.quotes_computed.inc();
    Json(estimate)
}

/// Run the trade sequencer to a terminal state.
pub async fn trade(
    State(state): State<AppState>,
    Json(intent): Json<TradeIntent>,
) -> Result<Json<TradeResponse>, ApiError> {
    check_submissions_enabled(&state)?;

    // One submission at a time: two in-flight transactions from the
    // gateway wallet would contend for sequential nonces.
    let _guard = state.submission_lock.lock().await;

    let direction = intent.direction.to_string();
    let mut sequencer = TradeSequencer::new(
        Arc::clone(&state.chain),
        Arc::clone(&state.chain),
        state.wallet,
        state.addresses.reactor,
        state.addresses.stable_coin,
        state.addresses.reserve_coin,
    );

    state
        .metrics
        .trades_submitted
        .with_label_values(&[&direction])
        .inc();

    let started = Instant::now();
    let result = sequencer.run(&intent).await;
    state
        .metrics
        .attempt_duration_seconds
        .observe(started.elapsed().as_secs_f64());

    let attempt_id = sequencer.attempt_id();
    match result {
        Ok(outcome) => {
            state
                .metrics
                .trades_confirmed
                .with_label_values(&[&direction])
                .inc();
            state
                .metrics
                .approvals_submitted
                .inc_by(outcome.approvals.len() as u64);
            journal_attempt(&state, &intent, attempt_id, Some(&outcome), None).await;
            Ok(Json(TradeResponse {
                attempt_id: outcome.attempt_id,
                direction: outcome.direction,
                trade_tx: outcome.trade_tx,
                approvals: outcome.approvals,
            }))
        }
        Err(err) => {
            state
                .metrics
                .trades_failed
                .with_label_values(&[&direction])
                .inc();
            journal_attempt(&state, &intent, attempt_id, None, Some(&err)).await;
            Err(err.into())
        }
    }
}

/// Validate and submit a factory deployment.
pub async fn deploy(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<DeployResponse>, ApiError> {
    check_submissions_enabled(&state)?;
    let _guard = state.submission_lock.lock().await;

    let deployer = ReactorDeployer::new(
        Arc::clone(&state.chain),
        state.wallet,
        state.addresses.factory,
        state.deploy_defaults.clone(),
    );

    let outcome = deployer.deploy(&request).await.map_err(ApiError::from)?;
    state.metrics.deploys_submitted.inc();
    Ok(Json(DeployResponse { attempt_id: outcome.attempt_id, tx: outcome.tx }))
}

fn check_submissions_enabled(state: &AppState) -> Result<(), ApiError> {
    if state.dry_run {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "dry-run mode enabled — submissions disabled",
        ));
    }
    if state.limiter.check().is_err() {
        return Err(ApiError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "submission rate limit exceeded",
        ));
    }
    Ok(())
}

/// Journal the attempt; a journaling failure must not fail the response.
async fn journal_attempt(
    state: &AppState,
    intent: &TradeIntent,
    attempt_id: Uuid,
    outcome: Option<&TradeOutcome>,
    error: Option<&TradeError>,
) {
    // Re-resolve for the scaled amounts; a validation failure leaves the
    // raw input in the record instead.
    let resolved = intent.resolve(&state.wallet).ok();
    let record = TradeRecord {
        id: attempt_id,
        direction: intent.direction.to_string(),
        amount_wad: resolved
            .as_ref()
            .map_or_else(|| intent.amount.clone(), |r| r.amount.to_string()),
        reserve_amount_wad: resolved
            .as_ref()
            .map(|r| r.reserve_amount.to_string()),
        receiver: resolved
            .as_ref()
            .map_or_else(String::new, |r| r.receiver.to_string()),
        trade_tx: outcome.map(|o| o.trade_tx.to_string()),
        approval_txs: outcome
            .map(|o| o.approvals.iter().map(ToString::to_string).collect())
            .unwrap_or_default(),
        status: if outcome.is_some() { "confirmed" } else { "failed" }.to_string(),
        error: error.map(ToString::to_string),
        finished_at: Utc::now(),
    };
    if let Err(e) = state.journal.append(&record).await {
        warn!(error = %e, "Failed to journal trade attempt");
    }
}
