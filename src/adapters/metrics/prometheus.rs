//! Prometheus Metrics Registry - Gateway Observability
//!
//! Registers and exposes Prometheus metrics for the trade flow and the
//! protocol read surface. All metrics follow the naming convention
//! `djed_gateway_*`.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Centralized Prometheus metrics for the gateway.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Quote estimates served.
    pub quotes_computed: IntCounter,
    /// Approval transactions submitted.
    pub approvals_submitted: IntCounter,
    /// Trades submitted, by direction.
    pub trades_submitted: IntCounterVec,
    /// Trades confirmed, by direction.
    pub trades_confirmed: IntCounterVec,
    /// Failed trade attempts, by direction.
    pub trades_failed: IntCounterVec,
    /// Factory deployments submitted.
    pub deploys_submitted: IntCounter,
    /// Wall-clock spent driving an attempt to a terminal state (seconds).
    pub attempt_duration_seconds: Histogram,
    /// Latest reserve ratio as a percentage.
    pub reserve_ratio_percent: Gauge,
    /// Latest stablecoin price (base-asset units).
    pub sc_price: Gauge,
    /// Latest reserve-coin target price.
    pub rc_target_price: Gauge,
    /// Latest oracle reading.
    pub oracle_price: Gauge,
    /// Current gas price (gwei).
    pub gas_price_gwei: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let quotes_computed = IntCounter::with_opts(Opts::new(
            "djed_gateway_quotes_computed_total",
            "Quote estimates served",
        ))?;

        let approvals_submitted = IntCounter::with_opts(Opts::new(
            "djed_gateway_approvals_submitted_total",
            "Approval transactions submitted",
        ))?;

        let trades_submitted = IntCounterVec::new(
            Opts::new("djed_gateway_trades_submitted_total", "Trades submitted"),
            &["direction"],
        )?;

        let trades_confirmed = IntCounterVec::new(
            Opts::new("djed_gateway_trades_confirmed_total", "Trades confirmed"),
            &["direction"],
        )?;

        let trades_failed = IntCounterVec::new(
            Opts::new("djed_gateway_trades_failed_total", "Failed trade attempts"),
            &["direction"],
        )?;

        let deploys_submitted = IntCounter::with_opts(Opts::new(
            "djed_gateway_deploys_submitted_total",
            "Factory deployments submitted",
        ))?;

        let attempt_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "djed_gateway_attempt_duration_seconds",
                "Time to drive a trade attempt to a terminal state",
            )
            .buckets(vec![0.5, 1.0, 2.0, 5.0, 15.0, 30.0, 60.0, 300.0]),
        )?;

        let reserve_ratio_percent = Gauge::with_opts(Opts::new(
            "djed_gateway_reserve_ratio_percent",
            "Reserve ratio as a percentage",
        ))?;

        let sc_price = Gauge::with_opts(Opts::new(
            "djed_gateway_sc_price",
            "Stablecoin price in base-asset units",
        ))?;

        let rc_target_price = Gauge::with_opts(Opts::new(
            "djed_gateway_rc_target_price",
            "Reserve-coin target price in base-asset units",
        ))?;

        let oracle_price = Gauge::with_opts(Opts::new(
            "djed_gateway_oracle_price",
            "Latest oracle reading",
        ))?;

        let gas_price_gwei = Gauge::with_opts(Opts::new(
            "djed_gateway_gas_price_gwei",
            "Current gas price in gwei",
        ))?;

        registry.register(Box::new(quotes_computed.clone()))?;
        registry.register(Box::new(approvals_submitted.clone()))?;
        registry.register(Box::new(trades_submitted.clone()))?;
        registry.register(Box::new(trades_confirmed.clone()))?;
        registry.register(Box::new(trades_failed.clone()))?;
        registry.register(Box::new(deploys_submitted.clone()))?;
        registry.register(Box::new(attempt_duration_seconds.clone()))?;
        registry.register(Box::new(reserve_ratio_percent.clone()))?;
        registry.register(Box::new(sc_price.clone()))?;
        registry.register(Box::new(rc_target_price.clone()))?;
        registry.register(Box::new(oracle_price.clone()))?;
        registry.register(Box::new(gas_price_gwei.clone()))?;

        Ok(Self {
            registry,
            quotes_computed,
            approvals_submitted,
            trades_submitted,
            trades_confirmed,
            trades_failed,
            deploys_submitted,
            attempt_duration_seconds,
            reserve_ratio_percent,
            sc_price,
            rc_target_price,
            oracle_price,
            gas_price_gwei,
        })
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
