//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

    validate_config(&config)?;

    info!(
        name = %config.client.name,
        chain_id = config.chain.chain_id,
        reactor = %config.contracts.reactor,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty chain endpoint and valid chain ID
/// - Parseable contract addresses
/// - Positive gas limits and poll intervals
/// - Sensible rate limits
pub fn validate_config(config: &AppConfig) -> Result<()> {
    anyhow::ensure!(
        !config.client.name.trim().is_empty(),
        "client.name must not be empty"
    );

    // Chain validation
    anyhow::ensure!(
        !config.chain.rpc_url.trim().is_empty(),
        "chain.rpc_url must not be empty"
    );
    anyhow::ensure!(config.chain.chain_id > 0, "chain.chain_id must be positive");
    anyhow::ensure!(
        config.chain.confirmation_poll_ms > 0,
        "chain.confirmation_poll_ms must be positive"
    );
    anyhow::ensure!(
        config.chain.snapshot_interval_secs > 0,
        "chain.snapshot_interval_secs must be positive"
    );

    // Contract address validation
    for (name, value) in [
        ("contracts.reactor", &config.contracts.reactor),
        ("contracts.stable_coin", &config.contracts.stable_coin),
        ("contracts.reserve_coin", &config.contracts.reserve_coin),
        ("contracts.oracle", &config.contracts.oracle),
    ] {
        value
            .parse::<Address>()
            .with_context(|| format!("{name} is not a valid address: {value}"))?;
    }
    if let Some(factory) = &config.contracts.factory {
        factory
            .parse::<Address>()
            .with_context(|| format!("contracts.factory is not a valid address: {factory}"))?;
    }

    // Gas validation
    anyhow::ensure!(
        config.gas.buy_gas_limit > 0,
        "gas.buy_gas_limit must be positive"
    );
    anyhow::ensure!(
        config.gas.approve_gas_limit > 0,
        "gas.approve_gas_limit must be positive"
    );

    // Rate limit validation
    anyhow::ensure!(
        config.rate_limits.max_submissions_per_minute > 0
            && config.rate_limits.max_submissions_per_minute <= 600,
        "rate_limits.max_submissions_per_minute must be in (0, 600], got {}",
        config.rate_limits.max_submissions_per_minute
    );

    Ok(())
}
