//! Configuration Module - TOML-based Gateway Configuration
//!
//! Loads and validates configuration from `config.toml`. All contract
//! addresses and chain parameters are externalized here — nothing is
//! hardcoded in the domain layer. The signing key is NOT part of this
//! file; it comes from the `GATEWAY_PRIVATE_KEY` environment variable
//! only.

pub mod loader;

use alloy::primitives::U256;
use serde::Deserialize;

use crate::domain::deploy::DeployDefaults;

/// Top-level gateway configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the gateway begins serving.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Gateway identity and metadata.
    pub client: ClientConfig,
    /// Chain connection parameters.
    pub chain: ChainConfig,
    /// Protocol contract addresses. ALWAYS in config — never hardcoded.
    pub contracts: ContractsConfig,
    /// Operator defaults merged into factory deployments.
    #[serde(default)]
    pub deploy: DeployConfig,
    /// HTTP API server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Fixed gas limits for submissions.
    #[serde(default)]
    pub gas: GasConfig,
    /// Submission rate limiting.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// Trade journal persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Gateway identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Human-readable gateway name.
    pub name: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Disable all submissions; reads and quotes still work.
    #[serde(default)]
    pub dry_run: bool,
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Expected chain ID; validated against the node at startup.
    pub chain_id: u64,
    /// Receipt poll interval while waiting for confirmations (ms).
    #[serde(default = "default_poll_ms")]
    pub confirmation_poll_ms: u64,
    /// Protocol snapshot refresh interval (seconds).
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_secs: u64,
}

/// Protocol contract addresses for the active chain.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// The reactor (protocol) contract.
    pub reactor: String,
    /// Stablecoin token contract.
    pub stable_coin: String,
    /// Reserve coin token contract.
    pub reserve_coin: String,
    /// Price oracle contract.
    pub oracle: String,
    /// Factory contract; absent on chains without one.
    #[serde(default)]
    pub factory: Option<String>,
}

/// Operator defaults for factory deployments.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_reserve_token_name")]
    pub reserve_token_name: String,
    #[serde(default = "default_reserve_token_symbol")]
    pub reserve_token_symbol: String,
    /// Fission (mint) fee, 18-decimal fixed point. Default 0.5%.
    #[serde(default = "default_fee_wad")]
    pub fission_fee_wad: u64,
    /// Fusion (redeem) fee, 18-decimal fixed point. Default 0.5%.
    #[serde(default = "default_fee_wad")]
    pub fusion_fee_wad: u64,
}

impl DeployConfig {
    pub fn to_defaults(&self) -> DeployDefaults {
        DeployDefaults {
            reserve_token_name: self.reserve_token_name.clone(),
            reserve_token_symbol: self.reserve_token_symbol.clone(),
            fission_fee_wad: U256::from(self.fission_fee_wad),
            fusion_fee_wad: U256::from(self.fusion_fee_wad),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            reserve_token_name: default_reserve_token_name(),
            reserve_token_symbol: default_reserve_token_symbol(),
            fission_fee_wad: default_fee_wad(),
            fusion_fee_wad: default_fee_wad(),
        }
    }
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the gateway API (health, metrics, trade routes).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: default_bind_address() }
    }
}

/// Fixed gas limits for submissions.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GasConfig {
    /// Gas limit attached to mint (buy) trades.
    #[serde(default = "default_buy_gas")]
    pub buy_gas_limit: u64,
    /// Gas limit attached to ERC-20 approvals.
    #[serde(default = "default_approve_gas")]
    pub approve_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            buy_gas_limit: default_buy_gas(),
            approve_gas_limit: default_approve_gas(),
        }
    }
}

/// Submission rate limiting configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum trade/deploy submissions per minute across all callers.
    #[serde(default = "default_max_submissions")]
    pub max_submissions_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_submissions_per_minute: default_max_submissions() }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Directory for JSONL trade journals.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

// Default value functions for serde

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_ms() -> u64 {
    2_000
}

fn default_snapshot_interval() -> u64 {
    30
}

fn default_reserve_token_name() -> String {
    "Reserve Coin".to_string()
}

fn default_reserve_token_symbol() -> String {
    "RC".to_string()
}

fn default_fee_wad() -> u64 {
    5_000_000_000_000_000 // 0.005 × 10^18
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_buy_gas() -> u64 {
    8_000_000
}

fn default_approve_gas() -> u64 {
    100_000
}

fn default_max_submissions() -> u32 {
    10
}

fn default_data_dir() -> String {
    "data".to_string()
}
