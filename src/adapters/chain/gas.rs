//! Gas Policy and Oracle
//!
//! Two concerns: the fixed gas limits attached to outgoing submissions,
//! and a lightweight gas-price oracle feeding the metrics gauge.
//!
//! Mint (buy) trades carry an explicit 8M gas limit and approvals 100K;
//! redeem trades leave estimation to the node. The limits are config
//! overridable but the defaults match the reactor's observed needs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::config::GasConfig;
use crate::domain::intent::ReactorCall;

use super::provider::EvmProvider;

/// Fixed gas limits for outgoing submissions.
#[derive(Debug, Clone, Copy)]
pub struct GasPolicy {
    buy_gas_limit: u64,
    approve_gas_limit: u64,
}

impl GasPolicy {
    pub fn new(config: &GasConfig) -> Self {
        Self {
            buy_gas_limit: config.buy_gas_limit,
            approve_gas_limit: config.approve_gas_limit,
        }
    }

    /// Explicit gas limit for a trade call, if the direction carries one.
    pub fn trade_gas(&self, call: &ReactorCall) -> Option<u64> {
        call.is_buy().then_some(self.buy_gas_limit)
    }

    /// Gas limit for ERC-20 approvals.
    pub fn approve_gas(&self) -> u64 {
        self.approve_gas_limit
    }
}

/// Gas price oracle for observability.
///
/// Caches the last reading for quick access between polls; nothing in
/// the submission path depends on it.
pub struct GasOracle {
    provider: Arc<EvmProvider>,
    /// Cached gas price in gwei × 100 (for atomic integer ops).
    cached_gas_x100: AtomicU64,
}

impl GasOracle {
    pub fn new(provider: Arc<EvmProvider>) -> Self {
        Self {
            provider,
            cached_gas_x100: AtomicU64::new(0),
        }
    }

    /// Get the current gas price in gwei from the RPC node.
    #[instrument(skip(self))]
    pub async fn current_gas_gwei(&self) -> Result<f64> {
        let gas_price = self
            .provider
            .inner()
            .get_gas_price()
            .await
            .context("Failed to query gas price")?;

        // Convert wei to gwei (1 gwei = 1e9 wei)
        let gwei = gas_price as f64 / 1_000_000_000.0;

        self.cached_gas_x100
            .store((gwei * 100.0) as u64, Ordering::Relaxed);

        debug!(gas_gwei = gwei, "Gas price updated");
        Ok(gwei)
    }

    /// Get cached gas price without an RPC call (fast path).
    pub fn cached_gas_gwei(&self) -> f64 {
        self.cached_gas_x100.load(Ordering::Relaxed) as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256};

    use super::*;

    fn policy() -> GasPolicy {
        GasPolicy::new(&GasConfig::default())
    }

    #[test]
    fn test_buys_carry_explicit_gas_limit() {
        let receiver = Address::repeat_byte(0x01);
        let buy = ReactorCall::BuyStablecoins {
            receiver,
            fee_ui: U256::ZERO,
            ui_address: receiver,
            amount: U256::from(1u64),
        };
        assert_eq!(policy().trade_gas(&buy), Some(8_000_000));
    }

    #[test]
    fn test_redeems_let_the_node_estimate() {
        let receiver = Address::repeat_byte(0x01);
        let sell = ReactorCall::SellReserveCoins {
            amount: U256::from(1u64),
            receiver,
            fee_ui: U256::ZERO,
            ui_address: receiver,
        };
        assert_eq!(policy().trade_gas(&sell), None);
        assert_eq!(policy().approve_gas(), 100_000);
    }
}
