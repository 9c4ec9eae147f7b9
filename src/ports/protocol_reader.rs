//! Protocol Reader Port - On-chain State Interface
//!
//! Read access to the reactor, its tokens, and the oracle. The gateway
//! never caches any of these values itself: allowance and price decisions
//! re-read through this port at decision time, so every comparison uses
//! the latest observed chain state.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

/// Trait for reading reactor and token state via JSON-RPC.
#[async_trait]
pub trait ProtocolReader: Send + Sync + 'static {
    /// Stablecoin price in base-asset units, 18-decimal fixed point.
    async fn sc_price(&self) -> anyhow::Result<U256>;

    /// Reserve-coin target price, 18-decimal fixed point.
    async fn rc_target_price(&self) -> anyhow::Result<U256>;

    /// Reserve ratio, 18-decimal fixed-point multiplier.
    async fn reserve_ratio(&self) -> anyhow::Result<U256>;

    /// Total reserve held by the reactor.
    async fn reserve(&self) -> anyhow::Result<U256>;

    /// Outstanding stablecoin liabilities.
    async fn liabilities(&self) -> anyhow::Result<U256>;

    /// Trading fee, 18-decimal fixed-point fraction.
    async fn trade_fee(&self) -> anyhow::Result<U256>;

    /// Treasury fee, 18-decimal fixed-point fraction.
    async fn treasury_fee(&self) -> anyhow::Result<U256>;

    /// Per-transaction amount limit.
    async fn tx_limit(&self) -> anyhow::Result<U256>;

    /// Address of the base (collateral) token, owned by the reactor.
    async fn base_coin(&self) -> anyhow::Result<Address>;

    /// Latest oracle reading.
    async fn oracle_price(&self) -> anyhow::Result<U256>;

    /// ERC-20 `balanceOf(owner)` on an arbitrary token.
    async fn balance_of(&self, token: Address, owner: Address) -> anyhow::Result<U256>;

    /// ERC-20 `allowance(owner, spender)` on an arbitrary token.
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> anyhow::Result<U256>;

    /// ERC-20 `totalSupply()` on an arbitrary token.
    async fn total_supply(&self, token: Address) -> anyhow::Result<U256>;

    /// Check if the read connection is healthy.
    async fn is_healthy(&self) -> bool;
}
