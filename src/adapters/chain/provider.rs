//! EVM RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to the configured chain via alloy-rs.
//! Validates RPC connectivity and the chain ID at startup and exposes a
//! shared provider instance for all on-chain operations.
//!
//! When `GATEWAY_PRIVATE_KEY` is present in the environment, the provider
//! carries a local signer and the gateway can submit transactions; without
//! it the gateway runs read-only. The key never appears in config files or
//! logs.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a complex
//! filler type. We store it as a type-erased `dyn Provider` to keep
//! the API clean across the adapter layer.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Client;
use alloy::transports::http::Http;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::config::ChainConfig;
use crate::domain::wallet::WalletContext;

/// Environment variable holding the signing key.
pub const PRIVATE_KEY_ENV: &str = "GATEWAY_PRIVATE_KEY";

/// Shared RPC provider backed by alloy-rs 0.9.
///
/// All chain adapters share a single provider instance to avoid
/// redundant connections and enable connection pooling.
pub struct EvmProvider {
    /// The alloy HTTP provider (type-erased).
    provider: Arc<dyn Provider<Http<Client>> + Send + Sync>,
    /// Chain ID confirmed against the node at startup.
    chain_id: u64,
    /// Address of the local signer, when one is configured.
    sender: Option<Address>,
}

impl EvmProvider {
    /// Connect to the configured RPC endpoint and validate the chain ID.
    ///
    /// The endpoint comes from `config.toml` (never hardcoded); the
    /// signing key, if any, from the environment.
    #[instrument(skip_all)]
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let url = config.rpc_url.parse().context("Invalid RPC URL")?;

        let (provider, sender): (Arc<dyn Provider<Http<Client>> + Send + Sync>, Option<Address>) =
            match std::env::var(PRIVATE_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => {
                    let signer: PrivateKeySigner = key
                        .trim()
                        .parse()
                        .context("Invalid GATEWAY_PRIVATE_KEY")?;
                    let sender = signer.address();
                    let wallet = EthereumWallet::from(signer);
                    (
                        Arc::new(ProviderBuilder::new().wallet(wallet).on_http(url)),
                        Some(sender),
                    )
                }
                _ => {
                    warn!("GATEWAY_PRIVATE_KEY not set — read-only mode, submissions disabled");
                    (Arc::new(ProviderBuilder::new().on_http(url)), None)
                }
            };

        // Validate chain ID at startup so a misconfigured endpoint fails
        // here, not on the first trade.
        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != config.chain_id {
            anyhow::bail!(
                "Expected chain_id={}, node reports {chain_id} — check chain.rpc_url",
                config.chain_id
            );
        }

        info!(chain_id, has_signer = sender.is_some(), "Connected to RPC");

        Ok(Self { provider, chain_id, sender })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider<Http<Client>> + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Local signer address, when submissions are enabled.
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    /// Wallet context derived from the signer state.
    pub fn wallet_context(&self) -> WalletContext {
        match self.sender {
            Some(address) => WalletContext::connected(address, self.chain_id),
            None => WalletContext::read_only(self.chain_id),
        }
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
