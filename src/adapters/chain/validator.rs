//! Contract Validator — On-chain Verification at Startup
//!
//! Validates that configured contract addresses point to actual deployed
//! contracts on the target chain before the gateway starts serving.
//! This prevents configuration errors from causing silent failures
//! at runtime.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::Provider;
use alloy::transports::http::reqwest::Client;
use alloy::transports::http::Http;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use super::reactor::ChainAddresses;

/// Result of validating a single contract.
#[derive(Debug)]
pub struct ValidationResult {
    /// Contract name for logging.
    pub name: &'static str,
    /// Address that was validated.
    pub address: Address,
    /// Whether the contract has deployed code.
    pub has_code: bool,
}

/// Validates contract addresses against on-chain state.
///
/// Called once at startup. Ensures all configured addresses are real
/// contracts (not EOAs or typos) to prevent runtime surprises.
pub struct ContractValidator {
    provider: Arc<dyn Provider<Http<Client>> + Send + Sync>,
}

impl ContractValidator {
    pub fn new(provider: Arc<dyn Provider<Http<Client>> + Send + Sync>) -> Self {
        Self { provider }
    }

    /// Validate every configured contract.
    ///
    /// The reactor is critical: missing code there is a hard error.
    /// The rest log warnings so a partially deployed chain can still be
    /// inspected read-only.
    #[instrument(skip_all)]
    pub async fn validate_all(&self, addresses: &ChainAddresses) -> Result<Vec<ValidationResult>> {
        let mut contracts = vec![
            ("reactor", addresses.reactor),
            ("stable coin", addresses.stable_coin),
            ("reserve coin", addresses.reserve_coin),
            ("oracle", addresses.oracle),
        ];
        if let Some(factory) = addresses.factory {
            contracts.push(("factory", factory));
        }

        let mut results = Vec::new();
        for (name, address) in contracts {
            let result = self.validate_contract(name, address).await?;

            if result.has_code {
                info!(contract = name, address = %address, "Contract validated: code exists on-chain");
            } else {
                warn!(
                    contract = name,
                    address = %address,
                    "Contract has no code — possible misconfiguration"
                );
            }

            results.push(result);
        }

        // Fail hard if the reactor has no code (critical contract)
        if let Some(reactor) = results.first() {
            if !reactor.has_code {
                anyhow::bail!(
                    "Reactor at {} has no deployed code — cannot proceed",
                    addresses.reactor
                );
            }
        }

        info!(validated = results.len(), "All contract validations complete");
        Ok(results)
    }

    async fn validate_contract(
        &self,
        name: &'static str,
        address: Address,
    ) -> Result<ValidationResult> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code for {name}"))?;

        Ok(ValidationResult {
            name,
            address,
            has_code: !code.is_empty(),
        })
    }
}
