//! Reactor Deployer - Validated Factory Deployment
//!
//! Validates a deployment request in full before anything is submitted,
//! then issues the single `deployReactor` factory call and waits for its
//! receipt. A chain without a configured factory rejects the request as
//! an unsupported network — before validation of the remaining fields,
//! matching the original flow.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::deploy::{DeployDefaults, DeployRequest};
use crate::domain::error::{TradeError, ValidationError};
use crate::domain::intent::TxHandle;
use crate::domain::wallet::WalletContext;
use crate::ports::tx_submitter::TxSubmitter;

/// Result of a confirmed deployment.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub attempt_id: Uuid,
    pub tx: TxHandle,
}

/// Submits validated deployments through the factory contract.
pub struct ReactorDeployer<S> {
    submitter: Arc<S>,
    wallet: WalletContext,
    /// Factory address for the active chain, when one is deployed there.
    factory: Option<Address>,
    defaults: DeployDefaults,
}

impl<S: TxSubmitter> ReactorDeployer<S> {
    pub fn new(
        submitter: Arc<S>,
        wallet: WalletContext,
        factory: Option<Address>,
        defaults: DeployDefaults,
    ) -> Self {
        Self { submitter, wallet, factory, defaults }
    }

    /// Validate and deploy. No transaction leaves this method unless the
    /// request passed every check.
    #[instrument(skip(self, request), fields(stablecoin = %request.stablecoin_name))]
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome, TradeError> {
        self.wallet.ensure_connected()?;

        if self.factory.filter(|a| *a != Address::ZERO).is_none() {
            return Err(ValidationError::UnsupportedNetwork {
                chain_id: self.wallet.chain_id,
            }
            .into());
        }

        let params = request.validate(&self.defaults)?;

        let handle = self
            .submitter
            .submit_deploy(&params)
            .await
            .map_err(|e| TradeError::CallRejected(e.to_string()))?;
        info!(tx = %handle, "deployment submitted");

        let receipt = self
            .submitter
            .await_confirmation(&handle)
            .await
            .map_err(|e| TradeError::Confirmation(e.to_string()))?;
        if !receipt.succeeded {
            return Err(TradeError::Reverted(receipt.handle));
        }

        info!(tx = %receipt.handle, "deployment confirmed");
        Ok(DeployOutcome { attempt_id: Uuid::new_v4(), tx: receipt.handle })
    }
}
