//! Transaction Submitter Port - On-chain Write Interface
//!
//! Covers the three submission kinds the gateway performs — ERC-20
//! approvals, reactor trades, and factory deployments — plus the
//! confirmation wait. Submission returns immediately with an opaque
//! handle; `await_confirmation` is the suspend point that resolves once
//! a receipt is observed. There is no timeout and no cancellation path:
//! once submitted, a transaction's fate is decided externally.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::domain::deploy::DeployParams;
use crate::domain::intent::{ReactorCall, TxHandle};

/// Outcome of a confirmation wait.
#[derive(Debug, Clone)]
pub struct TxReceiptInfo {
    /// Handle of the confirmed transaction.
    pub handle: TxHandle,
    /// Block the transaction landed in, when reported.
    pub block_number: Option<u64>,
    /// False when the transaction reverted.
    pub succeeded: bool,
}

/// Trait for submitting signed transactions.
#[async_trait]
pub trait TxSubmitter: Send + Sync + 'static {
    /// Submit `approve(spender, amount)` on `token`.
    ///
    /// The amount is always the exact amount required by the pending
    /// trade — never an unlimited approval.
    async fn submit_approval(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> anyhow::Result<TxHandle>;

    /// Submit one of the five reactor trade calls.
    async fn submit_trade(&self, call: &ReactorCall) -> anyhow::Result<TxHandle>;

    /// Submit a `deployReactor` call to the factory.
    async fn submit_deploy(&self, params: &DeployParams) -> anyhow::Result<TxHandle>;

    /// Wait until a receipt for `handle` is observed. Never times out.
    async fn await_confirmation(&self, handle: &TxHandle) -> anyhow::Result<TxReceiptInfo>;
}
