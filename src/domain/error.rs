//! Error taxonomy for trade and deployment attempts.
//!
//! Validation errors are raised before anything is submitted on-chain.
//! Submission errors carry the node's message verbatim; a gas-ceiling
//! rejection additionally yields a user-facing hint. No error is retried
//! automatically — every failure returns the sequencer to idle and the
//! caller decides whether to try again.

use thiserror::Error;

use super::intent::TxHandle;

/// Hint attached when a rejection indicates the call would exceed the
/// network's gas ceiling. The cap is enforced by the contract design,
/// not by this gateway.
pub const GAS_CEILING_HINT: &str = "this contract function requires more gas \
than the network allows; this is a contract-level limitation, not a gateway \
issue — consider a different network or contact the contract developers";

/// Input validation failures. All of these are caught before any
/// transaction is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must be a non-negative decimal with at most 18 fractional digits")]
    InvalidAmount { field: &'static str },

    #[error("{field} must be a 20-byte hex address")]
    MalformedAddress { field: &'static str },

    #[error("price feed ID must be a 32-byte hex value")]
    MalformedPriceId,

    #[error("critical reserve ratio must be at least 100%")]
    RatioTooLow,

    #[error("unsupported network: no factory deployed for chain {chain_id}")]
    UnsupportedNetwork { chain_id: u64 },
}

/// Failures of a trade or deployment attempt.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("wallet is not connected")]
    WalletNotConnected,

    /// The wallet or node rejected the submission. The message is the
    /// collaborator's, surfaced verbatim.
    #[error("call rejected: {0}")]
    CallRejected(String),

    #[error("transaction {0} reverted on-chain")]
    Reverted(TxHandle),

    #[error("chain read failed: {0}")]
    ReadFailed(String),

    #[error("confirmation watch failed: {0}")]
    Confirmation(String),
}

impl TradeError {
    /// Extra guidance for rejections that name a gas ceiling.
    pub fn gas_ceiling_hint(&self) -> Option<&'static str> {
        match self {
            Self::CallRejected(message)
                if message.contains("gas limit too high")
                    || message.contains("exceeds block gas limit") =>
            {
                Some(GAS_CEILING_HINT)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_ceiling_hint_matches() {
        let err = TradeError::CallRejected("intrinsic gas limit too high (cap 30000000)".into());
        assert!(err.gas_ceiling_hint().is_some());
    }

    #[test]
    fn test_gas_ceiling_hint_absent_for_other_rejections() {
        let err = TradeError::CallRejected("nonce too low".into());
        assert!(err.gas_ceiling_hint().is_none());
        assert!(TradeError::WalletNotConnected.gas_ceiling_hint().is_none());
    }

    #[test]
    fn test_validation_messages_are_user_facing() {
        let err = ValidationError::MalformedAddress { field: "treasury address" };
        assert_eq!(err.to_string(), "treasury address must be a 20-byte hex address");
    }
}
