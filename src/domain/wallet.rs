//! Explicit wallet context.
//!
//! The connected account is threaded through as a value, never read from
//! ambient state. A gateway started without a signing key runs read-only:
//! `connected` is false and every submission path fails before reaching
//! the chain.

use alloy::primitives::Address;
use serde::Serialize;

use super::error::TradeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalletContext {
    pub address: Address,
    pub chain_id: u64,
    pub connected: bool,
}

impl WalletContext {
    pub fn connected(address: Address, chain_id: u64) -> Self {
        Self { address, chain_id, connected: true }
    }

    /// Context for a gateway without a signer. Reads work, writes do not.
    pub fn read_only(chain_id: u64) -> Self {
        Self { address: Address::ZERO, chain_id, connected: false }
    }

    pub fn ensure_connected(&self) -> Result<(), TradeError> {
        if self.connected {
            Ok(())
        } else {
            Err(TradeError::WalletNotConnected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_context_blocks_submission() {
        let wallet = WalletContext::read_only(2001);
        assert!(matches!(
            wallet.ensure_connected(),
            Err(TradeError::WalletNotConnected)
        ));
        assert!(WalletContext::connected(Address::repeat_byte(1), 2001)
            .ensure_connected()
            .is_ok());
    }
}
