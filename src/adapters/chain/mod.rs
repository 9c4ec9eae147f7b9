//! Chain Adapters - EVM Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with an optional local signer
//! - Reactor, token, oracle, and factory contract calls
//! - Fixed gas limits for buys and approvals
//! - Startup validation that configured addresses hold code

pub mod abi;
pub mod gas;
pub mod provider;
pub mod reactor;
pub mod validator;

pub use gas::{GasOracle, GasPolicy};
pub use provider::EvmProvider;
pub use reactor::{ChainAddresses, ReactorContracts};
pub use validator::ContractValidator;
