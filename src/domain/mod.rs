//! Domain layer - Core business logic and models.
//!
//! Pure trade logic for the gateway: WAD fixed-point arithmetic, quote
//! estimation, intent resolution, and deployment validation. No IO happens
//! here (hexagonal architecture inner ring) — every function is a pure
//! mapping over typed values, testable without a chain.

pub mod deploy;
pub mod error;
pub mod intent;
pub mod quote;
pub mod wad;
pub mod wallet;

// Re-export core types for convenience
pub use error::{TradeError, ValidationError};
pub use intent::{
    CoinSymbol, ReactorCall, ResolvedIntent, TradeDirection, TradeIntent, TxHandle,
};
pub use quote::{PriceFeeds, Quote};
pub use wallet::WalletContext;
