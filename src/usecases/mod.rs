//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the gateway's core workflows. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `TradeSequencer`: Allowance gate + approve-then-trade state machine
//! - `ReactorDeployer`: Validated factory deployments
//! - `ProtocolObserver`: Market snapshots and account portfolios

pub mod deployer;
pub mod observer;
pub mod sequencer;

pub use deployer::ReactorDeployer;
pub use observer::ProtocolObserver;
pub use sequencer::TradeSequencer;
