//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ProtocolReader`: On-chain reads (prices, ratio, balances, allowances)
//! - `TxSubmitter`: Signed submissions (approvals, trades, deployments)

pub mod protocol_reader;
pub mod tx_submitter;
