//! Persistence Adapters - JSONL-based File Storage
//!
//! Append-only JSONL journal of trade attempts. No database dependency —
//! lightweight and crash-recoverable.

pub mod journal;

pub use journal::{TradeJournal, TradeRecord};
