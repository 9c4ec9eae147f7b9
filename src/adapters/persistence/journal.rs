//! Trade Journal - Append-only JSONL Attempt Records
//!
//! Persists every trade attempt (confirmed or failed) to daily JSONL
//! files named `trades/YYYY-MM-DD.jsonl`. Each line is a self-contained
//! JSON record for easy parsing, streaming, and post-hoc audit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

/// One line of the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Attempt ID from the sequencer.
    pub id: Uuid,
    /// Trade direction, e.g. `mint-stable`, or `deploy`.
    pub direction: String,
    /// Primary amount, 18-decimal scaled integer as string.
    pub amount_wad: String,
    /// Reserve-leg amount for dual redemptions.
    pub reserve_amount_wad: Option<String>,
    /// Recipient of the output tokens.
    pub receiver: String,
    /// Confirmed trade transaction hash, when the attempt succeeded.
    pub trade_tx: Option<String>,
    /// Approval transactions confirmed along the way, in order.
    pub approval_txs: Vec<String>,
    /// `confirmed` or `failed`.
    pub status: String,
    /// Error message for failed attempts.
    pub error: Option<String>,
    /// When the attempt finished.
    pub finished_at: DateTime<Utc>,
}

/// Append-only JSONL journal with daily file rotation.
pub struct TradeJournal {
    trades_dir: PathBuf,
}

impl TradeJournal {
    /// Create a journal rooted in the given data directory.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let trades_dir = Path::new(data_dir).join("trades");
        fs::create_dir_all(&trades_dir)
            .await
            .context("Failed to create trades directory")?;
        Ok(Self { trades_dir })
    }

    /// Append a record to today's file.
    #[instrument(skip(self, record), fields(attempt = %record.id, status = %record.status))]
    pub async fn append(&self, record: &TradeRecord) -> Result<()> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let path = self.trades_dir.join(format!("{date}.jsonl"));

        let mut json =
            serde_json::to_string(record).context("Failed to serialize trade record")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open journal file {}", path.display()))?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to append trade record")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str) -> TradeRecord {
        TradeRecord {
            id: Uuid::new_v4(),
            direction: "mint-stable".to_string(),
            amount_wad: "100000000000000000000".to_string(),
            reserve_amount_wad: None,
            receiver: format!("0x{}", "11".repeat(20)),
            trade_tx: Some(format!("0x{}", "aa".repeat(32))),
            approval_txs: vec![format!("0x{}", "bb".repeat(32))],
            status: status.to_string(),
            error: None,
            finished_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_writes_one_line_per_record() {
        let dir = std::env::temp_dir().join(format!("djed-journal-{}", Uuid::new_v4()));
        let journal = TradeJournal::new(dir.to_str().unwrap()).await.unwrap();

        journal.append(&record("confirmed")).await.unwrap();
        journal.append(&record("failed")).await.unwrap();

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let path = dir.join("trades").join(format!("{date}.jsonl"));
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let parsed: TradeRecord = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.status, "confirmed");

        std::fs::remove_dir_all(dir).ok();
    }
}
