//! Offline provider backed by JSON snapshot files.
//!
//! Layout:
//! ```text
//! <dir>/<TICKER>.json         MarketRecord
//! <dir>/index/<SYMBOL>.json   [Candle, ...]
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::provider::{DataProvider, ProviderError};
use super::{Candle, MarketRecord, MIN_HISTORY_BARS};

/// Reads pre-fetched records from a directory.
pub struct SnapshotProvider {
    root: PathBuf,
}

impl SnapshotProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, ticker: &str) -> PathBuf {
        self.root.join(format!("{}.json", ticker))
    }

    fn index_path(&self, symbol: &str) -> PathBuf {
        self.root.join("index").join(format!("{}.json", symbol))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, ProviderError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::DataNotAvailable(format!(
                    "no snapshot for {}",
                    what
                )))
            }
            Err(e) => {
                return Err(ProviderError::Internal(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map_err(|e| {
            ProviderError::Internal(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl DataProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch_record(&self, ticker: &str) -> Result<MarketRecord, ProviderError> {
        let path = self.record_path(ticker);
        debug!(ticker = ticker, path = %path.display(), "Loading snapshot record");

        let mut record: MarketRecord = Self::read_json(&path, ticker).await?;
        if record.history.len() < MIN_HISTORY_BARS {
            return Err(ProviderError::DataNotAvailable(format!(
                "{} has {} bars, need {}",
                ticker,
                record.history.len(),
                MIN_HISTORY_BARS
            )));
        }
        record.history.sort_by_key(|c| c.timestamp);
        Ok(record)
    }

    async fn fetch_index_history(&self, symbol: &str) -> Result<Vec<Candle>, ProviderError> {
        let mut candles: Vec<Candle> = Self::read_json(&self.index_path(symbol), symbol).await?;
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}
