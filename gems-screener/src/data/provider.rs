//! Data provider abstraction.
//!
//! Defines the `DataProvider` trait implemented by every market data source
//! the scan engine can pull from.

use async_trait::async_trait;
use thiserror::Error;

use super::{Candle, MarketRecord};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to data providers.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),
    /// Authentication error (cookie/crumb rejected)
    #[error("Authentication error: {0}")]
    Auth(String),
    /// Rate limit exceeded
    #[error("Rate limited{}", retry_suffix(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },
    /// Data not available for the requested symbol
    #[error("Data not available: {0}")]
    DataNotAvailable(String),
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Internal provider error (bad payload, I/O)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn retry_suffix(retry_after_secs: &Option<u64>) -> String {
    retry_after_secs
        .map(|secs| format!(", retry after {} seconds", secs))
        .unwrap_or_default()
}

impl ProviderError {
    /// Check if the error is recoverable (worth retrying)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }

    /// Suggested wait before retrying, in seconds.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => *secs,
            _ => 1,
        }
    }
}

// ============================================================================
// Data Provider Trait
// ============================================================================

/// Trait for market data providers.
///
/// Implementations perform all I/O for a ticker up front and hand back an
/// immutable [`MarketRecord`]; scoring never calls back into the provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Get the provider name (e.g., "yahoo", "snapshot")
    fn name(&self) -> &'static str;

    /// Fetch price history, fundamentals and ownership metadata for a ticker.
    ///
    /// Returns `DataNotAvailable` when fewer than
    /// [`MIN_HISTORY_BARS`](super::MIN_HISTORY_BARS) bars exist.
    async fn fetch_record(&self, ticker: &str) -> Result<MarketRecord, ProviderError>;

    /// Fetch roughly one year of daily bars for a benchmark index.
    async fn fetch_index_history(&self, symbol: &str) -> Result<Vec<Candle>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_recoverable() {
        assert!(ProviderError::Network("timeout".into()).is_recoverable());
        assert!(ProviderError::RateLimited {
            retry_after_secs: Some(60)
        }
        .is_recoverable());
        assert!(!ProviderError::Auth("invalid crumb".into()).is_recoverable());
        assert!(!ProviderError::DataNotAvailable("no data".into()).is_recoverable());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::RateLimited {
            retry_after_secs: Some(2),
        };
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
        let err = ProviderError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(err.to_string(), "Rate limited");
        assert_eq!(
            ProviderError::DataNotAvailable("XYZ".into()).to_string(),
            "Data not available: XYZ"
        );
    }

    #[test]
    fn test_retry_after_secs() {
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_secs: Some(5)
            }
            .retry_after_secs(),
            5
        );
        assert_eq!(ProviderError::Network("x".into()).retry_after_secs(), 1);
    }
}
