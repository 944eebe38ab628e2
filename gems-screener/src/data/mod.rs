//! Market data module.
//!
//! Provides the per-ticker record shape consumed by the scorers, and the
//! providers that produce it.
//!
//! # Data Sources
//! - **Yahoo** (default): chart + quote-summary HTTP endpoints, no API key
//! - **Snapshot**: `<TICKER>.json` files on disk, for reproducible offline runs

mod provider;
mod rate_limiter;
mod snapshot;
mod yahoo;

pub use provider::{DataProvider, ProviderError};
pub use rate_limiter::{shared_limiter, RateLimiter, SharedRateLimiter};
pub use snapshot::SnapshotProvider;
pub use yahoo::YahooAdapter;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Minimum bars a provider must return for a ticker to be usable at all.
pub const MIN_HISTORY_BARS: usize = 50;

/// Bars averaged for the trailing volume figure.
pub const AVG_VOLUME_WINDOW: usize = 20;

// ============================================================================
// Core Data Types
// ============================================================================

/// A single daily candlestick (OHLCV)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Get the full range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Extract closing prices from a series.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Extract volumes from a series.
pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

/// Fundamental ratios for one company.
///
/// Every field is optional: `None` means the source had no value. Percent
/// fields (`roe`, margins, growth) are already scaled to 0–100; `debt_equity`
/// is a plain ratio (1.0 = equal debt and equity).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub peg_ratio: Option<f64>,
    /// Return on equity (%)
    #[serde(default)]
    pub roe: Option<f64>,
    /// Return on assets (%)
    #[serde(default)]
    pub roa: Option<f64>,
    #[serde(default)]
    pub debt_equity: Option<f64>,
    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
    #[serde(default)]
    pub operating_margin: Option<f64>,
    #[serde(default)]
    pub gross_margin: Option<f64>,
    #[serde(default)]
    pub price_to_book: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    /// Revenue growth YoY (%)
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    /// Earnings growth YoY (%)
    #[serde(default)]
    pub earnings_growth: Option<f64>,
    /// Trailing free cash flow (currency units)
    #[serde(default)]
    pub free_cash_flow: Option<f64>,
    /// Trailing operating cash flow (currency units)
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
}

impl FundamentalSnapshot {
    /// YoY EPS growth (%): earnings growth when present and non-zero, else
    /// revenue growth as a proxy.
    pub fn eps_growth_yoy(&self) -> Option<f64> {
        self.earnings_growth
            .filter(|g| *g != 0.0 && g.is_finite())
            .or_else(|| self.revenue_growth.filter(|g| *g != 0.0 && g.is_finite()))
    }

    /// Three-year EPS growth approximated as `yoy * factor`, only for positive YoY growth.
    pub fn eps_growth_3y(&self, proxy_factor: f64) -> Option<f64> {
        self.eps_growth_yoy()
            .filter(|g| *g > 0.0)
            .map(|g| g * proxy_factor)
    }

    /// Free cash flow yield (%) against a market cap, falling back to
    /// operating cash flow when free cash flow is missing or not positive.
    pub fn fcf_yield(&self, market_cap: Option<f64>) -> Option<f64> {
        let cap = market_cap.filter(|c| *c > 0.0)?;
        self.free_cash_flow
            .filter(|f| *f > 0.0)
            .or_else(|| self.operating_cash_flow.filter(|f| *f > 0.0))
            .map(|cash| cash / cap * 100.0)
    }
}

/// Direction of an insider transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsiderTransactionKind {
    Buy,
    Sell,
    Other,
}

impl InsiderTransactionKind {
    /// Classify a free-text transaction description.
    pub fn from_description(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("purchase") || lower.contains("buy") {
            Self::Buy
        } else if lower.contains("sale") || lower.contains("sell") {
            Self::Sell
        } else {
            Self::Other
        }
    }
}

/// One reported insider transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderTransaction {
    pub date: NaiveDate,
    #[serde(default)]
    pub shares: Option<f64>,
    pub kind: InsiderTransactionKind,
}

/// Raw provider metadata used for bonus signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Institutional ownership (%)
    #[serde(default)]
    pub institutional_pct: Option<f64>,
    /// Short interest as a share of float (%)
    #[serde(default)]
    pub short_interest_pct: Option<f64>,
    #[serde(default)]
    pub insider_transactions: Vec<InsiderTransaction>,
}

impl ProviderMetadata {
    /// Count insider buys dated within `days` before `as_of` (inclusive).
    pub fn insider_buys_since(&self, as_of: NaiveDate, days: i64) -> usize {
        let start = as_of - Duration::days(days);
        self.insider_transactions
            .iter()
            .filter(|t| t.kind == InsiderTransactionKind::Buy)
            .filter(|t| t.date >= start && t.date <= as_of)
            .count()
    }
}

/// Everything known about one ticker for a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub ticker: String,
    /// Latest close
    pub price: f64,
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Trailing 20-bar mean volume
    pub avg_volume: f64,
    #[serde(default = "default_unknown")]
    pub sector: String,
    #[serde(default = "default_unknown")]
    pub industry: String,
    /// Daily bars, oldest first
    pub history: Vec<Candle>,
    #[serde(default)]
    pub fundamentals: Option<FundamentalSnapshot>,
    #[serde(default)]
    pub metadata: ProviderMetadata,
}

fn default_unknown() -> String {
    "Unknown".into()
}

impl MarketRecord {
    /// Build a record from a bar history, deriving price and average volume.
    ///
    /// Returns `None` when the history is shorter than [`MIN_HISTORY_BARS`].
    pub fn from_history(
        ticker: impl Into<String>,
        mut history: Vec<Candle>,
        market_cap: Option<f64>,
    ) -> Option<Self> {
        if history.len() < MIN_HISTORY_BARS {
            return None;
        }
        history.sort_by_key(|c| c.timestamp);
        let price = history.last()?.close;
        let avg_volume = trailing_average_volume(&history, AVG_VOLUME_WINDOW);

        Some(Self {
            ticker: ticker.into(),
            price,
            market_cap,
            avg_volume,
            sector: default_unknown(),
            industry: default_unknown(),
            history,
            fundamentals: None,
            metadata: ProviderMetadata::default(),
        })
    }

    /// Date of the most recent bar.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.history.last().map(|c| c.timestamp.date_naive())
    }

    pub fn closes(&self) -> Vec<f64> {
        closes(&self.history)
    }
}

/// Mean volume over the last `window` bars (fewer if the series is shorter).
pub fn trailing_average_volume(candles: &[Candle], window: usize) -> f64 {
    let start = candles.len().saturating_sub(window);
    let tail = &candles[start..];
    if tail.is_empty() {
        return 0.0;
    }
    tail.iter().map(|c| c.volume).sum::<f64>() / tail.len() as f64
}
