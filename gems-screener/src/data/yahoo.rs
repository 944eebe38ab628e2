//! Yahoo Finance adapter.
//!
//! # Endpoints
//! - `v8/finance/chart` - one year of daily OHLCV bars
//! - `v10/finance/quoteSummary` - fundamentals, ownership, short interest,
//!   insider transactions
//!
//! The quote-summary endpoint requires a session cookie plus a "crumb"
//! token. Both are obtained once per adapter and reused for every ticker.
//!
//! # Rate Limits
//! Undocumented. Requests are throttled proactively through a shared
//! token bucket (default 120/min).

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::provider::{DataProvider, ProviderError};
use super::rate_limiter::{shared_limiter, SharedRateLimiter};
use super::{
    Candle, FundamentalSnapshot, InsiderTransaction, InsiderTransactionKind, MarketRecord,
    ProviderMetadata,
};

// ============================================================================
// Constants
// ============================================================================

const CHART_API_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const SUMMARY_API_BASE: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Any Yahoo page that sets the consent cookie
const COOKIE_URL: &str = "https://fc.yahoo.com";

const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile,insiderTransactions";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const DEFAULT_RATE_LIMIT_RPM: u32 = 120;

const RATE_LIMIT_RETRY_SECS: u64 = 5;

// ============================================================================
// Chart Response
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Zip the parallel chart arrays into candles, dropping bars with gaps.
fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<Vec<Candle>, ProviderError> {
    if let Some(err) = envelope.chart.error.filter(|e| !e.is_null()) {
        return Err(ProviderError::DataNotAvailable(format!("{}: {}", symbol, err)));
    }
    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::DataNotAvailable(format!("{}: empty chart", symbol)))?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut candles = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };
        let Some(timestamp) = Utc.timestamp_opt(*ts, 0).single() else {
            continue;
        };
        candles.push(Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume: field(&quote.volume).unwrap_or(0.0),
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    Ok(candles)
}

// ============================================================================
// Quote Summary Parsing
// ============================================================================

/// Read `module.field.raw` (or a bare number) from a quote-summary result.
fn raw(summary: &Value, module: &str, field: &str) -> Option<f64> {
    let value = summary.get(module)?.get(field)?;
    value
        .get("raw")
        .and_then(Value::as_f64)
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}

fn text(summary: &Value, module: &str, field: &str) -> Option<String> {
    summary
        .get(module)?
        .get(field)?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn percent(v: Option<f64>) -> Option<f64> {
    v.map(|x| x * 100.0)
}

fn parse_fundamentals(summary: &Value) -> FundamentalSnapshot {
    FundamentalSnapshot {
        pe_ratio: raw(summary, "summaryDetail", "trailingPE")
            .or_else(|| raw(summary, "summaryDetail", "forwardPE")),
        peg_ratio: raw(summary, "defaultKeyStatistics", "pegRatio"),
        roe: percent(raw(summary, "financialData", "returnOnEquity")),
        roa: percent(raw(summary, "financialData", "returnOnAssets")),
        // Yahoo reports D/E as a percentage
        debt_equity: raw(summary, "financialData", "debtToEquity").map(|v| v / 100.0),
        eps: raw(summary, "defaultKeyStatistics", "trailingEps"),
        profit_margin: percent(raw(summary, "financialData", "profitMargins")),
        operating_margin: percent(raw(summary, "financialData", "operatingMargins")),
        gross_margin: percent(raw(summary, "financialData", "grossMargins")),
        price_to_book: raw(summary, "defaultKeyStatistics", "priceToBook"),
        dividend_yield: percent(raw(summary, "summaryDetail", "dividendYield")),
        beta: raw(summary, "summaryDetail", "beta"),
        revenue_growth: percent(raw(summary, "financialData", "revenueGrowth")),
        earnings_growth: percent(raw(summary, "financialData", "earningsGrowth")),
        free_cash_flow: raw(summary, "financialData", "freeCashflow"),
        operating_cash_flow: raw(summary, "financialData", "operatingCashflow"),
    }
}

fn parse_metadata(summary: &Value) -> ProviderMetadata {
    let insider_transactions = summary
        .get("insiderTransactions")
        .and_then(|m| m.get("transactions"))
        .and_then(Value::as_array)
        .map(|txs| {
            txs.iter()
                .filter_map(|tx| {
                    let secs = tx.get("startDate")?.get("raw")?.as_i64()?;
                    let date = DateTime::<Utc>::from_timestamp(secs, 0)?.date_naive();
                    let description = tx
                        .get("transactionText")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    Some(InsiderTransaction {
                        date,
                        shares: tx.get("shares").and_then(|s| s.get("raw")).and_then(Value::as_f64),
                        kind: InsiderTransactionKind::from_description(description),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ProviderMetadata {
        institutional_pct: percent(raw(summary, "defaultKeyStatistics", "heldPercentInstitutions")),
        short_interest_pct: percent(raw(summary, "defaultKeyStatistics", "shortPercentOfFloat")),
        insider_transactions,
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter.
pub struct YahooAdapter {
    client: reqwest::Client,
    crumb: OnceCell<String>,
    rate_limiter: SharedRateLimiter,
}

impl YahooAdapter {
    /// Create an adapter with the default rate limit and a 30s timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_settings(DEFAULT_RATE_LIMIT_RPM, 30)
    }

    /// Create with a custom rate limit and request timeout.
    pub fn with_settings(rate_limit_rpm: u32, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            crumb: OnceCell::new(),
            rate_limiter: shared_limiter("yahoo", rate_limit_rpm),
        })
    }

    /// Create from config
    pub fn from_config(config: &gems_common::Config) -> Result<Self, ProviderError> {
        Self::with_settings(config.data.rate_limit_rpm, config.data.timeout_secs)
    }

    fn map_send_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Network("Request timeout".into())
        } else if e.is_connect() {
            ProviderError::Network("Connection failed".into())
        } else {
            ProviderError::Network(e.to_string())
        }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        self.rate_limiter.acquire().await;
        debug!(url = %url, "Requesting Yahoo endpoint");

        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Auth("cookie or crumb rejected".into()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: Some(RATE_LIMIT_RETRY_SECS),
            });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::DataNotAvailable(format!("HTTP 404 for {}", url)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Internal(format!("HTTP {}: {}", status, body)));
        }

        Ok(response)
    }

    async fn crumb(&self) -> Result<&str, ProviderError> {
        self.crumb
            .get_or_try_init(|| async {
                // Sets the session cookie; the page itself answers 404.
                self.rate_limiter.acquire().await;
                match self.client.get(COOKIE_URL).send().await {
                    Ok(response) => debug!(status = %response.status(), "Yahoo cookie page answered"),
                    Err(e) => warn!(error = %e, "Yahoo cookie request failed, crumb may be rejected"),
                }

                let crumb = self
                    .get(CRUMB_URL)
                    .await?
                    .text()
                    .await
                    .map_err(|e| ProviderError::Internal(format!("Failed to read crumb: {}", e)))?;
                let crumb = crumb.trim().to_string();
                if crumb.is_empty() || crumb.contains('<') {
                    return Err(ProviderError::Auth("empty crumb".into()));
                }
                debug!("Obtained Yahoo crumb");
                Ok(crumb)
            })
            .await
            .map(String::as_str)
    }

    async fn fetch_chart(&self, symbol: &str) -> Result<Vec<Candle>, ProviderError> {
        let url = format!("{}/{}?range=1y&interval=1d", CHART_API_BASE, symbol);
        let envelope: ChartEnvelope = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("Failed to parse chart: {}", e)))?;
        parse_chart(symbol, envelope)
    }

    async fn fetch_summary(&self, symbol: &str) -> Result<Value, ProviderError> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{}/{}?modules={}&crumb={}",
            SUMMARY_API_BASE, symbol, SUMMARY_MODULES, crumb
        );
        let body: Value = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("Failed to parse summary: {}", e)))?;

        body.get("quoteSummary")
            .and_then(|q| q.get("result"))
            .and_then(Value::as_array)
            .and_then(|r| r.first())
            .cloned()
            .ok_or_else(|| ProviderError::DataNotAvailable(format!("{}: empty summary", symbol)))
    }
}

#[async_trait]
impl DataProvider for YahooAdapter {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_record(&self, ticker: &str) -> Result<MarketRecord, ProviderError> {
        let history = self.fetch_chart(ticker).await?;
        let bars = history.len();

        let summary = match self.fetch_summary(ticker).await {
            Ok(summary) => Some(summary),
            Err(ProviderError::DataNotAvailable(msg)) => {
                warn!(ticker = ticker, reason = %msg, "No quote summary");
                None
            }
            Err(e) => return Err(e),
        };

        let market_cap = summary.as_ref().and_then(|s| {
            raw(s, "price", "marketCap").or_else(|| raw(s, "summaryDetail", "marketCap"))
        });

        let mut record = MarketRecord::from_history(ticker, history, market_cap).ok_or_else(|| {
            ProviderError::DataNotAvailable(format!("{} has only {} bars", ticker, bars))
        })?;

        if let Some(summary) = summary {
            record.sector = text(&summary, "assetProfile", "sector").unwrap_or(record.sector);
            record.industry = text(&summary, "assetProfile", "industry").unwrap_or(record.industry);
            record.fundamentals = Some(parse_fundamentals(&summary));
            record.metadata = parse_metadata(&summary);
        }

        Ok(record)
    }

    async fn fetch_index_history(&self, symbol: &str) -> Result<Vec<Candle>, ProviderError> {
        self.fetch_chart(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_adapter_builds_from_config() {
        let mut config = gems_common::Config::default();
        config.data.timeout_secs = 5;
        let adapter = YahooAdapter::from_config(&config).unwrap();
        assert_eq!(adapter.name(), "yahoo");
        assert!(YahooAdapter::with_settings(60, 10).is_ok());
    }

    #[test]
    fn test_parse_chart_skips_gaps() {
        let envelope: ChartEnvelope = serde_json::from_value(json!({
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": { "quote": [{
                        "open":   [10.0, null, 10.4],
                        "high":   [10.5, 10.6, 10.9],
                        "low":    [9.8, 9.9, 10.1],
                        "close":  [10.2, 10.3, 10.8],
                        "volume": [1000, 1200, null]
                    }]}
                }],
                "error": null
            }
        }))
        .unwrap();

        let candles = parse_chart("ABC", envelope).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].close, 10.8);
        assert_eq!(candles[1].volume, 0.0);
    }

    #[test]
    fn test_parse_chart_error_is_data_not_available() {
        let envelope: ChartEnvelope = serde_json::from_value(json!({
            "chart": { "result": null, "error": { "code": "Not Found" } }
        }))
        .unwrap();
        let err = parse_chart("NOPE", envelope).unwrap_err();
        assert!(matches!(err, ProviderError::DataNotAvailable(_)));
    }

    #[test]
    fn test_parse_fundamentals_scaling() {
        let summary = json!({
            "summaryDetail": { "forwardPE": { "raw": 14.2 }, "beta": { "raw": 1.1 } },
            "defaultKeyStatistics": {
                "pegRatio": { "raw": 0.9 },
                "heldPercentInstitutions": { "raw": 0.62 },
                "shortPercentOfFloat": { "raw": 0.031 }
            },
            "financialData": {
                "returnOnEquity": { "raw": 0.21 },
                "debtToEquity": { "raw": 45.0 },
                "earningsGrowth": { "raw": 0.18 },
                "freeCashflow": { "raw": 5.0e7 }
            }
        });

        let f = parse_fundamentals(&summary);
        assert_eq!(f.pe_ratio, Some(14.2));
        assert_eq!(f.peg_ratio, Some(0.9));
        assert!((f.roe.unwrap() - 21.0).abs() < 1e-9);
        assert!((f.debt_equity.unwrap() - 0.45).abs() < 1e-9);
        assert!((f.earnings_growth.unwrap() - 18.0).abs() < 1e-9);
        assert_eq!(f.revenue_growth, None);

        let m = parse_metadata(&summary);
        assert!((m.institutional_pct.unwrap() - 62.0).abs() < 1e-9);
        assert!((m.short_interest_pct.unwrap() - 3.1).abs() < 1e-9);
        assert!(m.insider_transactions.is_empty());
    }

    #[test]
    fn test_parse_insider_transactions() {
        let summary = json!({
            "insiderTransactions": { "transactions": [
                { "startDate": { "raw": 1717200000 }, "shares": { "raw": 5000 },
                  "transactionText": "Purchase at price 21.50 per share." },
                { "startDate": { "raw": 1717286400 }, "shares": { "raw": 900 },
                  "transactionText": "Sale at price 23.00 per share." },
                { "shares": { "raw": 10 }, "transactionText": "missing date" }
            ]}
        });

        let m = parse_metadata(&summary);
        assert_eq!(m.insider_transactions.len(), 2);
        assert_eq!(m.insider_transactions[0].kind, InsiderTransactionKind::Buy);
        assert_eq!(m.insider_transactions[1].kind, InsiderTransactionKind::Sell);
    }
}
