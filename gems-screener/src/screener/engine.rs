//! Screener engine module.
//!
//! The central orchestrator for a scan: benchmark and regime first, then
//! every ticker in the universe through fetch → filter → score → decide.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{Candle, DataProvider, MarketRecord, ProviderError};
use crate::market::MarketSelection;

use super::config::ScanConfig;
use super::filter::{FilterResult, FilterStage};
use super::pipeline::{evaluate, Evaluation, ScanContext, ScreenedStock, SkippedTicker};
use super::regime::MarketRegime;

// ============================================================================
// Scan Result
// ============================================================================

/// A fetched ticker excluded before scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredTicker {
    pub ticker: String,
    pub stage: FilterStage,
    pub reason: String,
}

/// Result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Scan ID (timestamp-based)
    pub id: String,
    pub market: MarketSelection,
    pub regime: MarketRegime,
    pub benchmark: String,
    /// Scored stocks, composite score descending
    pub stocks: Vec<ScreenedStock>,
    pub filtered: Vec<FilteredTicker>,
    /// Provider failures and records without fundamentals
    pub skipped: Vec<SkippedTicker>,
    /// Funnel counts per stage
    pub filter_results: Vec<FilterResult>,
    pub total_scanned: usize,
    pub config_summary: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl ScanResult {
    /// Get the top N stocks by composite score.
    pub fn top(&self, n: usize) -> Vec<&ScreenedStock> {
        self.stocks.iter().take(n).collect()
    }

    /// Stocks flagged for deep analysis, in ranking order.
    pub fn deep_analysis_queue(&self) -> Vec<&ScreenedStock> {
        self.stocks
            .iter()
            .filter(|s| s.decision.needs_deep_analysis)
            .collect()
    }

    /// Count of stocks per final action label.
    pub fn action_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for stock in &self.stocks {
            *counts.entry(stock.action_label()).or_insert(0) += 1;
        }
        counts
    }

    /// Stocks whose final label is exactly `label`.
    pub fn with_label(&self, label: &str) -> Vec<&ScreenedStock> {
        self.stocks
            .iter()
            .filter(|s| s.action_label() == label)
            .collect()
    }

    /// Summary string for logging.
    pub fn summary(&self) -> String {
        format!(
            "Scanned {} tickers in {:.1}s ({} market): {} scored, {} filtered, {} skipped, {} queued for deep analysis",
            self.total_scanned,
            self.duration_secs,
            self.regime,
            self.stocks.len(),
            self.filtered.len(),
            self.skipped.len(),
            self.deep_analysis_queue().len()
        )
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

enum TickerOutcome {
    FetchFailed(SkippedTicker),
    Evaluated(Evaluation),
}

/// The main screener engine.
///
/// Orchestrates one scan:
/// 1. Fetch the benchmark and derive the market regime
/// 2. Fetch every ticker with bounded concurrency
/// 3. Filter, score and classify each record
/// 4. Rank by composite score
pub struct ScreenerEngine<P: DataProvider> {
    config: Arc<ScanConfig>,
    provider: Arc<P>,
}

impl<P: DataProvider> ScreenerEngine<P> {
    /// Create a new engine; the configuration is validated here.
    pub fn new(config: Arc<ScanConfig>, provider: Arc<P>) -> Result<Self> {
        config.validate().context("Invalid scan configuration")?;
        Ok(Self { config, provider })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run a full scan over the configured universe.
    pub async fn run(&self) -> Result<ScanResult> {
        let started_at = Utc::now();
        let id = format!("scan_{}", started_at.format("%Y%m%d_%H%M%S"));
        let profile = &self.config.profile;

        info!(
            scan_id = %id,
            market = %profile.selection,
            provider = self.provider.name(),
            universe = profile.universe.len(),
            "Starting scan"
        );

        let (benchmark, regime) = self.load_benchmark().await;
        info!(benchmark = %profile.benchmark, regime = %regime, bars = benchmark.len(), "Market regime");

        let ctx = ScanContext {
            config: &self.config,
            benchmark: &benchmark,
            regime,
        };

        let outcomes: Vec<TickerOutcome> = stream::iter(profile.universe.iter())
            .map(|ticker| self.process_ticker(ticker, &ctx))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut stocks = Vec::new();
        let mut filtered = Vec::new();
        let mut skipped = Vec::new();
        let mut fetch_failures = 0usize;

        for outcome in outcomes {
            match outcome {
                TickerOutcome::FetchFailed(s) => {
                    fetch_failures += 1;
                    skipped.push(s);
                }
                TickerOutcome::Evaluated(Evaluation::Scored(stock)) => stocks.push(*stock),
                TickerOutcome::Evaluated(Evaluation::Filtered { ticker, rejection }) => {
                    filtered.push(FilteredTicker {
                        ticker,
                        stage: rejection.stage,
                        reason: rejection.reason,
                    })
                }
                TickerOutcome::Evaluated(Evaluation::Skipped(s)) => skipped.push(s),
            }
        }

        stocks.sort_by(|a, b| {
            b.composite
                .total_cmp(&a.composite)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        filtered.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        skipped.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        let total_scanned = profile.universe.len();
        let filter_results = funnel(total_scanned, fetch_failures, &filtered, stocks.len());

        let completed_at = Utc::now();
        let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let result = ScanResult {
            id,
            market: profile.selection,
            regime,
            benchmark: profile.benchmark.clone(),
            stocks,
            filtered,
            skipped,
            filter_results,
            total_scanned,
            config_summary: self.config.summary(),
            started_at,
            completed_at,
            duration_secs,
        };

        info!(
            scan_id = %result.id,
            scored = result.stocks.len(),
            filtered = result.filtered.len(),
            skipped = result.skipped.len(),
            duration = format!("{:.1}s", duration_secs),
            "Scan complete"
        );

        Ok(result)
    }

    // ========================================================================
    // Internal Methods
    // ========================================================================

    async fn load_benchmark(&self) -> (Vec<Candle>, MarketRegime) {
        let symbol = &self.config.profile.benchmark;
        match self.provider.fetch_index_history(symbol).await {
            Ok(history) => {
                let regime = MarketRegime::from_benchmark(&history);
                (history, regime)
            }
            Err(e) => {
                warn!(benchmark = %symbol, error = %e, "Benchmark unavailable, assuming bearish regime");
                (Vec::new(), MarketRegime::Bearish)
            }
        }
    }

    async fn process_ticker(&self, ticker: &str, ctx: &ScanContext<'_>) -> TickerOutcome {
        let record = match self.fetch_with_retry(ticker).await {
            Ok(record) => record,
            Err(e) => {
                warn!(ticker, error = %e, "Skipping ticker");
                return TickerOutcome::FetchFailed(SkippedTicker {
                    ticker: ticker.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let evaluation = evaluate(&record, ctx);
        match &evaluation {
            Evaluation::Scored(stock) => {
                debug!(
                    ticker,
                    valuation = stock.valuation.score,
                    bonus = stock.bonus.points,
                    technical = stock.technical.score,
                    composite = stock.composite,
                    "Scored"
                );
                if stock.decision.needs_deep_analysis {
                    info!(ticker, action = %stock.decision.label, "Candidate");
                }
            }
            Evaluation::Filtered { rejection, .. } => {
                debug!(ticker, reason = %rejection, "Filtered");
            }
            Evaluation::Skipped(s) => {
                warn!(ticker, reason = %s.reason, "Skipping ticker");
            }
        }
        TickerOutcome::Evaluated(evaluation)
    }

    async fn fetch_with_retry(&self, ticker: &str) -> Result<MarketRecord, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.provider.fetch_record(ticker).await {
                Ok(record) => return Ok(record),
                Err(e) if e.is_recoverable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let wait = e.retry_after_secs();
                    debug!(ticker, attempt, wait_secs = wait, error = %e, "Retrying fetch");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn funnel(
    input: usize,
    fetch_failures: usize,
    filtered: &[FilteredTicker],
    scored: usize,
) -> Vec<FilterResult> {
    let count = |stage| filtered.iter().filter(|f| f.stage == stage).count();
    let fetched = input.saturating_sub(fetch_failures);
    let after_cap = fetched.saturating_sub(count(FilterStage::MarketCap));
    let after_liquidity = after_cap.saturating_sub(count(FilterStage::Liquidity));

    vec![
        FilterResult::new(FilterStage::Input, input, input),
        FilterResult::new(FilterStage::Fetched, input, fetched),
        FilterResult::new(FilterStage::MarketCap, fetched, after_cap),
        FilterResult::new(FilterStage::Liquidity, after_cap, after_liquidity),
        FilterResult::new(FilterStage::Scored, after_liquidity, scored),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(ticker: &str, stage: FilterStage) -> FilteredTicker {
        FilteredTicker {
            ticker: ticker.into(),
            stage,
            reason: String::new(),
        }
    }

    #[test]
    fn test_funnel_counts() {
        let filtered = vec![
            filtered("A", FilterStage::MarketCap),
            filtered("B", FilterStage::MarketCap),
            filtered("C", FilterStage::Liquidity),
        ];
        let stages = funnel(10, 2, &filtered, 4);
        let passed: Vec<usize> = stages.iter().map(|s| s.passed).collect();
        assert_eq!(passed, vec![10, 8, 6, 5, 4]);
        assert_eq!(stages[4].eliminated, 1);
    }

    #[test]
    fn test_empty_funnel() {
        let stages = funnel(0, 0, &[], 0);
        assert!(stages.iter().all(|s| s.passed == 0 && s.elimination_rate == 0.0));
    }
}
