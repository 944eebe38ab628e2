//! Pre-scoring liquidity filter and funnel bookkeeping.
//!
//! A record must pass the market-cap range and the volume floor before any
//! indicator or scorer runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::MarketRecord;

use super::universe::MarketProfile;

// ============================================================================
// Filter Stage
// ============================================================================

/// Funnel stage, for tracking where tickers drop out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStage {
    /// Tickers in the universe
    Input,
    /// Provider returned a usable record
    Fetched,
    /// Market cap inside the configured range
    MarketCap,
    /// Average volume above the floor
    Liquidity,
    /// Fundamentals present and scored
    Scored,
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "Universe"),
            Self::Fetched => write!(f, "Data available"),
            Self::MarketCap => write!(f, "Market cap"),
            Self::Liquidity => write!(f, "Liquidity"),
            Self::Scored => write!(f, "Scored"),
        }
    }
}

// ============================================================================
// Filter Result
// ============================================================================

/// Outcome counts for one funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub stage: FilterStage,
    pub passed: usize,
    pub eliminated: usize,
    /// Elimination rate (%)
    pub elimination_rate: f64,
}

impl FilterResult {
    pub fn new(stage: FilterStage, input_count: usize, passed_count: usize) -> Self {
        let eliminated = input_count.saturating_sub(passed_count);
        let elimination_rate = if input_count > 0 {
            (eliminated as f64 / input_count as f64) * 100.0
        } else {
            0.0
        };

        Self {
            stage,
            passed: passed_count,
            eliminated,
            elimination_rate,
        }
    }
}

/// Why a fetched record was excluded before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub stage: FilterStage,
    pub reason: String,
}

impl Rejection {
    pub fn new(stage: FilterStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

// ============================================================================
// Universe Filter
// ============================================================================

/// Market-cap and liquidity gate.
#[derive(Debug, Clone)]
pub struct UniverseFilter {
    market_cap_min: f64,
    market_cap_max: f64,
    min_avg_volume: f64,
}

impl UniverseFilter {
    pub fn new(profile: &MarketProfile) -> Self {
        Self {
            market_cap_min: profile.market_cap_min,
            market_cap_max: profile.market_cap_max,
            min_avg_volume: profile.min_avg_volume,
        }
    }

    /// Check a record; both cap bounds are inclusive.
    pub fn check(&self, record: &MarketRecord) -> Result<(), Rejection> {
        let Some(cap) = record.market_cap.filter(|c| c.is_finite()) else {
            return Err(Rejection::new(FilterStage::MarketCap, "Market cap unavailable"));
        };

        if !(self.market_cap_min..=self.market_cap_max).contains(&cap) {
            return Err(Rejection::new(
                FilterStage::MarketCap,
                format!(
                    "Market cap {:.2}B (need {:.2}B-{:.2}B)",
                    cap / 1e9,
                    self.market_cap_min / 1e9,
                    self.market_cap_max / 1e9
                ),
            ));
        }

        let liquid = record.avg_volume >= self.min_avg_volume;
        if !liquid {
            return Err(Rejection::new(
                FilterStage::Liquidity,
                format!(
                    "Volume {:.0} (need >={:.0}K)",
                    record.avg_volume,
                    self.min_avg_volume / 1e3
                ),
            ));
        }

        Ok(())
    }

    pub fn passes(&self, record: &MarketRecord) -> bool {
        self.check(record).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MarketRecord;

    fn record(cap: Option<f64>, avg_volume: f64) -> MarketRecord {
        MarketRecord {
            ticker: "TEST".into(),
            price: 10.0,
            market_cap: cap,
            avg_volume,
            sector: "Technology".into(),
            industry: "Software".into(),
            history: vec![],
            fundamentals: None,
            metadata: Default::default(),
        }
    }

    #[test]
    fn test_cap_bounds_inclusive() {
        let filter = UniverseFilter::new(&MarketProfile::us());
        assert!(filter.passes(&record(Some(300_000_000.0), 600_000.0)));
        assert!(filter.passes(&record(Some(10_000_000_000.0), 600_000.0)));

        let below = filter.check(&record(Some(299_999_999.0), 600_000.0)).unwrap_err();
        assert_eq!(below.stage, FilterStage::MarketCap);
        let above = filter.check(&record(Some(10_000_000_001.0), 600_000.0)).unwrap_err();
        assert_eq!(above.stage, FilterStage::MarketCap);
    }

    #[test]
    fn test_missing_cap_rejected() {
        let filter = UniverseFilter::new(&MarketProfile::us());
        let err = filter.check(&record(None, 600_000.0)).unwrap_err();
        assert_eq!(err.reason, "Market cap unavailable");
    }

    #[test]
    fn test_volume_floor() {
        let filter = UniverseFilter::new(&MarketProfile::us());
        assert!(filter.passes(&record(Some(1e9), 500_000.0)));
        let err = filter.check(&record(Some(1e9), 499_999.0)).unwrap_err();
        assert_eq!(err.stage, FilterStage::Liquidity);
        assert!(!filter.passes(&record(Some(1e9), f64::NAN)));
    }

    #[test]
    fn test_filter_result_rates() {
        let result = FilterResult::new(FilterStage::MarketCap, 200, 150);
        assert_eq!(result.eliminated, 50);
        assert!((result.elimination_rate - 25.0).abs() < 1e-9);
        assert_eq!(FilterResult::new(FilterStage::Input, 0, 0).elimination_rate, 0.0);
    }
}
