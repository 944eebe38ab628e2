//! Market regime check: benchmark close against its 200-bar average.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{closes, Candle};
use crate::indicators;

/// Bars needed for the regime average.
pub const REGIME_MA_PERIOD: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRegime {
    Bullish,
    Bearish,
}

impl MarketRegime {
    pub fn is_bullish(&self) -> bool {
        matches!(self, Self::Bullish)
    }

    /// Classify a benchmark history. Fewer than 200 bars counts as bearish.
    pub fn from_benchmark(history: &[Candle]) -> Self {
        let closes = closes(history);
        match (closes.last(), indicators::sma(&closes, REGIME_MA_PERIOD)) {
            (Some(&last), Some(ma)) if last > ma => Self::Bullish,
            _ => Self::Bearish,
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bench(closes: impl Iterator<Item = f64>) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .enumerate()
            .map(|(i, c)| Candle {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_rising_benchmark_is_bullish() {
        let history = bench((0..250).map(|i| 400.0 + i as f64));
        assert_eq!(MarketRegime::from_benchmark(&history), MarketRegime::Bullish);
    }

    #[test]
    fn test_falling_benchmark_is_bearish() {
        let history = bench((0..250).map(|i| 600.0 - i as f64));
        assert_eq!(MarketRegime::from_benchmark(&history), MarketRegime::Bearish);
    }

    #[test]
    fn test_short_or_missing_benchmark_is_bearish() {
        let short = bench((0..199).map(|i| 400.0 + i as f64));
        assert_eq!(MarketRegime::from_benchmark(&short), MarketRegime::Bearish);
        assert_eq!(MarketRegime::from_benchmark(&[]), MarketRegime::Bearish);
    }

    #[test]
    fn test_flat_benchmark_is_bearish() {
        let flat = bench(std::iter::repeat(500.0).take(220));
        assert!(!MarketRegime::from_benchmark(&flat).is_bullish());
    }
}
