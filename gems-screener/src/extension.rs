//! Entry-timing analysis for buy-class candidates.
//!
//! Measures how far a stock has already run (1/3/6-month rallies and the
//! distance above its 50-bar average) and classifies the entry as
//! early, early momentum, momentum or extended.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{closes, Candle};
use crate::indicators;

/// Entry-timing class, ordered from safest to riskiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionClass {
    Early,
    EarlyMomentum,
    Momentum,
    Extended,
}

impl ExtensionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "EARLY",
            Self::EarlyMomentum => "EARLY_MOMENTUM",
            Self::Momentum => "MOMENTUM",
            Self::Extended => "EXTENDED",
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Self::Early => RiskLevel::Low,
            Self::EarlyMomentum => RiskLevel::Medium,
            Self::Momentum => RiskLevel::High,
            Self::Extended => RiskLevel::VeryHigh,
        }
    }
}

impl fmt::Display for ExtensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::VeryHigh => write!(f, "VERY_HIGH"),
        }
    }
}

/// Tunable cutoffs for the extension score and classes.
///
/// Tier lists are ascending; each tier reached adds one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionCutoffs {
    pub lookback_1m: usize,
    pub lookback_3m: usize,
    pub lookback_6m: usize,
    pub ma_period: usize,
    /// 6-month rally tiers (%)
    pub rally_6m_tiers: Vec<f64>,
    pub rally_3m_tiers: Vec<f64>,
    pub rally_1m_tiers: Vec<f64>,
    /// Distance above the 50-bar average tiers (%)
    pub distance_tiers: Vec<f64>,
    /// RSI at or above this adds one point
    pub overbought_rsi: f64,
    /// Any of these alone marks the stock EXTENDED
    pub extended_rally_6m: f64,
    pub extended_distance: f64,
    pub extended_score: u32,
    /// Score at or above this is MOMENTUM
    pub momentum_score: u32,
    /// EARLY requires score and distance at or below these
    pub early_max_score: u32,
    pub early_max_distance: f64,
    /// Technical score confirming an EARLY_MOMENTUM entry
    pub confirm_technical: f64,
}

impl Default for ExtensionCutoffs {
    fn default() -> Self {
        Self {
            lookback_1m: 21,
            lookback_3m: 63,
            lookback_6m: 126,
            ma_period: 50,
            rally_6m_tiers: vec![25.0, 50.0, 80.0],
            rally_3m_tiers: vec![15.0, 30.0],
            rally_1m_tiers: vec![8.0, 15.0],
            distance_tiers: vec![10.0, 20.0],
            overbought_rsi: 70.0,
            extended_rally_6m: 80.0,
            extended_distance: 25.0,
            extended_score: 7,
            momentum_score: 4,
            early_max_score: 1,
            early_max_distance: 5.0,
            confirm_technical: 60.0,
        }
    }
}

impl ExtensionCutoffs {
    /// Highest score the tier tables can award.
    pub fn max_score(&self) -> u32 {
        (self.rally_6m_tiers.len()
            + self.rally_3m_tiers.len()
            + self.rally_1m_tiers.len()
            + self.distance_tiers.len()
            + 1) as u32
    }

    /// Names of tier tables that are not strictly ascending.
    pub fn invalid_tiers(&self) -> Vec<&'static str> {
        let ascending = |tiers: &[f64]| tiers.windows(2).all(|w| w[0] < w[1]);
        [
            ("rally_6m_tiers", &self.rally_6m_tiers),
            ("rally_3m_tiers", &self.rally_3m_tiers),
            ("rally_1m_tiers", &self.rally_1m_tiers),
            ("distance_tiers", &self.distance_tiers),
        ]
        .into_iter()
        .filter(|(_, tiers)| !ascending(tiers.as_slice()))
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtensionMetrics {
    /// Rally over the lookbacks (%); 0 when the history is too short
    pub rally_1m: f64,
    pub rally_3m: f64,
    pub rally_6m: f64,
    /// Distance of the last close from its 50-bar average (%)
    pub distance_from_ma50: f64,
    pub extension_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionAnalysis {
    pub classification: ExtensionClass,
    pub risk_level: RiskLevel,
    pub metrics: ExtensionMetrics,
    pub entry_guidance: Vec<String>,
    pub reasoning: String,
}

impl ExtensionAnalysis {
    pub fn guidance_text(&self) -> String {
        self.entry_guidance.join("; ")
    }
}

/// Return from `bars` bars ago to the last close (%).
fn rally(closes: &[f64], bars: usize) -> f64 {
    if bars == 0 || closes.len() <= bars {
        return 0.0;
    }
    let base = closes[closes.len() - 1 - bars];
    let last = closes[closes.len() - 1];
    let ret = (last / base - 1.0) * 100.0;
    if base > 0.0 && ret.is_finite() {
        ret
    } else {
        0.0
    }
}

fn tiers_reached(value: f64, tiers: &[f64]) -> u32 {
    tiers.iter().filter(|t| value >= **t).count() as u32
}

pub fn extension_metrics(history: &[Candle], rsi: Option<f64>, cutoffs: &ExtensionCutoffs) -> ExtensionMetrics {
    let closes = closes(history);
    let rally_1m = rally(&closes, cutoffs.lookback_1m);
    let rally_3m = rally(&closes, cutoffs.lookback_3m);
    let rally_6m = rally(&closes, cutoffs.lookback_6m);

    let distance_from_ma50 = match (closes.last(), indicators::sma(&closes, cutoffs.ma_period)) {
        (Some(&price), Some(ma)) if ma > 0.0 => (price / ma - 1.0) * 100.0,
        _ => 0.0,
    };

    let overbought = rsi.is_some_and(|r| r >= cutoffs.overbought_rsi);
    let extension_score = tiers_reached(rally_6m, &cutoffs.rally_6m_tiers)
        + tiers_reached(rally_3m, &cutoffs.rally_3m_tiers)
        + tiers_reached(rally_1m, &cutoffs.rally_1m_tiers)
        + tiers_reached(distance_from_ma50, &cutoffs.distance_tiers)
        + u32::from(overbought);

    ExtensionMetrics {
        rally_1m,
        rally_3m,
        rally_6m,
        distance_from_ma50,
        extension_score,
    }
}

fn classify(metrics: &ExtensionMetrics, technical: f64, cutoffs: &ExtensionCutoffs) -> ExtensionClass {
    let score = metrics.extension_score;
    if metrics.rally_6m >= cutoffs.extended_rally_6m
        || metrics.distance_from_ma50 >= cutoffs.extended_distance
        || score >= cutoffs.extended_score
    {
        ExtensionClass::Extended
    } else if score >= cutoffs.momentum_score {
        ExtensionClass::Momentum
    } else if score <= cutoffs.early_max_score && metrics.distance_from_ma50 <= cutoffs.early_max_distance {
        ExtensionClass::Early
    } else if technical >= cutoffs.confirm_technical {
        ExtensionClass::EarlyMomentum
    } else {
        ExtensionClass::Momentum
    }
}

fn guidance(class: ExtensionClass, m: &ExtensionMetrics) -> Vec<String> {
    match class {
        ExtensionClass::Early => vec![
            "Optimal entry zone".into(),
            "Full position size acceptable".into(),
            "Stop below the 50-day average".into(),
        ],
        ExtensionClass::EarlyMomentum => vec![
            "Good entry, trend confirmed".into(),
            "Scale in: half now, half on a pullback".into(),
            format!("Price {:+.1}% from 50-day average", m.distance_from_ma50),
        ],
        ExtensionClass::Momentum => vec![
            "Reduced position size".into(),
            "Prefer entries on pullbacks to the 50-day average".into(),
            format!("Already up {:.1}% over 3 months", m.rally_3m),
        ],
        ExtensionClass::Extended => vec![
            "Do not chase".into(),
            "Wait for a pullback toward the 50-day average".into(),
            "Re-evaluate after consolidation".into(),
        ],
    }
}

fn reasoning(class: ExtensionClass, m: &ExtensionMetrics) -> String {
    match class {
        ExtensionClass::Early => format!(
            "Early stage: 6M rally {:.1}%, {:+.1}% vs 50MA",
            m.rally_6m, m.distance_from_ma50
        ),
        ExtensionClass::EarlyMomentum => format!(
            "Early momentum confirmed: 3M rally {:.1}%, {:+.1}% vs 50MA",
            m.rally_3m, m.distance_from_ma50
        ),
        ExtensionClass::Momentum => format!(
            "Momentum underway (extension {}): 1M {:.1}%, 3M {:.1}%, 6M {:.1}%. Higher risk entry",
            m.extension_score, m.rally_1m, m.rally_3m, m.rally_6m
        ),
        ExtensionClass::Extended => format!(
            "Extended: 6M rally {:.1}%, {:+.1}% vs 50MA (extension {}). Wait for pullback",
            m.rally_6m, m.distance_from_ma50, m.extension_score
        ),
    }
}

/// Classify a candidate's entry timing.
pub fn classify_extension(
    history: &[Candle],
    rsi: Option<f64>,
    technical: f64,
    cutoffs: &ExtensionCutoffs,
) -> ExtensionAnalysis {
    let metrics = extension_metrics(history, rsi, cutoffs);
    let classification = classify(&metrics, technical, cutoffs);

    ExtensionAnalysis {
        classification,
        risk_level: classification.risk_level(),
        entry_guidance: guidance(classification, &metrics),
        reasoning: reasoning(classification, &metrics),
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candles(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000_000.0,
            })
            .collect()
    }

    /// Geometric series with the given daily growth.
    fn growing(n: usize, daily: f64) -> Vec<Candle> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 * (1.0 + daily).powi(i as i32)).collect();
        candles(&closes)
    }

    #[test]
    fn test_flat_series_is_early() {
        let analysis = classify_extension(&candles(&[50.0; 260]), Some(55.0), 75.0, &ExtensionCutoffs::default());
        assert_eq!(analysis.classification, ExtensionClass::Early);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.metrics.extension_score, 0);
        assert_eq!(analysis.metrics.rally_6m, 0.0);
        assert!(!analysis.entry_guidance.is_empty());
    }

    #[test]
    fn test_big_six_month_rally_is_extended() {
        // 0.5%/day over 126 bars is roughly +87%
        let analysis = classify_extension(&growing(260, 0.005), Some(65.0), 80.0, &ExtensionCutoffs::default());
        assert!(analysis.metrics.rally_6m >= 80.0);
        assert_eq!(analysis.classification, ExtensionClass::Extended);
        assert_eq!(analysis.risk_level, RiskLevel::VeryHigh);
        assert!(analysis.reasoning.contains("Wait for pullback"));
    }

    #[test]
    fn test_rally_size_and_technicals_pick_class() {
        // ~0.12%/day: 6M ~16%, 3M ~8%, 1M ~2.5%, ~3% above 50MA
        let history = growing(260, 0.0012);
        let analysis = classify_extension(&history, Some(58.0), 70.0, &ExtensionCutoffs::default());
        assert_eq!(analysis.metrics.extension_score, 0);
        assert_eq!(analysis.classification, ExtensionClass::Early);

        let steeper = growing(260, 0.0025);
        let m = extension_metrics(&steeper, Some(58.0), &ExtensionCutoffs::default());
        assert!(m.extension_score >= 2 && m.extension_score < 4, "score {}", m.extension_score);
        let strong = classify_extension(&steeper, Some(58.0), 70.0, &ExtensionCutoffs::default());
        assert_eq!(strong.classification, ExtensionClass::EarlyMomentum);
        let weak = classify_extension(&steeper, Some(58.0), 50.0, &ExtensionCutoffs::default());
        assert_eq!(weak.classification, ExtensionClass::Momentum);
    }

    #[test]
    fn test_short_history_is_neutral() {
        let m = extension_metrics(&growing(20, 0.01), None, &ExtensionCutoffs::default());
        assert_eq!(m.rally_1m, 0.0);
        assert_eq!(m.rally_6m, 0.0);
        assert_eq!(m.distance_from_ma50, 0.0);
    }

    #[test]
    fn test_overbought_rsi_adds_a_point() {
        let flat = candles(&[50.0; 260]);
        let cutoffs = ExtensionCutoffs::default();
        assert_eq!(extension_metrics(&flat, Some(72.0), &cutoffs).extension_score, 1);
        assert_eq!(extension_metrics(&flat, Some(69.9), &cutoffs).extension_score, 0);
        assert_eq!(extension_metrics(&flat, None, &cutoffs).extension_score, 0);
    }

    #[test]
    fn test_class_ordering() {
        assert!(ExtensionClass::Early < ExtensionClass::EarlyMomentum);
        assert!(ExtensionClass::Momentum < ExtensionClass::Extended);
        assert_eq!(ExtensionClass::EarlyMomentum.to_string(), "EARLY_MOMENTUM");
    }

    #[test]
    fn test_cutoff_validation() {
        let mut cutoffs = ExtensionCutoffs::default();
        assert!(cutoffs.invalid_tiers().is_empty());
        assert_eq!(cutoffs.max_score(), 10);
        cutoffs.rally_3m_tiers = vec![30.0, 15.0];
        assert_eq!(cutoffs.invalid_tiers(), vec!["rally_3m_tiers"]);
    }
}
