//! Technical scoring from the daily price/volume series.
//!
//! Seven signals, each worth 0, 0.5 or 1 point, rescaled to 0–100:
//! trend, volume trend, RSI band, MACD, relative strength vs the benchmark,
//! distance from the 52-week high, and ADX.

use serde::{Deserialize, Serialize};

use crate::data::{closes, volumes, Candle};
use crate::indicators::{self, MacdOutput, MacdParams};

/// Number of signals in the technical score.
pub const SIGNAL_COUNT: usize = 7;

/// Indicator parameters for the technical scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalParams {
    /// Bars required before any signal is scored
    pub min_history: usize,
    pub rsi_period: usize,
    pub macd: MacdParams,
    pub adx_period: usize,
    /// Bars spanned by the relative-strength return
    pub relative_strength_lookback: usize,
    /// Fraction of |benchmark return| a stock may trail by and still score half
    pub relative_strength_margin: f64,
    /// Bars considered for the 52-week high
    pub high_lookback: usize,
}

impl Default for TechnicalParams {
    fn default() -> Self {
        Self {
            min_history: 200,
            rsi_period: indicators::RSI_PERIOD,
            macd: MacdParams::default(),
            adx_period: indicators::ADX_PERIOD,
            relative_strength_lookback: 60,
            relative_strength_margin: 0.1,
            high_lookback: 252,
        }
    }
}

// ============================================================================
// Labels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeLabel {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiLabel {
    Healthy,
    Acceptable,
    Extreme,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdLabel {
    Bullish,
    Neutral,
    Bearish,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeStrengthLabel {
    Outperforming,
    Matching,
    Underperforming,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricePositionLabel {
    NearHigh,
    MidRange,
    FarFromHigh,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdxLabel {
    StrongTrend,
    Developing,
    WeakTrend,
}

/// Points and label for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scored<L> {
    pub points: f64,
    pub label: L,
}

impl<L> Scored<L> {
    fn new(points: f64, label: L) -> Self {
        Self { points, label }
    }
}

// ============================================================================
// Breakdown
// ============================================================================

/// Raw indicator values behind the signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReadings {
    pub price: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub volume_20: f64,
    pub volume_50: f64,
    pub rsi: Option<f64>,
    pub macd: Option<MacdOutput>,
    /// Trailing return over the relative-strength lookback (%)
    pub stock_return: Option<f64>,
    pub benchmark_return: Option<f64>,
    pub high_52w: f64,
    /// Distance below the 52-week high (%; 0 at the high)
    pub pct_from_high: Option<f64>,
    pub adx: f64,
}

/// One field per signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalBreakdown {
    pub trend: Scored<TrendLabel>,
    pub volume: Scored<VolumeLabel>,
    pub rsi: Scored<RsiLabel>,
    pub macd: Scored<MacdLabel>,
    pub relative_strength: Scored<RelativeStrengthLabel>,
    pub price_position: Scored<PricePositionLabel>,
    pub adx: Scored<AdxLabel>,
    pub readings: TechnicalReadings,
}

impl TechnicalBreakdown {
    pub fn total_points(&self) -> f64 {
        self.trend.points
            + self.volume.points
            + self.rsi.points
            + self.macd.points
            + self.relative_strength.points
            + self.price_position.points
            + self.adx.points
    }

    pub fn above_ma50(&self) -> bool {
        self.readings.price > self.readings.sma_50
    }

    pub fn above_ma200(&self) -> bool {
        self.readings.price > self.readings.sma_200
    }

    pub fn macd_bullish(&self) -> bool {
        self.readings.macd.is_some_and(|m| m.above_signal())
    }
}

/// Technical score with its breakdown; `breakdown` is `None` when the
/// history was too short to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalScore {
    pub score: f64,
    pub breakdown: Option<TechnicalBreakdown>,
}

impl TechnicalScore {
    pub fn insufficient() -> Self {
        Self {
            score: 0.0,
            breakdown: None,
        }
    }

    /// Latest RSI, if it was computable.
    pub fn rsi(&self) -> Option<f64> {
        self.breakdown.as_ref().and_then(|b| b.readings.rsi)
    }
}

// ============================================================================
// Signals
// ============================================================================

fn trend_signal(price: f64, sma_50: f64, sma_200: f64) -> Scored<TrendLabel> {
    let above_50 = price > sma_50;
    let golden = sma_50 > sma_200;
    match (above_50, golden) {
        (true, true) => Scored::new(1.0, TrendLabel::Strong),
        (true, false) | (false, true) => Scored::new(0.5, TrendLabel::Moderate),
        (false, false) => Scored::new(0.0, TrendLabel::Weak),
    }
}

fn volume_signal(volume_20: f64, volume_50: f64) -> Scored<VolumeLabel> {
    if volume_20 > volume_50 {
        Scored::new(1.0, VolumeLabel::Increasing)
    } else if volume_20 >= volume_50 * 0.9 {
        Scored::new(0.5, VolumeLabel::Stable)
    } else {
        Scored::new(0.0, VolumeLabel::Decreasing)
    }
}

fn rsi_signal(rsi: Option<f64>) -> Scored<RsiLabel> {
    match rsi {
        Some(v) if (40.0..=60.0).contains(&v) => Scored::new(1.0, RsiLabel::Healthy),
        Some(v) if (30.0..=70.0).contains(&v) => Scored::new(0.5, RsiLabel::Acceptable),
        Some(_) => Scored::new(0.0, RsiLabel::Extreme),
        None => Scored::new(0.0, RsiLabel::Unavailable),
    }
}

fn macd_signal(macd: Option<&MacdOutput>) -> Scored<MacdLabel> {
    let Some(m) = macd else {
        return Scored::new(0.0, MacdLabel::Unavailable);
    };
    match (m.above_signal(), m.histogram_rising()) {
        (true, true) => Scored::new(1.0, MacdLabel::Bullish),
        (true, false) | (false, true) => Scored::new(0.5, MacdLabel::Neutral),
        (false, false) => Scored::new(0.0, MacdLabel::Bearish),
    }
}

/// Sign-safe comparison: the stock may trail by `margin * |benchmark|`
/// percentage points and still count as matching.
fn relative_strength_signal(
    stock: Option<f64>,
    benchmark: Option<f64>,
    margin: f64,
) -> Scored<RelativeStrengthLabel> {
    let (Some(stock), Some(bench)) = (stock, benchmark) else {
        return Scored::new(0.0, RelativeStrengthLabel::Unavailable);
    };
    if stock > bench {
        Scored::new(1.0, RelativeStrengthLabel::Outperforming)
    } else if stock >= bench - margin * bench.abs() {
        Scored::new(0.5, RelativeStrengthLabel::Matching)
    } else {
        Scored::new(0.0, RelativeStrengthLabel::Underperforming)
    }
}

fn price_position_signal(pct_from_high: Option<f64>) -> Scored<PricePositionLabel> {
    match pct_from_high {
        Some(p) if p >= -20.0 => Scored::new(1.0, PricePositionLabel::NearHigh),
        Some(p) if p >= -40.0 => Scored::new(0.5, PricePositionLabel::MidRange),
        Some(_) => Scored::new(0.0, PricePositionLabel::FarFromHigh),
        None => Scored::new(0.0, PricePositionLabel::Unavailable),
    }
}

fn adx_signal(adx: f64) -> Scored<AdxLabel> {
    if adx > 25.0 {
        Scored::new(1.0, AdxLabel::StrongTrend)
    } else if adx > 20.0 {
        Scored::new(0.5, AdxLabel::Developing)
    } else {
        Scored::new(0.0, AdxLabel::WeakTrend)
    }
}

/// Percentage return from `lookback` bars back (inclusive) to the last bar.
pub fn trailing_return(closes: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 || closes.len() < lookback {
        return None;
    }
    let last = *closes.last()?;
    let base = closes[closes.len() - lookback];
    let ret = (last / base - 1.0) * 100.0;
    (base > 0.0 && ret.is_finite()).then_some(ret)
}

// ============================================================================
// Scorer
// ============================================================================

/// Score a price history against a benchmark.
///
/// Returns a zero score with no breakdown when the history is shorter than
/// `params.min_history` or the moving averages cannot be computed. An empty
/// or short benchmark only zeroes the relative-strength signal.
pub fn score_technical(
    history: &[Candle],
    benchmark: &[Candle],
    params: &TechnicalParams,
) -> TechnicalScore {
    if history.len() < params.min_history.max(1) {
        return TechnicalScore::insufficient();
    }

    let closes = closes(history);
    let volumes = volumes(history);
    let Some(&price) = closes.last() else {
        return TechnicalScore::insufficient();
    };
    let (Some(sma_50), Some(sma_200)) = (indicators::sma(&closes, 50), indicators::sma(&closes, 200))
    else {
        return TechnicalScore::insufficient();
    };

    let volume_20 = indicators::sma(&volumes, 20).unwrap_or(0.0);
    let volume_50 = indicators::sma(&volumes, 50).unwrap_or(0.0);
    let rsi = indicators::rsi(&closes, params.rsi_period);
    let macd = indicators::macd(&closes, params.macd);

    let stock_return = trailing_return(&closes, params.relative_strength_lookback);
    let benchmark_closes = crate::data::closes(benchmark);
    let benchmark_return = trailing_return(&benchmark_closes, params.relative_strength_lookback);

    let window_start = history.len().saturating_sub(params.high_lookback);
    let high_52w = history[window_start..]
        .iter()
        .map(|c| c.high)
        .filter(|h| h.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let pct_from_high = (high_52w > 0.0).then(|| (price / high_52w - 1.0) * 100.0);

    let adx = indicators::adx(history, params.adx_period);

    let breakdown = TechnicalBreakdown {
        trend: trend_signal(price, sma_50, sma_200),
        volume: volume_signal(volume_20, volume_50),
        rsi: rsi_signal(rsi),
        macd: macd_signal(macd.as_ref()),
        relative_strength: relative_strength_signal(
            stock_return,
            benchmark_return,
            params.relative_strength_margin,
        ),
        price_position: price_position_signal(pct_from_high),
        adx: adx_signal(adx),
        readings: TechnicalReadings {
            price,
            sma_50,
            sma_200,
            volume_20,
            volume_50,
            rsi,
            macd,
            stock_return,
            benchmark_return,
            high_52w,
            pct_from_high,
            adx,
        },
    };

    let score = (breakdown.total_points() / SIGNAL_COUNT as f64 * 100.0).clamp(0.0, 100.0);

    TechnicalScore {
        score,
        breakdown: Some(breakdown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn series(closes: &[f64], volume: impl Fn(usize) -> f64) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume: volume(i),
            })
            .collect()
    }

    fn uptrend(n: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (0..n).map(|i| 50.0 * 1.002f64.powi(i as i32)).collect();
        series(&closes, |i| 1_000_000.0 + i as f64 * 1000.0)
    }

    #[test]
    fn test_short_history_scores_zero() {
        let result = score_technical(&uptrend(199), &uptrend(260), &TechnicalParams::default());
        assert_eq!(result.score, 0.0);
        assert!(result.breakdown.is_none());
        assert_eq!(result.rsi(), None);
    }

    #[test]
    fn test_uptrend_scores_trend_and_position() {
        let history = uptrend(260);
        let flat_bench = series(&[100.0; 260], |_| 1.0);
        let result = score_technical(&history, &flat_bench, &TechnicalParams::default());
        let b = result.breakdown.as_ref().unwrap();

        assert_eq!(b.trend.label, TrendLabel::Strong);
        assert_eq!(b.volume.label, VolumeLabel::Increasing);
        assert_eq!(b.relative_strength.label, RelativeStrengthLabel::Outperforming);
        assert_eq!(b.price_position.label, PricePositionLabel::NearHigh);
        assert_eq!(b.rsi.label, RsiLabel::Extreme);
        assert!(b.above_ma50() && b.above_ma200());
        assert!(b.macd_bullish());
        assert!(result.score > 50.0 && result.score <= 100.0);
        assert!((result.score - b.total_points() / 7.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_benchmark_zeroes_relative_strength_only() {
        let result = score_technical(&uptrend(260), &[], &TechnicalParams::default());
        let b = result.breakdown.unwrap();
        assert_eq!(b.relative_strength.points, 0.0);
        assert_eq!(b.relative_strength.label, RelativeStrengthLabel::Unavailable);
        assert_eq!(b.trend.points, 1.0);
    }

    #[test]
    fn test_relative_strength_negative_benchmark() {
        // benchmark -10%: matching band extends down to -11%
        assert_eq!(
            relative_strength_signal(Some(-10.5), Some(-10.0), 0.1).label,
            RelativeStrengthLabel::Matching
        );
        assert_eq!(
            relative_strength_signal(Some(-11.5), Some(-10.0), 0.1).label,
            RelativeStrengthLabel::Underperforming
        );
        assert_eq!(
            relative_strength_signal(Some(-9.0), Some(-10.0), 0.1).label,
            RelativeStrengthLabel::Outperforming
        );
    }

    #[test]
    fn test_relative_strength_positive_benchmark() {
        assert_eq!(
            relative_strength_signal(Some(9.0), Some(10.0), 0.1).points,
            0.5
        );
        assert_eq!(
            relative_strength_signal(Some(8.9), Some(10.0), 0.1).points,
            0.0
        );
        assert_eq!(
            relative_strength_signal(None, Some(10.0), 0.1).points,
            0.0
        );
    }

    #[test]
    fn test_volume_signal_bands() {
        assert_eq!(volume_signal(110.0, 100.0).points, 1.0);
        assert_eq!(volume_signal(90.0, 100.0).points, 0.5);
        assert_eq!(volume_signal(89.0, 100.0).points, 0.0);
    }

    #[test]
    fn test_rsi_signal_bands() {
        assert_eq!(rsi_signal(Some(40.0)).label, RsiLabel::Healthy);
        assert_eq!(rsi_signal(Some(60.0)).label, RsiLabel::Healthy);
        assert_eq!(rsi_signal(Some(70.0)).label, RsiLabel::Acceptable);
        assert_eq!(rsi_signal(Some(29.9)).label, RsiLabel::Extreme);
        assert_eq!(rsi_signal(None).points, 0.0);
    }

    #[test]
    fn test_adx_and_position_bands() {
        assert_eq!(adx_signal(25.1).points, 1.0);
        assert_eq!(adx_signal(25.0).points, 0.5);
        assert_eq!(adx_signal(20.0).points, 0.0);
        assert_eq!(price_position_signal(Some(-20.0)).points, 1.0);
        assert_eq!(price_position_signal(Some(-40.0)).points, 0.5);
        assert_eq!(price_position_signal(Some(-40.1)).points, 0.0);
    }

    #[test]
    fn test_trailing_return() {
        let closes: Vec<f64> = (1..=60).map(|i| i as f64).collect();
        assert_eq!(trailing_return(&closes, 60), Some(5900.0));
        assert_eq!(trailing_return(&closes, 61), None);
        assert_eq!(trailing_return(&[0.0, 1.0], 2), None);
    }

    proptest! {
        #[test]
        fn prop_score_in_range(
            closes in prop::collection::vec(1.0f64..500.0, 0..320),
            bench in prop::collection::vec(1.0f64..500.0, 0..300),
        ) {
            let history = series(&closes, |i| 1000.0 + (i % 7) as f64 * 100.0);
            let benchmark = series(&bench, |_| 1.0);
            let result = score_technical(&history, &benchmark, &TechnicalParams::default());
            prop_assert!((0.0..=100.0).contains(&result.score));
            if closes.len() < 200 {
                prop_assert_eq!(result.score, 0.0);
                prop_assert!(result.breakdown.is_none());
            }
        }
    }
}
