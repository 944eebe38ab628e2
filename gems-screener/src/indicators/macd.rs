//! Moving Average Convergence Divergence.

use serde::{Deserialize, Serialize};

use super::moving_average::ema_series;

/// MACD spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// Last-bar MACD readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Histogram one bar earlier
    pub histogram_prev: f64,
}

impl MacdOutput {
    pub fn above_signal(&self) -> bool {
        self.macd > self.signal
    }

    pub fn histogram_rising(&self) -> bool {
        self.histogram > self.histogram_prev
    }
}

/// MACD line (fast EMA − slow EMA), its signal EMA, and the histogram for
/// the last two bars.
///
/// Needs at least two closes; `None` otherwise or when any close is non-finite.
pub fn macd(closes: &[f64], params: MacdParams) -> Option<MacdOutput> {
    if closes.len() < 2 || closes.iter().any(|c| !c.is_finite()) {
        return None;
    }

    let fast = ema_series(closes, params.fast);
    let slow = ema_series(closes, params.slow);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&line, params.signal);

    let n = line.len();
    let histogram = line[n - 1] - signal[n - 1];
    let histogram_prev = line[n - 2] - signal[n - 2];

    Some(MacdOutput {
        macd: line[n - 1],
        signal: signal[n - 1],
        histogram,
        histogram_prev,
    })
}
