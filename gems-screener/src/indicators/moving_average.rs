//! Simple and exponential moving averages.

use statrs::statistics::Statistics;

/// Mean of the trailing `period` values.
///
/// `None` when fewer than `period` values exist, `period` is zero, or the
/// window holds a non-finite value.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean = window.iter().mean();
    mean.is_finite().then_some(mean)
}

/// Full EMA series with `adjust=False` semantics.
///
/// bar 0 → value = first observation;
/// bar n → α·x + (1−α)·prev, where α = 2/(span+1).
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
