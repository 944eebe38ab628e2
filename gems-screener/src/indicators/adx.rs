//! Average Directional Index with Wilder smoothing.
//!
//! 1. +DM / −DM from consecutive bars (the larger move wins, negatives clamp to 0)
//! 2. True range = max(high−low, |high−prev close|, |low−prev close|)
//! 3. Seed +DM, −DM and TR with their sum over the first `period` moves, then
//!    Wilder-smooth: `prev − prev/N + current`
//! 4. ±DI = smoothed DM / smoothed TR · 100; DX = |+DI − −DI| / (+DI + −DI) · 100
//! 5. ADX = mean of the first `period` DX values, then Wilder-smoothed

use crate::data::Candle;

#[derive(Debug, Default)]
struct Smoothed {
    plus_dm: f64,
    minus_dm: f64,
    tr: f64,
}

impl Smoothed {
    fn dx(&self) -> f64 {
        if self.tr <= 0.0 {
            return 0.0;
        }
        let di_pos = self.plus_dm / self.tr * 100.0;
        let di_neg = self.minus_dm / self.tr * 100.0;
        let di_sum = di_pos + di_neg;
        if di_sum > 0.0 {
            (di_pos - di_neg).abs() / di_sum * 100.0
        } else {
            0.0
        }
    }
}

fn directional_move(prev: &Candle, cur: &Candle) -> (f64, f64, f64) {
    let up_move = cur.high - prev.high;
    let down_move = prev.low - cur.low;

    let plus_dm = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let minus_dm = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };
    let tr = cur
        .range()
        .max((cur.high - prev.close).abs())
        .max((cur.low - prev.close).abs());

    (plus_dm, minus_dm, tr)
}

/// ADX of the last bar.
///
/// Returns 0.0 when fewer than `2 * period` usable bars exist or `period` is 0.
/// Bars with non-finite prices are skipped.
pub fn adx(candles: &[Candle], period: usize) -> f64 {
    let bars: Vec<&Candle> = candles
        .iter()
        .filter(|c| c.high.is_finite() && c.low.is_finite() && c.close.is_finite())
        .collect();
    if period == 0 || bars.len() < 2 * period {
        return 0.0;
    }

    let n = period as f64;
    let mut smoothed = Smoothed::default();
    let mut dx_sum = 0.0;
    let mut dx_count = 0usize;
    let mut adx_value = 0.0;

    for (i, pair) in bars.windows(2).enumerate() {
        let (plus_dm, minus_dm, tr) = directional_move(pair[0], pair[1]);
        let moves = i + 1;

        if moves <= period {
            smoothed.plus_dm += plus_dm;
            smoothed.minus_dm += minus_dm;
            smoothed.tr += tr;
            if moves < period {
                continue;
            }
        } else {
            smoothed.plus_dm = smoothed.plus_dm - smoothed.plus_dm / n + plus_dm;
            smoothed.minus_dm = smoothed.minus_dm - smoothed.minus_dm / n + minus_dm;
            smoothed.tr = smoothed.tr - smoothed.tr / n + tr;
        }

        let dx = smoothed.dx();
        if dx_count < period {
            dx_sum += dx;
            dx_count += 1;
            adx_value = dx_sum / dx_count as f64;
        } else {
            adx_value = (adx_value * (n - 1.0) + dx) / n;
        }
    }

    adx_value
}
