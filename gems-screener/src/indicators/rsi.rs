//! Relative Strength Index.

/// RSI over the trailing `period` close-to-close changes.
///
/// Average gain and average loss are simple means over the window. When the
/// average loss is zero the result is 100, so a perfectly flat series also
/// reads 100. Returns `None` with fewer than `period + 1` closes or a
/// non-finite value in the window.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let window = &closes[closes.len() - period - 1..];
    if window.iter().any(|c| !c.is_finite()) {
        return None;
    }

    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), delta| {
            if delta > 0.0 {
                (g + delta, l)
            } else {
                (g, l - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rsi_flat_series_is_100() {
        assert_eq!(rsi(&[50.0; 30], 14), Some(100.0));
    }

    #[test]
    fn test_rsi_monotonic_series() {
        let up: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let down: Vec<f64> = up.iter().rev().copied().collect();
        assert_eq!(rsi(&up, 14), Some(100.0));
        assert_eq!(rsi(&down, 14), Some(0.0));
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // alternating +1 / -1 gives equal gain and loss
        let closes: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let value = rsi(&closes, 14).unwrap();
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_history() {
        assert_eq!(rsi(&[1.0; 14], 14), None);
        assert!(rsi(&[1.0; 15], 14).is_some());
        assert_eq!(rsi(&[1.0; 15], 0), None);
    }

    #[test]
    fn test_rsi_only_uses_trailing_window() {
        let mut closes: Vec<f64> = (0..20).rev().map(|i| i as f64 + 100.0).collect();
        closes.extend((0..15).map(|i| 200.0 + i as f64));
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    proptest! {
        #[test]
        fn prop_rsi_in_range(closes in prop::collection::vec(1.0f64..1000.0, 15..80)) {
            let value = rsi(&closes, 14).unwrap();
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}
