//! Indicator library.
//!
//! Pure functions over a daily series, oldest bar first. Each indicator
//! evaluates the trailing window of the full series and signals "not
//! computable" (`None`, or `0.0` for ADX) when the series is too short or a
//! value is non-finite, instead of producing an out-of-range number.

pub mod adx;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use adx::adx;
pub use macd::{macd, MacdOutput, MacdParams};
pub use moving_average::{ema_series, sma};
pub use rsi::rsi;

/// Default RSI lookback
pub const RSI_PERIOD: usize = 14;

/// Default ADX lookback
pub const ADX_PERIOD: usize = 14;
