//! Hidden Gems Screener Library
//!
//! Scans a curated universe of small and mid cap equities, scores each on
//! fundamentals and price action, and turns the scores into a ranked action
//! list with an entry-timing check for buy candidates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    gems-screener (Rust CLI)                         │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐     │
//! │  │  Market Data    │  │  Scoring        │  │  Decision       │     │
//! │  │  Providers      │  │  (val + tech)   │  │  + Extension    │     │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Valuation score (0-100)
//! - Seven fundamental criteria banded Excellent / Good / Poor against a
//!   per-market threshold set
//! - Up to 15 bonus points from ownership and insider signals
//!
//! ## Technical score (0-100)
//! - Trend, volume, RSI, MACD, relative strength, 52-week position, ADX
//! - Needs 200 bars of history, otherwise 0
//!
//! ## Entry timing
//! - Buy-class actions are qualified EARLY / EARLY_MOM / MOMENTUM, or demoted
//!   to WATCH_EXTENDED when the rally has already run

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod decision;
pub mod extension;
pub mod indicators;
pub mod market;
pub mod scoring;
pub mod screener;

pub use data::{Candle, DataProvider, FundamentalSnapshot, MarketRecord, ProviderError, ProviderMetadata};
pub use decision::{Action, ActionDecision, ActionLabel};
pub use extension::{ExtensionAnalysis, ExtensionClass, RiskLevel};
pub use market::{Market, MarketSelection};
pub use screener::{ScanConfig, ScanReport, ScanResult, ScreenerEngine};
