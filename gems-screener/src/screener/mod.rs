//! Scan orchestration.
//!
//! Runs a market universe through the liquidity filter, both scorers, the
//! decision table and the entry-timing override, then ranks and reports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Hidden Gems Scan                             │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌─────────────┐     ┌─────────────┐     ┌─────────────┐           │
//! │  │ DataProvider│────▶│   Engine    │────▶│   Report    │           │
//! │  │ Yahoo/Snap  │     │ (buffered)  │     │ CSV/JSON/MD │           │
//! │  └─────────────┘     └──────┬──────┘     └─────────────┘           │
//! │                             │                                       │
//! │  ┌──────────────────────────┴──────────────────────────────┐       │
//! │  │              Per-ticker pipeline                        │       │
//! │  │  - Filter: market cap range, average volume floor       │       │
//! │  │  - Score: valuation + bonus, technical, composite       │       │
//! │  │  - Decide: regime-adjusted action table                 │       │
//! │  │  - Time: extension override for buy-class actions       │       │
//! │  └─────────────────────────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gems_screener::screener::{ScanConfig, ScreenerEngine, ScanReport, ReportFormat};
//!
//! let config = Arc::new(ScanConfig::for_market(MarketSelection::Us));
//! let engine = ScreenerEngine::new(config, provider)?;
//! let result = engine.run().await?;
//!
//! ScanReport::new(&result).save(dir, "stock_picks", ReportFormat::Csv)?;
//! ```

pub mod config;
pub mod engine;
pub mod filter;
pub mod pipeline;
pub mod regime;
pub mod report;
pub mod universe;

pub use config::{CompositeWeights, ScanConfig};
pub use engine::{FilteredTicker, ScanResult, ScreenerEngine};
pub use filter::{FilterResult, FilterStage, Rejection, UniverseFilter};
pub use pipeline::{evaluate, Evaluation, FundamentalSummary, ScanContext, ScreenedStock, SkippedTicker};
pub use regime::MarketRegime;
pub use report::{AiQueue, ReportFormat, ScanReport};
pub use universe::MarketProfile;
