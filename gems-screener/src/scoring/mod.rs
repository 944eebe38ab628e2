//! Valuation and technical scoring.
//!
//! Both scorers are pure: they take an immutable record plus the scan's
//! threshold tables and never fail. Missing or short inputs degrade to a
//! zero score with no breakdown.

pub mod bonus;
pub mod technical;
pub mod thresholds;
pub mod valuation;

pub use bonus::{enhanced_score, score_bonus, BonusAward, BonusPolicy, BonusScore, BonusSignal};
pub use technical::{score_technical, TechnicalBreakdown, TechnicalParams, TechnicalScore};
pub use thresholds::{Band, Criterion, Direction, ThresholdBand, ThresholdSet};
pub use valuation::{
    score_valuation, SectorPeTable, ValuationBreakdown, ValuationInputs, ValuationScore,
};
