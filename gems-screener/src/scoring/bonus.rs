//! Bonus points from ownership, insider and short-interest signals.
//!
//! Each signal is optional and additive. Missing data earns nothing and
//! never costs points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::ProviderMetadata;

/// Thresholds for the bonus signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusPolicy {
    /// Points per satisfied signal
    pub points_per_signal: u32,
    /// Minimum insider buys inside the window
    pub insider_buy_min: usize,
    pub insider_window_days: i64,
    /// Minimum institutional ownership (%)
    pub institutional_min_pct: f64,
    /// Short interest must be strictly below this (%); one cutoff for every
    /// market, not scaled to the market's typical short interest
    pub short_interest_max_pct: f64,
}

impl Default for BonusPolicy {
    fn default() -> Self {
        Self {
            points_per_signal: 5,
            insider_buy_min: 3,
            insider_window_days: 90,
            institutional_min_pct: 40.0,
            short_interest_max_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusSignal {
    InsiderBuying,
    InstitutionalOwnership,
    LowShortInterest,
}

/// A satisfied bonus signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusAward {
    pub signal: BonusSignal,
    pub points: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusScore {
    pub points: u32,
    pub awards: Vec<BonusAward>,
}

impl BonusScore {
    /// Reasons joined for display, or "None".
    pub fn explanation(&self) -> String {
        if self.awards.is_empty() {
            return "None".into();
        }
        self.awards
            .iter()
            .map(|a| a.reason.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Insider buy count in the trailing window, if any transactions were reported.
pub fn insider_buy_count(
    metadata: &ProviderMetadata,
    as_of: Option<NaiveDate>,
    window_days: i64,
) -> Option<usize> {
    if metadata.insider_transactions.is_empty() {
        return None;
    }
    as_of.map(|date| metadata.insider_buys_since(date, window_days))
}

pub fn institutional_pct(metadata: &ProviderMetadata) -> Option<f64> {
    metadata.institutional_pct.filter(|p| p.is_finite())
}

pub fn short_interest_pct(metadata: &ProviderMetadata) -> Option<f64> {
    metadata.short_interest_pct.filter(|p| p.is_finite())
}

impl BonusPolicy {
    /// Points every satisfied signal must award.
    pub const POINTS_PER_SIGNAL: u32 = 5;

    /// Names of fields that would break the 0–15, step-5 bonus range or make
    /// a signal meaningless.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.points_per_signal != Self::POINTS_PER_SIGNAL {
            invalid.push("points_per_signal");
        }
        if self.insider_buy_min == 0 {
            invalid.push("insider_buy_min");
        }
        if self.insider_window_days <= 0 {
            invalid.push("insider_window_days");
        }
        if !(0.0..=100.0).contains(&self.institutional_min_pct) {
            invalid.push("institutional_min_pct");
        }
        if !(0.0..=100.0).contains(&self.short_interest_max_pct) {
            invalid.push("short_interest_max_pct");
        }
        invalid
    }
}

/// Compute bonus points; `as_of` anchors the insider window (normally the
/// date of the last bar).
pub fn score_bonus(
    metadata: &ProviderMetadata,
    as_of: Option<NaiveDate>,
    policy: &BonusPolicy,
) -> BonusScore {
    let mut awards = Vec::new();

    if let Some(buys) = insider_buy_count(metadata, as_of, policy.insider_window_days) {
        if buys >= policy.insider_buy_min {
            awards.push(BonusAward {
                signal: BonusSignal::InsiderBuying,
                points: policy.points_per_signal,
                reason: format!("Insider buying ({} buys in {}d)", buys, policy.insider_window_days),
            });
        }
    }

    if let Some(pct) = institutional_pct(metadata) {
        if pct >= policy.institutional_min_pct {
            awards.push(BonusAward {
                signal: BonusSignal::InstitutionalOwnership,
                points: policy.points_per_signal,
                reason: format!("Institutional {:.0}%", pct),
            });
        }
    }

    if let Some(pct) = short_interest_pct(metadata) {
        if pct < policy.short_interest_max_pct {
            awards.push(BonusAward {
                signal: BonusSignal::LowShortInterest,
                points: policy.points_per_signal,
                reason: format!("Low short interest {:.1}%", pct),
            });
        }
    }

    BonusScore {
        points: awards.iter().map(|a| a.points).sum(),
        awards,
    }
}

/// Valuation plus bonus, clamped to 0–100.
pub fn enhanced_score(valuation: f64, bonus: u32) -> f64 {
    (valuation + bonus as f64).clamp(0.0, 100.0)
}
