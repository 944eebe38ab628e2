//! Fundamental valuation scoring.
//!
//! Seven criteria, each banded Excellent/Good/Poor against the market's
//! [`ThresholdSet`] with fixed point awards summing to 100.
//!
//! Missing inputs follow a per-criterion policy:
//! - EPS growth (YoY, 3Y): absent or zero skips the criterion (0 points)
//! - ROE, debt/equity, FCF yield: absent scores the Poor tier
//! - P/E vs sector: skipped unless both P/E and sector P/E are positive
//! - PEG: skipped unless positive

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::thresholds::{Band, Criterion, ThresholdSet};
use crate::data::FundamentalSnapshot;

/// Sector P/E used when no override exists for a sector.
pub const DEFAULT_SECTOR_PE: f64 = 20.0;

/// Average P/E per sector with a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPeTable {
    pub default_pe: f64,
    #[serde(default)]
    pub overrides: HashMap<String, f64>,
}

impl Default for SectorPeTable {
    fn default() -> Self {
        Self {
            default_pe: DEFAULT_SECTOR_PE,
            overrides: HashMap::new(),
        }
    }
}

impl SectorPeTable {
    pub fn pe_for(&self, sector: &str) -> f64 {
        self.overrides
            .get(sector)
            .copied()
            .unwrap_or(self.default_pe)
    }
}

/// Derived inputs that do not live on the snapshot itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValuationInputs {
    /// YoY EPS growth (%)
    pub eps_growth_yoy: Option<f64>,
    /// Three-year EPS growth (%)
    pub eps_growth_3y: Option<f64>,
    /// Free cash flow yield (%)
    pub fcf_yield: Option<f64>,
    pub sector_pe: f64,
}

/// One scored criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub band: Band,
    pub points: u32,
    /// Raw value that was banded; `None` when the Poor tier came from missing data
    pub value: Option<f64>,
}

/// One field per criterion; `None` means the criterion was skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValuationBreakdown {
    pub eps_growth_yoy: Option<CriterionScore>,
    pub eps_growth_3y: Option<CriterionScore>,
    pub roe: Option<CriterionScore>,
    pub debt_equity: Option<CriterionScore>,
    pub pe_vs_sector: Option<CriterionScore>,
    pub peg: Option<CriterionScore>,
    pub fcf_yield: Option<CriterionScore>,
}

impl ValuationBreakdown {
    pub fn get(&self, criterion: Criterion) -> Option<&CriterionScore> {
        match criterion {
            Criterion::EpsGrowthYoy => self.eps_growth_yoy.as_ref(),
            Criterion::EpsGrowth3y => self.eps_growth_3y.as_ref(),
            Criterion::Roe => self.roe.as_ref(),
            Criterion::DebtEquity => self.debt_equity.as_ref(),
            Criterion::PeVsSector => self.pe_vs_sector.as_ref(),
            Criterion::Peg => self.peg.as_ref(),
            Criterion::FcfYield => self.fcf_yield.as_ref(),
        }
    }

    /// Scored criteria in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &CriterionScore)> + '_ {
        Criterion::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|s| (c, s)))
    }

    pub fn total_points(&self) -> u32 {
        self.iter().map(|(_, s)| s.points).sum()
    }
}

/// Valuation score; `breakdown` is `None` when no fundamentals were available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationScore {
    pub score: f64,
    pub breakdown: Option<ValuationBreakdown>,
}

impl ValuationScore {
    pub fn missing() -> Self {
        Self {
            score: 0.0,
            breakdown: None,
        }
    }
}

fn banded(criterion: Criterion, value: f64, thresholds: &ThresholdSet) -> CriterionScore {
    let band = thresholds.band_for(criterion).band(value);
    CriterionScore {
        band,
        points: criterion.points().for_band(band),
        value: Some(value),
    }
}

fn poor(criterion: Criterion) -> CriterionScore {
    CriterionScore {
        band: Band::Poor,
        points: criterion.points().poor,
        value: None,
    }
}

/// Score when present and non-zero, otherwise skip.
fn score_if_nonzero(
    criterion: Criterion,
    value: Option<f64>,
    thresholds: &ThresholdSet,
) -> Option<CriterionScore> {
    value
        .filter(|v| *v != 0.0 && v.is_finite())
        .map(|v| banded(criterion, v, thresholds))
}

/// Score when present, otherwise award the Poor tier.
fn score_or_poor(criterion: Criterion, value: Option<f64>, thresholds: &ThresholdSet) -> CriterionScore {
    match value.filter(|v| v.is_finite()) {
        Some(v) => banded(criterion, v, thresholds),
        None => poor(criterion),
    }
}

/// Score a fundamentals snapshot.
pub fn score_valuation(
    snapshot: Option<&FundamentalSnapshot>,
    inputs: &ValuationInputs,
    thresholds: &ThresholdSet,
) -> ValuationScore {
    let Some(snapshot) = snapshot else {
        return ValuationScore::missing();
    };

    let pe_vs_sector = match snapshot.pe_ratio {
        Some(pe) if pe > 0.0 && inputs.sector_pe > 0.0 => Some(banded(
            Criterion::PeVsSector,
            pe / inputs.sector_pe,
            thresholds,
        )),
        _ => None,
    };

    let peg = snapshot
        .peg_ratio
        .filter(|p| *p > 0.0 && p.is_finite())
        .map(|p| banded(Criterion::Peg, p, thresholds));

    let breakdown = ValuationBreakdown {
        eps_growth_yoy: score_if_nonzero(Criterion::EpsGrowthYoy, inputs.eps_growth_yoy, thresholds),
        eps_growth_3y: score_if_nonzero(Criterion::EpsGrowth3y, inputs.eps_growth_3y, thresholds),
        roe: Some(score_or_poor(Criterion::Roe, snapshot.roe, thresholds)),
        debt_equity: Some(score_or_poor(Criterion::DebtEquity, snapshot.debt_equity, thresholds)),
        pe_vs_sector,
        peg,
        fcf_yield: Some(score_or_poor(Criterion::FcfYield, inputs.fcf_yield, thresholds)),
    };

    ValuationScore {
        score: breakdown.total_points() as f64,
        breakdown: Some(breakdown),
    }
}
