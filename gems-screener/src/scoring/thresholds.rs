//! Valuation threshold bands and point tables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality tier a raw ratio falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    Poor,
    Good,
    Excellent,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Poor => write!(f, "Poor"),
        }
    }
}

/// Which way a ratio improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Excellent/good cutoffs for one metric in one market.
///
/// Cutoffs are inclusive: a value equal to the excellent cutoff is Excellent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub excellent: f64,
    pub good: f64,
    pub direction: Direction,
}

impl ThresholdBand {
    pub const fn higher(excellent: f64, good: f64) -> Self {
        Self {
            excellent,
            good,
            direction: Direction::HigherIsBetter,
        }
    }

    pub const fn lower(excellent: f64, good: f64) -> Self {
        Self {
            excellent,
            good,
            direction: Direction::LowerIsBetter,
        }
    }

    /// Bucket a raw value.
    pub fn band(&self, value: f64) -> Band {
        match self.direction {
            Direction::HigherIsBetter if value >= self.excellent => Band::Excellent,
            Direction::HigherIsBetter if value >= self.good => Band::Good,
            Direction::LowerIsBetter if value <= self.excellent => Band::Excellent,
            Direction::LowerIsBetter if value <= self.good => Band::Good,
            _ => Band::Poor,
        }
    }

    /// The excellent cutoff must be strictly more favorable than the good one.
    pub fn is_valid(&self) -> bool {
        if !self.excellent.is_finite() || !self.good.is_finite() {
            return false;
        }
        match self.direction {
            Direction::HigherIsBetter => self.excellent > self.good,
            Direction::LowerIsBetter => self.excellent < self.good,
        }
    }
}

/// The seven valuation criteria, in scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    EpsGrowthYoy,
    EpsGrowth3y,
    Roe,
    DebtEquity,
    PeVsSector,
    Peg,
    FcfYield,
}

impl Criterion {
    pub const ALL: [Criterion; 7] = [
        Self::EpsGrowthYoy,
        Self::EpsGrowth3y,
        Self::Roe,
        Self::DebtEquity,
        Self::PeVsSector,
        Self::Peg,
        Self::FcfYield,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::EpsGrowthYoy => "eps_growth_yoy",
            Self::EpsGrowth3y => "eps_growth_3y",
            Self::Roe => "roe",
            Self::DebtEquity => "debt_equity",
            Self::PeVsSector => "pe_vs_sector",
            Self::Peg => "peg",
            Self::FcfYield => "fcf_yield",
        }
    }

    /// Fixed point award per band.
    pub const fn points(&self) -> BandPoints {
        match self {
            Self::EpsGrowthYoy => BandPoints::new(25, 15, 5),
            Self::EpsGrowth3y => BandPoints::new(15, 10, 3),
            Self::Roe => BandPoints::new(20, 12, 5),
            Self::DebtEquity => BandPoints::new(15, 10, 3),
            Self::PeVsSector => BandPoints::new(10, 6, 2),
            Self::Peg => BandPoints::new(10, 6, 2),
            Self::FcfYield => BandPoints::new(5, 3, 1),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Points awarded for each band of one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandPoints {
    pub excellent: u32,
    pub good: u32,
    pub poor: u32,
}

impl BandPoints {
    pub const fn new(excellent: u32, good: u32, poor: u32) -> Self {
        Self {
            excellent,
            good,
            poor,
        }
    }

    pub fn for_band(&self, band: Band) -> u32 {
        match band {
            Band::Excellent => self.excellent,
            Band::Good => self.good,
            Band::Poor => self.poor,
        }
    }
}

/// Threshold bands for all seven criteria in one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub eps_growth_yoy: ThresholdBand,
    pub eps_growth_3y: ThresholdBand,
    pub roe: ThresholdBand,
    pub debt_equity: ThresholdBand,
    pub pe_vs_sector: ThresholdBand,
    pub peg: ThresholdBand,
    pub fcf_yield: ThresholdBand,
}

impl ThresholdSet {
    /// Developed-market (US) cutoffs.
    pub fn developed() -> Self {
        Self {
            eps_growth_yoy: ThresholdBand::higher(15.0, 10.0),
            eps_growth_3y: ThresholdBand::higher(12.0, 8.0),
            roe: ThresholdBand::higher(20.0, 15.0),
            debt_equity: ThresholdBand::lower(0.5, 1.0),
            pe_vs_sector: ThresholdBand::lower(0.8, 1.0),
            peg: ThresholdBand::lower(1.0, 1.5),
            fcf_yield: ThresholdBand::higher(5.0, 2.0),
        }
    }

    /// Growth-market (India) cutoffs: lower growth and ROE bars, more
    /// leverage tolerated, higher PEG accepted.
    pub fn growth() -> Self {
        Self {
            eps_growth_yoy: ThresholdBand::higher(12.0, 8.0),
            eps_growth_3y: ThresholdBand::higher(10.0, 6.0),
            roe: ThresholdBand::higher(18.0, 12.0),
            debt_equity: ThresholdBand::lower(0.7, 1.5),
            pe_vs_sector: ThresholdBand::lower(0.8, 1.0),
            peg: ThresholdBand::lower(1.2, 1.8),
            fcf_yield: ThresholdBand::higher(4.0, 1.5),
        }
    }

    pub fn band_for(&self, criterion: Criterion) -> &ThresholdBand {
        match criterion {
            Criterion::EpsGrowthYoy => &self.eps_growth_yoy,
            Criterion::EpsGrowth3y => &self.eps_growth_3y,
            Criterion::Roe => &self.roe,
            Criterion::DebtEquity => &self.debt_equity,
            Criterion::PeVsSector => &self.pe_vs_sector,
            Criterion::Peg => &self.peg,
            Criterion::FcfYield => &self.fcf_yield,
        }
    }

    /// Names of criteria whose band violates the ordering invariant.
    pub fn invalid_criteria(&self) -> Vec<&'static str> {
        Criterion::ALL
            .iter()
            .filter(|c| !self.band_for(**c).is_valid())
            .map(|c| c.name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_points_sum_to_100() {
        let total: u32 = Criterion::ALL.iter().map(|c| c.points().excellent).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_default_sets_are_valid() {
        assert!(ThresholdSet::developed().invalid_criteria().is_empty());
        assert!(ThresholdSet::growth().invalid_criteria().is_empty());
    }

    #[test]
    fn test_invalid_band_detected() {
        let mut set = ThresholdSet::developed();
        set.roe = ThresholdBand::higher(15.0, 15.0);
        set.peg = ThresholdBand::lower(2.0, 1.0);
        assert_eq!(set.invalid_criteria(), vec!["roe", "peg"]);
    }

    #[test]
    fn test_band_edges_inclusive() {
        let roe = ThresholdBand::higher(20.0, 15.0);
        assert_eq!(roe.band(20.0), Band::Excellent);
        assert_eq!(roe.band(19.99), Band::Good);
        assert_eq!(roe.band(15.0), Band::Good);
        assert_eq!(roe.band(14.99), Band::Poor);

        let de = ThresholdBand::lower(0.5, 1.0);
        assert_eq!(de.band(0.5), Band::Excellent);
        assert_eq!(de.band(0.51), Band::Good);
        assert_eq!(de.band(1.0), Band::Good);
        assert_eq!(de.band(1.01), Band::Poor);
    }

    #[test]
    fn test_nan_is_poor() {
        assert_eq!(ThresholdBand::higher(20.0, 15.0).band(f64::NAN), Band::Poor);
        assert_eq!(ThresholdBand::lower(0.5, 1.0).band(f64::NAN), Band::Poor);
    }

    #[test]
    fn test_band_points_strictly_ordered() {
        for c in Criterion::ALL {
            let p = c.points();
            assert!(p.excellent > p.good && p.good > p.poor, "{}", c);
        }
    }

    proptest! {
        #[test]
        fn prop_banding_is_monotonic(a in -50.0f64..100.0, b in -50.0f64..100.0, growth in any::<bool>()) {
            let set = if growth { ThresholdSet::growth() } else { ThresholdSet::developed() };
            for c in Criterion::ALL {
                let band = set.band_for(c);
                let (better, worse) = match band.direction {
                    Direction::HigherIsBetter => (a.max(b), a.min(b)),
                    Direction::LowerIsBetter => (a.min(b), a.max(b)),
                };
                let points = c.points();
                prop_assert!(points.for_band(band.band(better)) >= points.for_band(band.band(worse)));
            }
        }
    }
}
