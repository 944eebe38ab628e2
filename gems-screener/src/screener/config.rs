//! Per-scan configuration.
//!
//! [`ScanConfig`] is built once, validated, and shared read-only by every
//! ticker's pipeline.

use gems_common::{Config, Error as CommonError};
use serde::{Deserialize, Serialize};

use crate::decision::{ActionThresholds, RegimePolicy};
use crate::extension::ExtensionCutoffs;
use crate::market::{Market, MarketSelection};
use crate::scoring::{BonusPolicy, SectorPeTable, TechnicalParams, ThresholdSet};

use super::universe::MarketProfile;

/// Composite ranking weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub valuation: f64,
    pub technical: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            valuation: 0.6,
            technical: 0.4,
        }
    }
}

impl CompositeWeights {
    pub fn composite(&self, valuation: f64, technical: f64) -> f64 {
        valuation * self.valuation + technical * self.technical
    }
}

/// Immutable configuration for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub profile: MarketProfile,
    /// Threshold set for developed-market tickers
    pub developed: ThresholdSet,
    /// Threshold set for growth-market tickers
    pub growth: ThresholdSet,
    pub sector_pe: SectorPeTable,
    /// Multiplier turning YoY EPS growth into the 3-year figure
    pub eps_3y_proxy_factor: f64,
    pub bonus: BonusPolicy,
    pub technical: TechnicalParams,
    pub extension: ExtensionCutoffs,
    pub actions: ActionThresholds,
    pub regime: RegimePolicy,
    pub weights: CompositeWeights,
    /// Tickers fetched concurrently
    pub concurrency: usize,
    /// Extra attempts for recoverable provider errors
    pub max_retries: u32,
}

impl ScanConfig {
    /// Defaults for a market selection.
    pub fn for_market(selection: MarketSelection) -> Self {
        Self {
            profile: MarketProfile::for_selection(selection),
            developed: ThresholdSet::developed(),
            growth: ThresholdSet::growth(),
            sector_pe: SectorPeTable::default(),
            eps_3y_proxy_factor: 0.9,
            bonus: BonusPolicy::default(),
            technical: TechnicalParams::default(),
            extension: ExtensionCutoffs::default(),
            actions: ActionThresholds::default(),
            regime: RegimePolicy::default(),
            weights: CompositeWeights::default(),
            concurrency: 4,
            max_retries: 1,
        }
    }

    /// Defaults for `selection` with the overrides from the config file applied.
    pub fn from_config(config: &Config, selection: MarketSelection) -> Self {
        let mut scan = Self::for_market(selection);
        let overrides = &config.screener;

        if let Some(adj) = overrides.bearish_adjustment {
            scan.regime.bearish_adjustment = adj;
        }
        if let Some(block) = overrides.block_buys_in_bear {
            scan.regime.block_buys_in_bear = block;
        }
        if let Some(w) = overrides.valuation_weight {
            scan.weights.valuation = w;
        }
        if let Some(w) = overrides.technical_weight {
            scan.weights.technical = w;
        }
        if let Some(pe) = overrides.default_sector_pe {
            scan.sector_pe.default_pe = pe;
        }
        scan.sector_pe
            .overrides
            .extend(overrides.sector_pe.iter().map(|(k, v)| (k.clone(), *v)));
        if let Some(factor) = overrides.eps_3y_proxy_factor {
            scan.eps_3y_proxy_factor = factor;
        }
        if let Some(universe) = &overrides.universe {
            scan.profile.universe = universe.clone();
        }
        scan.concurrency = config.data.concurrency;
        scan
    }

    /// Threshold set for a ticker under this scan's market selection.
    pub fn thresholds_for(&self, ticker: &str) -> &ThresholdSet {
        match self.profile.market_for(ticker) {
            Market::Us => &self.developed,
            Market::India => &self.growth,
        }
    }

    /// Check the invariants the scorers rely on.
    pub fn validate(&self) -> gems_common::Result<()> {
        for (name, set) in [("developed", &self.developed), ("growth", &self.growth)] {
            let invalid = set.invalid_criteria();
            if !invalid.is_empty() {
                return Err(CommonError::Config(format!(
                    "{} thresholds: excellent cutoff must be strictly better than good for {}",
                    name,
                    invalid.join(", ")
                )));
            }
        }

        let invalid_tiers = self.extension.invalid_tiers();
        if !invalid_tiers.is_empty() {
            return Err(CommonError::Config(format!(
                "extension tiers must be ascending: {}",
                invalid_tiers.join(", ")
            )));
        }

        let invalid_bonus = self.bonus.invalid_fields();
        if !invalid_bonus.is_empty() {
            return Err(CommonError::Config(format!(
                "bonus policy: invalid {} (each signal awards exactly {} points)",
                invalid_bonus.join(", "),
                BonusPolicy::POINTS_PER_SIGNAL
            )));
        }

        let unordered = self.actions.invalid_orderings();
        if !unordered.is_empty() {
            return Err(CommonError::Config(format!(
                "action thresholds out of order: {}",
                unordered.join(", ")
            )));
        }

        let total = self.weights.valuation + self.weights.technical;
        if self.weights.valuation < 0.0 || self.weights.technical < 0.0 || (total - 1.0).abs() > 1e-6 {
            return Err(CommonError::Config(format!(
                "composite weights must be non-negative and sum to 1.0 (got {:.3})",
                total
            )));
        }

        if self.profile.market_cap_min > self.profile.market_cap_max {
            return Err(CommonError::Config(format!(
                "market cap range is empty: {} > {}",
                self.profile.market_cap_min, self.profile.market_cap_max
            )));
        }

        if self.concurrency == 0 {
            return Err(CommonError::Config("concurrency must be at least 1".into()));
        }

        if !self.sector_pe.default_pe.is_finite() || self.sector_pe.default_pe <= 0.0 {
            return Err(CommonError::Config("default sector P/E must be positive".into()));
        }

        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "market={}, cap {:.1}B-{:.1}B, vol>={:.0}K, weights {:.0}/{:.0}",
            self.profile.selection,
            self.profile.market_cap_min / 1e9,
            self.profile.market_cap_max / 1e9,
            self.profile.min_avg_volume / 1e3,
            self.weights.valuation * 100.0,
            self.weights.technical * 100.0
        )
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::for_market(MarketSelection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ThresholdBand;

    #[test]
    fn test_default_is_valid() {
        for selection in [MarketSelection::Us, MarketSelection::India, MarketSelection::Both] {
            assert!(ScanConfig::for_market(selection).validate().is_ok());
        }
    }

    #[test]
    fn test_invalid_band_rejected() {
        let mut scan = ScanConfig::default();
        scan.growth.debt_equity = ThresholdBand::lower(1.5, 0.7);
        let err = scan.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("debt_equity"));
    }

    #[test]
    fn test_invalid_bonus_policy_rejected() {
        let mut scan = ScanConfig::default();
        scan.bonus.points_per_signal = 10;
        let err = scan.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("points_per_signal"));

        let mut scan = ScanConfig::default();
        scan.bonus.short_interest_max_pct = -1.0;
        assert!(scan.validate().is_err());
    }

    #[test]
    fn test_unordered_action_thresholds_rejected() {
        let mut scan = ScanConfig::default();
        scan.actions.strong_buy_valuation = 65.0;
        let err = scan.validate().unwrap_err();
        assert!(err.to_string().contains("strong_buy_valuation < buy_valuation"));

        let mut scan = ScanConfig::default();
        scan.actions.wait_technical_max = 50.0;
        assert!(scan.validate().is_err());

        let mut scan = ScanConfig::default();
        scan.actions.speculative_valuation_min = 70.0;
        assert!(scan.validate().is_err());

        let mut scan = ScanConfig::default();
        scan.actions.buy_technical = 120.0;
        assert!(scan.validate().is_err());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut scan = ScanConfig::default();
        scan.weights.technical = 0.5;
        assert!(scan.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut scan = ScanConfig::default();
        scan.concurrency = 0;
        assert!(scan.validate().is_err());
    }

    #[test]
    fn test_thresholds_follow_selection() {
        let both = ScanConfig::for_market(MarketSelection::Both);
        assert_eq!(both.thresholds_for("TRENT.NS"), &ThresholdSet::growth());
        assert_eq!(both.thresholds_for("BILL"), &ThresholdSet::developed());

        let us = ScanConfig::for_market(MarketSelection::Us);
        assert_eq!(us.thresholds_for("TRENT.NS"), &ThresholdSet::developed());
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let mut config = Config::default();
        config.screener.bearish_adjustment = Some(5.0);
        config.screener.block_buys_in_bear = Some(true);
        config.screener.sector_pe.insert("Technology".into(), 35.0);
        config.screener.universe = Some(vec!["AAA".into()]);
        config.data.concurrency = 8;

        let scan = ScanConfig::from_config(&config, MarketSelection::Us);
        assert_eq!(scan.regime.bearish_adjustment, 5.0);
        assert!(scan.regime.block_buys_in_bear);
        assert_eq!(scan.sector_pe.pe_for("Technology"), 35.0);
        assert_eq!(scan.profile.universe, vec!["AAA".to_string()]);
        assert_eq!(scan.concurrency, 8);
        assert!(scan.validate().is_ok());
    }

    #[test]
    fn test_composite_weights() {
        let w = CompositeWeights::default();
        assert!((w.composite(80.0, 50.0) - 68.0).abs() < 1e-9);
    }
}
