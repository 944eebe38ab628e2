//! Per-ticker scoring pipeline.
//!
//! Pure and synchronous: a fetched record goes through the liquidity filter,
//! both scorers, the decision table and (for buys) the extension override.
//! No I/O and no shared mutable state, so tickers can be evaluated in any
//! order or in parallel.

use serde::Serialize;

use crate::data::{Candle, FundamentalSnapshot, MarketRecord};
use crate::decision::{self, ActionDecision, DecisionInputs};
use crate::extension::{self, ExtensionAnalysis};
use crate::market::Market;
use crate::scoring::{
    enhanced_score, score_bonus, score_technical, score_valuation, BonusScore, TechnicalScore,
    ValuationInputs, ValuationScore,
};

use super::config::ScanConfig;
use super::filter::{Rejection, UniverseFilter};
use super::regime::MarketRegime;

/// Shared, read-only inputs for every ticker in one scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    pub config: &'a ScanConfig,
    pub benchmark: &'a [Candle],
    pub regime: MarketRegime,
}

/// Fundamental fields carried through for display and deep-analysis context.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FundamentalSummary {
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub debt_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub eps_growth_yoy: Option<f64>,
    pub eps_growth_3y: Option<f64>,
    pub fcf_yield: Option<f64>,
    pub sector_pe: f64,
    pub institutional_pct: Option<f64>,
    pub short_interest_pct: Option<f64>,
}

/// A fully scored ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenedStock {
    pub ticker: String,
    pub market: Market,
    pub sector: String,
    pub industry: String,
    pub price: f64,
    pub market_cap: Option<f64>,
    pub avg_volume: f64,
    pub valuation: ValuationScore,
    pub bonus: BonusScore,
    /// Valuation plus bonus, clamped to 100
    pub enhanced_valuation: f64,
    pub technical: TechnicalScore,
    pub composite: f64,
    pub decision: ActionDecision,
    /// Present only for buy-class base actions
    pub extension: Option<ExtensionAnalysis>,
    pub fundamentals: FundamentalSummary,
}

impl ScreenedStock {
    pub fn rsi(&self) -> Option<f64> {
        self.technical.rsi()
    }

    pub fn macd_bullish(&self) -> bool {
        self.technical.breakdown.as_ref().is_some_and(|b| b.macd_bullish())
    }

    pub fn above_ma50(&self) -> bool {
        self.technical.breakdown.as_ref().is_some_and(|b| b.above_ma50())
    }

    pub fn above_ma200(&self) -> bool {
        self.technical.breakdown.as_ref().is_some_and(|b| b.above_ma200())
    }

    pub fn action_label(&self) -> String {
        self.decision.label.to_string()
    }
}

/// A ticker that produced no score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// Outcome of evaluating one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Scored(Box<ScreenedStock>),
    Filtered { ticker: String, rejection: Rejection },
    Skipped(SkippedTicker),
}

fn valuation_inputs(
    snapshot: &FundamentalSnapshot,
    record: &MarketRecord,
    config: &ScanConfig,
) -> ValuationInputs {
    ValuationInputs {
        eps_growth_yoy: snapshot.eps_growth_yoy(),
        eps_growth_3y: snapshot.eps_growth_3y(config.eps_3y_proxy_factor),
        fcf_yield: snapshot.fcf_yield(record.market_cap),
        sector_pe: config.sector_pe.pe_for(&record.sector),
    }
}

fn summarize(
    snapshot: &FundamentalSnapshot,
    inputs: &ValuationInputs,
    record: &MarketRecord,
) -> FundamentalSummary {
    FundamentalSummary {
        pe_ratio: snapshot.pe_ratio,
        peg_ratio: snapshot.peg_ratio,
        roe: snapshot.roe,
        debt_equity: snapshot.debt_equity,
        profit_margin: snapshot.profit_margin,
        revenue_growth: snapshot.revenue_growth,
        earnings_growth: snapshot.earnings_growth,
        eps_growth_yoy: inputs.eps_growth_yoy,
        eps_growth_3y: inputs.eps_growth_3y,
        fcf_yield: inputs.fcf_yield,
        sector_pe: inputs.sector_pe,
        institutional_pct: record.metadata.institutional_pct,
        short_interest_pct: record.metadata.short_interest_pct,
    }
}

/// Evaluate one record. Never fails: every record ends scored, filtered or
/// skipped.
pub fn evaluate(record: &MarketRecord, ctx: &ScanContext<'_>) -> Evaluation {
    let config = ctx.config;

    if let Err(rejection) = UniverseFilter::new(&config.profile).check(record) {
        return Evaluation::Filtered {
            ticker: record.ticker.clone(),
            rejection,
        };
    }

    let Some(snapshot) = record.fundamentals.as_ref() else {
        return Evaluation::Skipped(SkippedTicker {
            ticker: record.ticker.clone(),
            reason: "No fundamentals".into(),
        });
    };

    let thresholds = config.thresholds_for(&record.ticker);
    let inputs = valuation_inputs(snapshot, record, config);
    let valuation = score_valuation(Some(snapshot), &inputs, thresholds);
    let bonus = score_bonus(&record.metadata, record.as_of(), &config.bonus);
    let enhanced_valuation = enhanced_score(valuation.score, bonus.points);
    let technical = score_technical(&record.history, ctx.benchmark, &config.technical);
    let composite = config.weights.composite(enhanced_valuation, technical.score);

    let base = decision::decide(
        DecisionInputs {
            valuation: enhanced_valuation,
            technical: technical.score,
            bullish: ctx.regime.is_bullish(),
        },
        &config.actions,
        &config.regime,
    );

    let extension = base.action.is_buy_class().then(|| {
        extension::classify_extension(
            &record.history,
            technical.rsi(),
            technical.score,
            &config.extension,
        )
    });
    let decision = decision::finalize(base, extension.as_ref());

    Evaluation::Scored(Box::new(ScreenedStock {
        ticker: record.ticker.clone(),
        market: config.profile.market_for(&record.ticker),
        sector: record.sector.clone(),
        industry: record.industry.clone(),
        price: record.price,
        market_cap: record.market_cap,
        avg_volume: record.avg_volume,
        fundamentals: summarize(snapshot, &inputs, record),
        valuation,
        bonus,
        enhanced_valuation,
        technical,
        composite,
        decision,
        extension,
    }))
}
