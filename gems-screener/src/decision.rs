//! Action decision table.
//!
//! Stage one maps (valuation, technical, regime) to a base [`Action`] by
//! walking an ordered rule table; the first matching rule wins. Stage two
//! qualifies buy-class actions with the entry-timing class, and an
//! EXTENDED entry demotes the buy to `WATCH_EXTENDED`.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::extension::{ExtensionAnalysis, ExtensionClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StrongBuy,
    Buy,
    Watch,
    Wait,
    Speculative,
    Cash,
    Avoid,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Self::StrongBuy,
        Self::Buy,
        Self::Watch,
        Self::Wait,
        Self::Speculative,
        Self::Cash,
        Self::Avoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Buy => "BUY",
            Self::Watch => "WATCH",
            Self::Wait => "WAIT",
            Self::Speculative => "SPECULATIVE",
            Self::Cash => "CASH",
            Self::Avoid => "AVOID",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Self::StrongBuy => "🔥🔥",
            Self::Buy => "🔥",
            Self::Watch => "⏳",
            Self::Wait => "🕐",
            Self::Speculative => "⚠️",
            Self::Cash => "💰",
            Self::Avoid => "❌",
        }
    }

    pub fn is_buy_class(&self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    /// Whether the action queues the stock for deep (qualitative) review.
    pub fn needs_deep_analysis(&self) -> bool {
        self.is_buy_class()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cutoffs for the decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionThresholds {
    pub strong_buy_valuation: f64,
    pub strong_buy_technical: f64,
    pub buy_valuation: f64,
    pub buy_technical: f64,
    pub watch_valuation: f64,
    /// Inclusive technical range for WATCH
    pub watch_technical_min: f64,
    pub watch_technical_max: f64,
    pub wait_valuation: f64,
    /// WAIT requires technical strictly below this
    pub wait_technical_max: f64,
    /// Half-open valuation range [min, max) for SPECULATIVE
    pub speculative_valuation_min: f64,
    pub speculative_valuation_max: f64,
    pub speculative_technical: f64,
}

impl Default for ActionThresholds {
    fn default() -> Self {
        Self {
            strong_buy_valuation: 80.0,
            strong_buy_technical: 70.0,
            buy_valuation: 70.0,
            buy_technical: 60.0,
            watch_valuation: 70.0,
            watch_technical_min: 40.0,
            watch_technical_max: 60.0,
            wait_valuation: 70.0,
            wait_technical_max: 40.0,
            speculative_valuation_min: 50.0,
            speculative_valuation_max: 70.0,
            speculative_technical: 60.0,
        }
    }
}

impl ActionThresholds {
    /// Names of cutoff pairs that are out of order or outside 0–100.
    ///
    /// STRONG_BUY must be at least as strict as BUY on both scores, the WATCH
    /// technical range must be non-empty and sit above WAIT, and the
    /// SPECULATIVE valuation range must be non-empty.
    pub fn invalid_orderings(&self) -> Vec<&'static str> {
        let cutoffs = [
            self.strong_buy_valuation,
            self.strong_buy_technical,
            self.buy_valuation,
            self.buy_technical,
            self.watch_valuation,
            self.watch_technical_min,
            self.watch_technical_max,
            self.wait_valuation,
            self.wait_technical_max,
            self.speculative_valuation_min,
            self.speculative_valuation_max,
            self.speculative_technical,
        ];

        let mut invalid = Vec::new();
        if cutoffs.iter().any(|c| !(0.0..=100.0).contains(c)) {
            invalid.push("cutoffs must lie in 0-100");
        }
        if self.strong_buy_valuation < self.buy_valuation {
            invalid.push("strong_buy_valuation < buy_valuation");
        }
        if self.strong_buy_technical < self.buy_technical {
            invalid.push("strong_buy_technical < buy_technical");
        }
        if self.watch_technical_min > self.watch_technical_max {
            invalid.push("watch_technical_min > watch_technical_max");
        }
        if self.wait_technical_max > self.watch_technical_min {
            invalid.push("wait_technical_max > watch_technical_min");
        }
        if self.speculative_valuation_min >= self.speculative_valuation_max {
            invalid.push("speculative_valuation_min >= speculative_valuation_max");
        }
        invalid
    }
}

/// How a bearish market changes the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimePolicy {
    /// Points added to the STRONG_BUY/BUY valuation bars in a bearish market
    pub bearish_adjustment: f64,
    /// Disable buys entirely in a bearish market; non-matching stocks go to CASH
    pub block_buys_in_bear: bool,
}

impl Default for RegimePolicy {
    fn default() -> Self {
        Self {
            bearish_adjustment: 10.0,
            block_buys_in_bear: false,
        }
    }
}

/// Scores and regime fed into the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    /// Valuation plus bonus, already clamped to 0–100
    pub valuation: f64,
    pub technical: f64,
    pub bullish: bool,
}

struct RuleContext<'a> {
    inputs: DecisionInputs,
    thresholds: &'a ActionThresholds,
    policy: &'a RegimePolicy,
}

impl RuleContext<'_> {
    fn bearish(&self) -> bool {
        !self.inputs.bullish
    }

    fn buys_blocked(&self) -> bool {
        self.bearish() && self.policy.block_buys_in_bear
    }

    fn adjustment(&self) -> f64 {
        if self.bearish() && !self.policy.block_buys_in_bear {
            self.policy.bearish_adjustment
        } else {
            0.0
        }
    }
}

type Rule = (Action, fn(&RuleContext<'_>) -> bool);

fn strong_buy(ctx: &RuleContext<'_>) -> bool {
    let t = ctx.thresholds;
    !ctx.buys_blocked()
        && ctx.inputs.valuation >= t.strong_buy_valuation + ctx.adjustment()
        && ctx.inputs.technical >= t.strong_buy_technical
}

fn buy(ctx: &RuleContext<'_>) -> bool {
    let t = ctx.thresholds;
    !ctx.buys_blocked()
        && ctx.inputs.valuation >= t.buy_valuation + ctx.adjustment()
        && ctx.inputs.technical >= t.buy_technical
}

fn watch(ctx: &RuleContext<'_>) -> bool {
    let t = ctx.thresholds;
    ctx.inputs.valuation >= t.watch_valuation
        && (t.watch_technical_min..=t.watch_technical_max).contains(&ctx.inputs.technical)
}

fn wait(ctx: &RuleContext<'_>) -> bool {
    let t = ctx.thresholds;
    ctx.inputs.valuation >= t.wait_valuation && ctx.inputs.technical < t.wait_technical_max
}

fn speculative(ctx: &RuleContext<'_>) -> bool {
    let t = ctx.thresholds;
    (t.speculative_valuation_min..t.speculative_valuation_max).contains(&ctx.inputs.valuation)
        && ctx.inputs.technical >= t.speculative_technical
}

fn cash(ctx: &RuleContext<'_>) -> bool {
    ctx.buys_blocked()
}

fn avoid(_: &RuleContext<'_>) -> bool {
    true
}

/// The decision table in priority order. The last rule always matches.
const RULES: [Rule; 7] = [
    (Action::StrongBuy, strong_buy),
    (Action::Buy, buy),
    (Action::Watch, watch),
    (Action::Wait, wait),
    (Action::Speculative, speculative),
    (Action::Cash, cash),
    (Action::Avoid, avoid),
];

fn base_reasoning(action: Action, inputs: &DecisionInputs, thresholds: &ActionThresholds) -> String {
    let v = inputs.valuation;
    let t = inputs.technical;
    match action {
        Action::StrongBuy => format!("Exceptional fundamentals (V:{v:.1}) + Excellent timing (T:{t:.1})"),
        Action::Buy => format!("Strong fundamentals (V:{v:.1}) + Good timing (T:{t:.1})"),
        Action::Watch => format!(
            "Strong fundamentals (V:{v:.1}), but timing not optimal (T:{t:.1}). Wait for T>{:.0}",
            thresholds.buy_technical
        ),
        Action::Wait => {
            let guidance = if t < 30.0 {
                "Wait for trend reversal and volume increase"
            } else {
                "Wait for RSI to improve and MACD to turn bullish"
            };
            format!("Great company (V:{v:.1}), but poor timing (T:{t:.1}). {guidance}")
        }
        Action::Speculative => {
            format!("Decent fundamentals (V:{v:.1}) + Strong momentum (T:{t:.1}). Higher risk play")
        }
        Action::Cash => format!("Market bearish - holding cash. Scores: V:{v:.1}, T:{t:.1}"),
        Action::Avoid => format!(
            "Below thresholds: V:{v:.1} (need ≥{:.0}), T:{t:.1} (need ≥{:.0})",
            thresholds.watch_valuation, thresholds.watch_technical_min
        ),
    }
}

/// Stage-one result.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDecision {
    pub action: Action,
    pub reasoning: String,
}

/// Walk the rule table; first match wins.
pub fn decide(inputs: DecisionInputs, thresholds: &ActionThresholds, policy: &RegimePolicy) -> BaseDecision {
    let ctx = RuleContext {
        inputs,
        thresholds,
        policy,
    };
    let action = RULES
        .iter()
        .find(|(_, matches)| matches(&ctx))
        .map(|(action, _)| *action)
        .unwrap_or(Action::Avoid);

    BaseDecision {
        action,
        reasoning: base_reasoning(action, &inputs, thresholds),
    }
}

/// Final action label: the base action, optionally qualified by entry timing.
///
/// Rendered as `STRONG_BUY_EARLY`, `BUY_EARLY_MOM`, `BUY_MOMENTUM`,
/// `WATCH_EXTENDED` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionLabel {
    pub base: Action,
    pub timing: Option<ExtensionClass>,
}

impl ActionLabel {
    pub fn plain(base: Action) -> Self {
        Self { base, timing: None }
    }

    pub fn is_extended(&self) -> bool {
        self.timing == Some(ExtensionClass::Extended)
    }

    /// Buy-class and not demoted by an extended entry.
    pub fn is_actionable_buy(&self) -> bool {
        self.base.is_buy_class() && !self.is_extended()
    }
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timing {
            None => write!(f, "{}", self.base),
            Some(ExtensionClass::Extended) => write!(f, "WATCH_EXTENDED"),
            Some(ExtensionClass::Early) => write!(f, "{}_EARLY", self.base),
            Some(ExtensionClass::EarlyMomentum) => write!(f, "{}_EARLY_MOM", self.base),
            Some(ExtensionClass::Momentum) => write!(f, "{}_MOMENTUM", self.base),
        }
    }
}

impl Serialize for ActionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Final per-ticker decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDecision {
    pub label: ActionLabel,
    pub marker: String,
    pub reasoning: String,
    pub needs_deep_analysis: bool,
}

impl ActionDecision {
    /// Queue priority: 1 for strong buys, 2 otherwise.
    pub fn priority(&self) -> u8 {
        if self.label.base == Action::StrongBuy && !self.label.is_extended() {
            1
        } else {
            2
        }
    }
}

/// Apply the entry-timing override to a base decision.
///
/// Only buy-class actions are qualified; `extension` is ignored otherwise.
pub fn finalize(base: BaseDecision, extension: Option<&ExtensionAnalysis>) -> ActionDecision {
    let action = base.action;
    let plain = || ActionDecision {
        label: ActionLabel::plain(action),
        marker: action.marker().to_string(),
        reasoning: base.reasoning.clone(),
        needs_deep_analysis: action.needs_deep_analysis(),
    };

    let Some(ext) = extension.filter(|_| action.is_buy_class()) else {
        return plain();
    };

    let class = ext.classification;
    let label = ActionLabel {
        base: action,
        timing: Some(class),
    };
    match class {
        ExtensionClass::Extended => ActionDecision {
            label,
            marker: "⚠️".into(),
            reasoning: ext.reasoning.clone(),
            needs_deep_analysis: false,
        },
        ExtensionClass::Momentum => ActionDecision {
            label,
            marker: format!("{}⚡", action.marker()),
            reasoning: ext.reasoning.clone(),
            needs_deep_analysis: action.needs_deep_analysis(),
        },
        ExtensionClass::EarlyMomentum => ActionDecision {
            label,
            marker: format!("{}✅", action.marker()),
            reasoning: format!("{} | {}", base.reasoning, ext.reasoning),
            needs_deep_analysis: action.needs_deep_analysis(),
        },
        ExtensionClass::Early => ActionDecision {
            label,
            marker: format!("{}💎", action.marker()),
            reasoning: format!("{} | {}", base.reasoning, ext.reasoning),
            needs_deep_analysis: action.needs_deep_analysis(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{ExtensionMetrics, RiskLevel};
    use test_case::test_case;

    fn run(valuation: f64, technical: f64, bullish: bool) -> Action {
        decide(
            DecisionInputs {
                valuation,
                technical,
                bullish,
            },
            &ActionThresholds::default(),
            &RegimePolicy::default(),
        )
        .action
    }

    fn extension(class: ExtensionClass) -> ExtensionAnalysis {
        ExtensionAnalysis {
            classification: class,
            risk_level: class.risk_level(),
            metrics: ExtensionMetrics::default(),
            entry_guidance: vec!["guidance".into()],
            reasoning: "ext".into(),
        }
    }

    #[test_case(85.0, 75.0, true => Action::StrongBuy ; "strong buy")]
    #[test_case(75.0, 65.0, true => Action::Buy ; "buy")]
    #[test_case(80.0, 65.0, true => Action::Buy ; "strong valuation but buy timing")]
    #[test_case(75.0, 50.0, true => Action::Watch ; "watch")]
    #[test_case(75.0, 60.0, true => Action::Buy ; "technical 60 is buy before watch")]
    #[test_case(75.0, 35.0, true => Action::Wait ; "wait")]
    #[test_case(60.0, 65.0, true => Action::Speculative ; "speculative")]
    #[test_case(69.9, 65.0, true => Action::Speculative ; "speculative upper bound exclusive")]
    #[test_case(45.0, 90.0, true => Action::Avoid ; "avoid")]
    #[test_case(72.0, 65.0, false => Action::Avoid ; "bearish raises buy bar")]
    #[test_case(72.0, 55.0, false => Action::Watch ; "bearish watch unaffected")]
    #[test_case(90.0, 75.0, false => Action::StrongBuy ; "bearish strong buy clears adjusted bar")]
    #[test_case(85.0, 75.0, false => Action::Buy ; "bearish strong buy demoted")]
    fn test_decision_table(valuation: f64, technical: f64, bullish: bool) -> Action {
        run(valuation, technical, bullish)
    }

    #[test]
    fn test_default_thresholds_are_ordered() {
        assert!(ActionThresholds::default().invalid_orderings().is_empty());

        let swapped = ActionThresholds {
            watch_technical_min: 65.0,
            ..Default::default()
        };
        assert_eq!(
            swapped.invalid_orderings(),
            vec!["watch_technical_min > watch_technical_max"]
        );
    }

    #[test]
    fn test_bearish_adjustment_is_applied() {
        let action = run(72.0, 65.0, false);
        assert!(!action.is_buy_class());
        assert_eq!(run(72.0, 65.0, true), Action::Buy);
    }

    #[test]
    fn test_block_buys_in_bear_goes_to_cash() {
        let policy = RegimePolicy {
            block_buys_in_bear: true,
            ..Default::default()
        };
        let inputs = DecisionInputs {
            valuation: 95.0,
            technical: 90.0,
            bullish: false,
        };
        let result = decide(inputs, &ActionThresholds::default(), &policy);
        assert_eq!(result.action, Action::Cash);
        assert!(result.reasoning.starts_with("Market bearish"));

        // WATCH still ranks above CASH
        let watch = decide(
            DecisionInputs {
                technical: 50.0,
                ..inputs
            },
            &ActionThresholds::default(),
            &policy,
        );
        assert_eq!(watch.action, Action::Watch);
    }

    #[test]
    fn test_rules_end_with_catch_all() {
        let (last, _) = RULES[RULES.len() - 1];
        assert_eq!(last, Action::Avoid);
        assert_eq!(RULES[0].0, Action::StrongBuy);
        assert_eq!(RULES[1].0, Action::Buy);
    }

    #[test]
    fn test_wait_guidance() {
        let inputs = |technical| DecisionInputs {
            valuation: 75.0,
            technical,
            bullish: true,
        };
        let low = decide(inputs(20.0), &ActionThresholds::default(), &RegimePolicy::default());
        assert!(low.reasoning.ends_with("Wait for trend reversal and volume increase"));
        let mid = decide(inputs(35.0), &ActionThresholds::default(), &RegimePolicy::default());
        assert!(mid.reasoning.ends_with("Wait for RSI to improve and MACD to turn bullish"));
    }

    #[test]
    fn test_extended_overrides_buy() {
        let base = BaseDecision {
            action: Action::StrongBuy,
            reasoning: "base".into(),
        };
        let decision = finalize(base, Some(&extension(ExtensionClass::Extended)));
        assert_eq!(decision.label.to_string(), "WATCH_EXTENDED");
        assert!(!decision.needs_deep_analysis);
        assert!(!decision.label.is_actionable_buy());
        assert_eq!(decision.reasoning, "ext");
        assert_eq!(decision.priority(), 2);
    }

    #[test]
    fn test_timing_qualifiers() {
        let base = || BaseDecision {
            action: Action::Buy,
            reasoning: "base".into(),
        };

        let early = finalize(base(), Some(&extension(ExtensionClass::Early)));
        assert_eq!(early.label.to_string(), "BUY_EARLY");
        assert_eq!(early.marker, "🔥💎");
        assert_eq!(early.reasoning, "base | ext");
        assert!(early.needs_deep_analysis);

        let early_mom = finalize(base(), Some(&extension(ExtensionClass::EarlyMomentum)));
        assert_eq!(early_mom.label.to_string(), "BUY_EARLY_MOM");
        assert_eq!(early_mom.marker, "🔥✅");

        let momentum = finalize(base(), Some(&extension(ExtensionClass::Momentum)));
        assert_eq!(momentum.label.to_string(), "BUY_MOMENTUM");
        assert_eq!(momentum.reasoning, "ext");
        assert!(momentum.needs_deep_analysis);
    }

    #[test]
    fn test_non_buy_ignores_extension() {
        let base = BaseDecision {
            action: Action::Watch,
            reasoning: "base".into(),
        };
        let decision = finalize(base, Some(&extension(ExtensionClass::Extended)));
        assert_eq!(decision.label, ActionLabel::plain(Action::Watch));
        assert_eq!(decision.marker, "⏳");
        assert!(!decision.needs_deep_analysis);
    }

    #[test]
    fn test_label_serializes_as_string() {
        let label = ActionLabel {
            base: Action::StrongBuy,
            timing: Some(ExtensionClass::EarlyMomentum),
        };
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"STRONG_BUY_EARLY_MOM\"");
        assert_eq!(RiskLevel::VeryHigh.to_string(), "VERY_HIGH");
    }
}
