//! Report generation module for scan results.
//!
//! Generates reports in three formats:
//! - CSV (every scored ticker, one row each)
//! - AI queue JSON (candidates flagged for deep analysis)
//! - Markdown (human-readable summary)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::extension::ExtensionClass;

use super::engine::ScanResult;
use super::pipeline::ScreenedStock;

/// Follow-up work attached to every queued candidate.
pub const DEEP_ANALYSIS_TASKS: [&str; 7] = [
    "Find recent news (last 7 days)",
    "Analyze earnings sentiment",
    "Check insider transactions",
    "Assess competitive position",
    "Evaluate growth catalysts",
    "Identify risks",
    "Validate extension analysis",
];

// ============================================================================
// Report Format
// ============================================================================

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// One row per scored ticker
    Csv,
    /// Deep-analysis queue (machine-readable)
    AiQueue,
    /// Summary (human-readable)
    Markdown,
}

impl ReportFormat {
    /// File name for this format given an output stem.
    pub fn file_name(&self, stem: &str) -> String {
        match self {
            Self::Csv => format!("{}.csv", stem),
            Self::AiQueue => format!("{}_ai_queue.json", stem),
            Self::Markdown => format!("{}_summary.md", stem),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::AiQueue => write!(f, "ai_queue"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "ai_queue" | "queue" | "json" => Ok(Self::AiQueue),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ============================================================================
// CSV Rows
// ============================================================================

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
    #[serde(rename = "Market")]
    market: String,
    #[serde(rename = "Sector")]
    sector: &'a str,
    #[serde(rename = "Industry")]
    industry: &'a str,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Market Cap (M)")]
    market_cap_m: Option<f64>,
    #[serde(rename = "Valuation Score")]
    valuation: f64,
    #[serde(rename = "Bonus Points")]
    bonus_points: u32,
    #[serde(rename = "Bonus Details")]
    bonus_details: String,
    #[serde(rename = "Enhanced Val Score")]
    enhanced_valuation: f64,
    #[serde(rename = "Technical Score")]
    technical: f64,
    #[serde(rename = "Composite Score")]
    composite: f64,
    #[serde(rename = "Action")]
    action: String,
    #[serde(rename = "Priority")]
    marker: &'a str,
    #[serde(rename = "Reasoning")]
    reasoning: &'a str,
    #[serde(rename = "Needs Deep Analysis")]
    needs_deep_analysis: bool,
    #[serde(rename = "Extension Class")]
    extension_class: String,
    #[serde(rename = "Risk Level")]
    risk_level: String,
    #[serde(rename = "Rally 1M %")]
    rally_1m: f64,
    #[serde(rename = "Rally 3M %")]
    rally_3m: f64,
    #[serde(rename = "Rally 6M %")]
    rally_6m: f64,
    #[serde(rename = "Dist from MA50 %")]
    distance_from_ma50: f64,
    #[serde(rename = "Extension Score")]
    extension_score: u32,
    #[serde(rename = "Entry Guidance")]
    entry_guidance: String,
    #[serde(rename = "PE Ratio")]
    pe_ratio: Option<f64>,
    #[serde(rename = "ROE")]
    roe: Option<f64>,
    #[serde(rename = "Debt/Equity")]
    debt_equity: Option<f64>,
    #[serde(rename = "Rev Growth %")]
    revenue_growth: Option<f64>,
    #[serde(rename = "Earnings Growth %")]
    eps_growth_yoy: Option<f64>,
    #[serde(rename = "EPS Growth 3Y %")]
    eps_growth_3y: Option<f64>,
    #[serde(rename = "FCF Yield %")]
    fcf_yield: Option<f64>,
    #[serde(rename = "RSI")]
    rsi: Option<f64>,
    #[serde(rename = "MACD Bullish")]
    macd_bullish: bool,
    #[serde(rename = "Above 50 MA")]
    above_ma50: bool,
    #[serde(rename = "Above 200 MA")]
    above_ma200: bool,
}

impl<'a> CsvRow<'a> {
    fn from_stock(stock: &'a ScreenedStock) -> Self {
        let ext = stock.extension.as_ref();
        let metrics = ext.map(|e| e.metrics).unwrap_or_default();
        let f = &stock.fundamentals;

        Self {
            ticker: &stock.ticker,
            market: stock.market.to_string(),
            sector: &stock.sector,
            industry: &stock.industry,
            price: round2(stock.price),
            market_cap_m: stock.market_cap.map(|c| (c / 1e6).round()),
            valuation: round1(stock.valuation.score),
            bonus_points: stock.bonus.points,
            bonus_details: stock.bonus.explanation(),
            enhanced_valuation: round1(stock.enhanced_valuation),
            technical: round1(stock.technical.score),
            composite: round1(stock.composite),
            action: stock.action_label(),
            marker: &stock.decision.marker,
            reasoning: &stock.decision.reasoning,
            needs_deep_analysis: stock.decision.needs_deep_analysis,
            extension_class: ext.map_or_else(|| "N/A".into(), |e| e.classification.to_string()),
            risk_level: ext.map_or_else(|| "N/A".into(), |e| e.risk_level.to_string()),
            rally_1m: round1(metrics.rally_1m),
            rally_3m: round1(metrics.rally_3m),
            rally_6m: round1(metrics.rally_6m),
            distance_from_ma50: round1(metrics.distance_from_ma50),
            extension_score: metrics.extension_score,
            entry_guidance: ext.map_or_else(|| "N/A".into(), |e| e.guidance_text()),
            pe_ratio: f.pe_ratio.map(round2),
            roe: f.roe.map(round2),
            debt_equity: f.debt_equity.map(round2),
            revenue_growth: f.revenue_growth.map(round1),
            eps_growth_yoy: f.eps_growth_yoy.map(round1),
            eps_growth_3y: f.eps_growth_3y.map(round1),
            fcf_yield: f.fcf_yield.map(round1),
            rsi: stock.rsi().map(round1),
            macd_bullish: stock.macd_bullish(),
            above_ma50: stock.above_ma50(),
            above_ma200: stock.above_ma200(),
        }
    }
}

// ============================================================================
// AI Queue
// ============================================================================

/// Deep-analysis queue document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiQueue {
    pub scan_date: String,
    pub scan_time: String,
    pub market: String,
    pub market_regime: String,
    pub total_candidates: usize,
    pub stocks: Vec<QueuedStock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedStock {
    pub ticker: String,
    pub action: String,
    pub priority: u8,
    pub extension_class: String,
    pub risk_level: String,
    pub entry_guidance: String,
    pub scores: QueuedScores,
    pub rally_metrics: RallyMetrics,
    pub fundamentals: QueuedFundamentals,
    pub technicals: QueuedTechnicals,
    pub reasoning: String,
    pub phase2_tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedScores {
    pub composite: f64,
    pub valuation: f64,
    pub enhanced_valuation: f64,
    pub bonus: u32,
    pub technical: f64,
    pub extension: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RallyMetrics {
    pub rally_1m: f64,
    pub rally_3m: f64,
    pub rally_6m: f64,
    pub distance_from_ma50: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedFundamentals {
    pub sector: String,
    pub industry: String,
    pub price: f64,
    pub market_cap_millions: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub debt_equity: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub fcf_yield: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedTechnicals {
    pub rsi: Option<f64>,
    pub macd_bullish: bool,
    pub above_ma50: bool,
    pub above_ma200: bool,
}

impl QueuedStock {
    fn from_stock(stock: &ScreenedStock) -> Self {
        let ext = stock.extension.as_ref();
        let metrics = ext.map(|e| e.metrics).unwrap_or_default();
        let f = &stock.fundamentals;

        Self {
            ticker: stock.ticker.clone(),
            action: stock.action_label(),
            priority: stock.decision.priority(),
            extension_class: ext.map_or_else(|| "N/A".into(), |e| e.classification.to_string()),
            risk_level: ext.map_or_else(|| "N/A".into(), |e| e.risk_level.to_string()),
            entry_guidance: ext.map_or_else(|| "N/A".into(), |e| e.guidance_text()),
            scores: QueuedScores {
                composite: round1(stock.composite),
                valuation: round1(stock.valuation.score),
                enhanced_valuation: round1(stock.enhanced_valuation),
                bonus: stock.bonus.points,
                technical: round1(stock.technical.score),
                extension: metrics.extension_score,
            },
            rally_metrics: RallyMetrics {
                rally_1m: round1(metrics.rally_1m),
                rally_3m: round1(metrics.rally_3m),
                rally_6m: round1(metrics.rally_6m),
                distance_from_ma50: round1(metrics.distance_from_ma50),
            },
            fundamentals: QueuedFundamentals {
                sector: stock.sector.clone(),
                industry: stock.industry.clone(),
                price: round2(stock.price),
                market_cap_millions: stock.market_cap.map(|c| (c / 1e6).round()),
                pe_ratio: f.pe_ratio.map(round2),
                roe: f.roe.map(round2),
                debt_equity: f.debt_equity.map(round2),
                revenue_growth: f.revenue_growth.map(round1),
                earnings_growth: f.eps_growth_yoy.map(round1),
                fcf_yield: f.fcf_yield.map(round1),
            },
            technicals: QueuedTechnicals {
                rsi: stock.rsi().map(round1),
                macd_bullish: stock.macd_bullish(),
                above_ma50: stock.above_ma50(),
                above_ma200: stock.above_ma200(),
            },
            reasoning: stock.decision.reasoning.clone(),
            phase2_tasks: DEEP_ANALYSIS_TASKS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

// ============================================================================
// Scan Report
// ============================================================================

/// Report generator for scan results.
pub struct ScanReport<'a> {
    result: &'a ScanResult,
    top_n: usize,
}

impl<'a> ScanReport<'a> {
    pub fn new(result: &'a ScanResult) -> Self {
        Self { result, top_n: 20 }
    }

    /// Rows shown in the Markdown top-scored table.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Generate report in the specified format.
    pub fn generate(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Csv => self.to_csv(),
            ReportFormat::AiQueue => self.to_ai_queue_json(),
            ReportFormat::Markdown => Ok(self.to_markdown()),
        }
    }

    /// Write one report as `<dir>/<file name for stem>`.
    pub fn save(&self, dir: &Path, stem: &str, format: ReportFormat) -> Result<PathBuf> {
        let content = self.generate(format)?;
        let file_path = dir.join(format.file_name(stem));

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        std::fs::write(&file_path, content)
            .with_context(|| format!("Failed to write report file {}", file_path.display()))?;

        Ok(file_path)
    }

    /// Write several formats. The AI queue is skipped when it would be empty.
    pub fn save_all(&self, dir: &Path, stem: &str, formats: &[ReportFormat]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for format in formats {
            if *format == ReportFormat::AiQueue && self.result.deep_analysis_queue().is_empty() {
                continue;
            }
            written.push(self.save(dir, stem, *format)?);
        }
        Ok(written)
    }

    /// CSV of every scored stock, ranking order.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for stock in &self.result.stocks {
            writer
                .serialize(CsvRow::from_stock(stock))
                .with_context(|| format!("Failed to serialize CSV row for {}", stock.ticker))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }

    pub fn ai_queue(&self) -> AiQueue {
        let now = Utc::now();
        let stocks: Vec<QueuedStock> = self
            .result
            .deep_analysis_queue()
            .into_iter()
            .map(QueuedStock::from_stock)
            .collect();

        AiQueue {
            scan_date: now.format("%Y-%m-%d").to_string(),
            scan_time: now.format("%H:%M:%S").to_string(),
            market: self.result.market.to_string(),
            market_regime: self.result.regime.to_string(),
            total_candidates: stocks.len(),
            stocks,
        }
    }

    pub fn to_ai_queue_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.ai_queue()).context("Failed to serialize AI queue")
    }

    /// Generate markdown summary.
    pub fn to_markdown(&self) -> String {
        let r = self.result;
        let mut md = String::new();

        md.push_str(&format!(
            "# Hidden Gems Scan ({})\n\n**Scan ID**: {}\n**Completed**: {}\n**Duration**: {:.1}s\n\n",
            r.market,
            r.id,
            r.completed_at.format("%Y-%m-%d %H:%M:%S"),
            r.duration_secs
        ));

        md.push_str(&format!(
            "**Market regime**: {} ({} vs 200-day MA)\n\n",
            r.regime, r.benchmark
        ));
        md.push_str(&format!("- **Filters**: {}\n", r.config_summary));
        md.push_str(&format!("- **Total scanned**: {}\n", r.total_scanned));
        md.push_str(&format!("- **Scored**: {}\n\n", r.stocks.len()));

        md.push_str("## Filter Funnel\n\n");
        md.push_str("| Stage | Passed | Eliminated | Rate |\n");
        md.push_str("|-------|--------|------------|------|\n");
        for fr in &r.filter_results {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                fr.stage, fr.passed, fr.eliminated, fr.elimination_rate
            ));
        }
        md.push('\n');

        if r.stocks.is_empty() {
            md.push_str("**Zero candidates passed.**\n");
            return md;
        }

        md.push_str("## Top Picks\n\n");
        let groups: [(&str, Vec<&ScreenedStock>); 5] = [
            ("🔥🔥💎 Strong Buy - Optimal Entry", r.with_label("STRONG_BUY_EARLY")),
            ("🔥🔥✅ Strong Buy - Early Momentum", r.with_label("STRONG_BUY_EARLY_MOM")),
            ("🔥💎 Buy - Optimal Entry", r.with_label("BUY_EARLY")),
            ("⚡ Momentum (higher risk)", self.with_timing(ExtensionClass::Momentum)),
            ("⚠️ Extended - Wait for Pullback", r.with_label("WATCH_EXTENDED")),
        ];

        let mut any_optimal = false;
        for (i, (title, stocks)) in groups.iter().enumerate() {
            if stocks.is_empty() {
                continue;
            }
            if i < 3 {
                any_optimal = true;
            }
            md.push_str(&format!("### {}\n\n", title));
            push_pick_table(&mut md, stocks);
        }

        if !any_optimal {
            md.push_str("No optimal BUY/STRONG_BUY entries. Top scored stocks:\n\n");
            push_pick_table(&mut md, &r.top(self.top_n));
        }

        md.push_str("## Action Counts\n\n");
        md.push_str("| Action | Count |\n");
        md.push_str("|--------|-------|\n");
        for (action, count) in r.action_counts() {
            md.push_str(&format!("| {} | {} |\n", action, count));
        }
        md.push('\n');

        md.push_str(&format!(
            "Queued for deep analysis: {}\n\n",
            r.deep_analysis_queue().len()
        ));

        md.push_str("---\n\n");
        md.push_str(&format!(
            "*Report generated {} UTC*\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));

        md
    }

    fn with_timing(&self, class: ExtensionClass) -> Vec<&'a ScreenedStock> {
        self.result
            .stocks
            .iter()
            .filter(|s| s.decision.label.timing == Some(class) && s.decision.label.base.is_buy_class())
            .collect()
    }
}

fn push_pick_table(md: &mut String, stocks: &[&ScreenedStock]) {
    md.push_str("| Ticker | Price | Action | Val | Tech | Composite | Rally 6M | Entry Guidance |\n");
    md.push_str("|--------|-------|--------|-----|------|-----------|----------|----------------|\n");
    for stock in stocks {
        let ext = stock.extension.as_ref();
        md.push_str(&format!(
            "| {} | {:.2} | {} {} | {:.1} | {:.1} | {:.1} | {} | {} |\n",
            stock.ticker,
            stock.price,
            stock.decision.marker,
            stock.action_label(),
            stock.enhanced_valuation,
            stock.technical.score,
            stock.composite,
            ext.map_or_else(|| "-".to_string(), |e| format!("{:.1}%", e.metrics.rally_6m)),
            ext.map_or_else(|| "-".to_string(), |e| e.guidance_text()),
        ));
    }
    md.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Action, ActionDecision, ActionLabel};
    use crate::extension::{ExtensionAnalysis, ExtensionMetrics, RiskLevel};
    use crate::market::{Market, MarketSelection};
    use crate::scoring::{BonusScore, TechnicalScore, ValuationScore};
    use crate::screener::filter::{FilterResult, FilterStage};
    use crate::screener::pipeline::FundamentalSummary;
    use crate::screener::regime::MarketRegime;

    fn stock(ticker: &str, composite: f64, base: Action, timing: Option<ExtensionClass>) -> ScreenedStock {
        let extension = timing.map(|class| ExtensionAnalysis {
            classification: class,
            risk_level: class.risk_level(),
            metrics: ExtensionMetrics {
                rally_6m: 12.34,
                ..Default::default()
            },
            entry_guidance: vec!["Enter on strength".into()],
            reasoning: "Early stage".into(),
        });
        let label = ActionLabel { base, timing };
        ScreenedStock {
            ticker: ticker.into(),
            market: Market::Us,
            sector: "Technology".into(),
            industry: "Software".into(),
            price: 42.123,
            market_cap: Some(2_345_678_901.0),
            avg_volume: 900_000.0,
            valuation: ValuationScore {
                score: 80.0,
                breakdown: None,
            },
            bonus: BonusScore::default(),
            enhanced_valuation: 80.0,
            technical: TechnicalScore::insufficient(),
            composite,
            decision: ActionDecision {
                label,
                marker: base.marker().into(),
                reasoning: "Strong value".into(),
                needs_deep_analysis: base.needs_deep_analysis() && !label.is_extended(),
            },
            extension,
            fundamentals: FundamentalSummary {
                pe_ratio: Some(14.567),
                ..Default::default()
            },
        }
    }

    fn result(stocks: Vec<ScreenedStock>) -> ScanResult {
        let now = Utc::now();
        ScanResult {
            id: "scan_20240101_000000".into(),
            market: MarketSelection::Us,
            regime: MarketRegime::Bullish,
            benchmark: "SPY".into(),
            filter_results: vec![FilterResult::new(FilterStage::Input, 3, 3)],
            total_scanned: 3,
            stocks,
            filtered: vec![],
            skipped: vec![],
            config_summary: "market=US".into(),
            started_at: now,
            completed_at: now,
            duration_secs: 0.5,
        }
    }

    #[test]
    fn test_format_file_names() {
        assert_eq!(ReportFormat::Csv.file_name("stock_picks"), "stock_picks.csv");
        assert_eq!(ReportFormat::AiQueue.file_name("stock_picks"), "stock_picks_ai_queue.json");
        assert_eq!(ReportFormat::Markdown.file_name("x"), "x_summary.md");
        assert_eq!("md".parse::<ReportFormat>().unwrap(), ReportFormat::Markdown);
        assert!("pdf".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let r = result(vec![
            stock("AAA", 80.0, Action::StrongBuy, Some(ExtensionClass::Early)),
            stock("BBB", 60.0, Action::Watch, None),
        ]);
        let csv = ScanReport::new(&r).to_csv().unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Ticker,Market,Sector,Industry,Price,Market Cap (M)"));
        assert!(header.contains("Needs Deep Analysis"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("AAA,US,Technology,Software,42.12,2346.0,"));
        assert!(first.contains("STRONG_BUY_EARLY"));
        assert!(first.contains("EARLY,LOW"));

        let second = lines.next().unwrap();
        assert!(second.contains("WATCH"));
        assert!(second.contains("N/A"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_ai_queue_contains_only_flagged() {
        let r = result(vec![
            stock("AAA", 80.0, Action::StrongBuy, Some(ExtensionClass::EarlyMomentum)),
            stock("BBB", 75.0, Action::Buy, Some(ExtensionClass::Extended)),
            stock("CCC", 70.0, Action::Buy, Some(ExtensionClass::Early)),
        ]);
        let queue = ScanReport::new(&r).ai_queue();
        assert_eq!(queue.total_candidates, 2);
        assert_eq!(queue.market_regime, "bullish");
        assert_eq!(queue.market, "US");

        let first = &queue.stocks[0];
        assert_eq!(first.ticker, "AAA");
        assert_eq!(first.priority, 1);
        assert_eq!(first.action, "STRONG_BUY_EARLY_MOM");
        assert_eq!(first.risk_level, RiskLevel::Medium.to_string());
        assert_eq!(first.phase2_tasks.len(), 7);
        assert_eq!(first.rally_metrics.rally_6m, 12.3);
        assert_eq!(queue.stocks[1].priority, 2);
    }

    #[test]
    fn test_markdown_groups_and_counts() {
        let r = result(vec![
            stock("AAA", 80.0, Action::StrongBuy, Some(ExtensionClass::Early)),
            stock("BBB", 75.0, Action::Buy, Some(ExtensionClass::Extended)),
            stock("CCC", 70.0, Action::Buy, Some(ExtensionClass::Momentum)),
        ]);
        let md = ScanReport::new(&r).to_markdown();
        assert!(md.contains("**Market regime**: bullish"));
        assert!(md.contains("Strong Buy - Optimal Entry"));
        assert!(md.contains("Extended - Wait for Pullback"));
        assert!(md.contains("Momentum (higher risk)"));
        assert!(md.contains("| WATCH_EXTENDED | 1 |"));
        assert!(md.contains("| Universe | 3 | 0 | 0.0% |"));
        assert!(!md.contains("Zero candidates passed"));
    }

    #[test]
    fn test_markdown_empty_scan() {
        let r = result(vec![]);
        let md = ScanReport::new(&r).to_markdown();
        assert!(md.contains("Zero candidates passed"));
    }

    #[test]
    fn test_save_all_skips_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let r = result(vec![stock("BBB", 60.0, Action::Watch, None)]);
        let written = ScanReport::new(&r)
            .save_all(
                dir.path(),
                "stock_picks",
                &[ReportFormat::Csv, ReportFormat::AiQueue, ReportFormat::Markdown],
            )
            .unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("stock_picks.csv").exists());
        assert!(!dir.path().join("stock_picks_ai_queue.json").exists());
        assert!(dir.path().join("stock_picks_summary.md").exists());
    }
}
