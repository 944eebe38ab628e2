//! Gems Screener - scan an equity universe for undervalued, technically
//! healthy small and mid caps.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use gems_common::config::Config;
use gems_common::logging::init_logging;
use gems_screener::data::{DataProvider, SnapshotProvider, YahooAdapter};
use gems_screener::market::MarketSelection;
use gems_screener::screener::{ReportFormat, ScanConfig, ScanReport, ScanResult, ScreenerEngine};

#[derive(Parser, Debug)]
#[command(name = "gems-screener")]
#[command(author = "theonlyhennygod")]
#[command(version = "0.1.0")]
#[command(about = "Hidden gems equity screener with entry-timing analysis", long_about = None)]
struct Cli {
    /// Market to scan: US, INDIA or BOTH
    #[arg(short, long)]
    market: Option<MarketSelection>,

    /// Output file stem (defaults to the market's stem)
    #[arg(short, long)]
    output: Option<String>,

    /// Skip the AI queue JSON
    #[arg(long)]
    no_json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ~/.gems/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read snapshot files from this directory instead of the network
    #[arg(long)]
    data_dir: Option<String>,

    /// Tickers fetched concurrently
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_with_env(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.use_snapshot_dir(dir.clone());
    }
    if let Some(n) = cli.concurrency {
        config.data.concurrency = n;
    }

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.observability.log_level.as_str()
    };
    init_logging(log_level, &config.observability.log_format);

    tracing::info!("Gems Screener v{}", env!("CARGO_PKG_VERSION"));

    let selection = match (cli.market, config.screener.market.as_deref()) {
        (Some(selection), _) => selection,
        (None, Some(raw)) => raw.parse().map_err(|e: String| anyhow!(e))?,
        (None, None) => MarketSelection::default(),
    };

    let scan = Arc::new(ScanConfig::from_config(&config, selection));

    let result = match config.data.provider.as_str() {
        "snapshot" => {
            let dir = config
                .data
                .snapshot_dir
                .clone()
                .context("Snapshot provider selected but no snapshot directory configured")?;
            run_scan(scan.clone(), SnapshotProvider::new(gems_common::config::expand_path(&dir))).await?
        }
        "yahoo" => {
            let adapter = YahooAdapter::from_config(&config).context("Failed to create Yahoo adapter")?;
            run_scan(scan.clone(), adapter).await?
        }
        other => return Err(anyhow!("Unknown data provider: {}", other)),
    };

    let stem = cli
        .output
        .clone()
        .unwrap_or_else(|| scan.profile.output_stem.clone());
    let mut formats = vec![ReportFormat::Csv];
    if config.output.write_ai_queue && !cli.no_json {
        formats.push(ReportFormat::AiQueue);
    }
    if config.output.write_markdown {
        formats.push(ReportFormat::Markdown);
    }

    let report = ScanReport::new(&result).with_top_n(config.output.top_n);
    let report_dir = config.output.report_path();
    if result.stocks.is_empty() {
        tracing::warn!("Zero candidates passed, no CSV written");
    } else {
        for path in report.save_all(&report_dir, &stem, &formats)? {
            tracing::info!(path = %path.display(), "Report written");
        }
    }

    println!("{}", report.to_markdown());
    tracing::info!("{}", result.summary());

    Ok(())
}

async fn run_scan<P: DataProvider>(scan: Arc<ScanConfig>, provider: P) -> Result<ScanResult> {
    let engine = ScreenerEngine::new(scan, Arc::new(provider))?;
    engine.run().await
}
