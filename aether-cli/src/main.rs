//! Aether CLI: stock data, indicators and next-close prediction.
//!
//! Commands:
//! - `predict`: fetch, enrich, train and print the next-close outlook
//! - `fetch`: fetch and enrich only; print the fetch trace and latest rows
//! - `status`: probe each data provider with a live request
//! - `tickers`: list the curated ticker catalog
//! - `export`: write the enriched series to `{TICKER}_stock_data_{YYYYMMDD}.csv`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use aether_core::data::{
    AttemptOutcome, ConnectionStatus, FetchTrace, StockInfo, TickerCatalog,
};
use aether_core::domain::{Period, SourcePreference};
use aether_core::features::EnrichedSeries;
use aether_runner::{
    export_to_dir, AnalysisReport, AnalysisSession, AppConfig, ConfigError, PriceSummary,
    TrainedModel,
};

#[derive(Parser)]
#[command(name = "aether", about = "Aether: stock data and next-close prediction")]
struct Cli {
    /// Path to a TOML config file. Defaults to ./aether.toml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct FetchArgs {
    /// Ticker symbol (e.g. AAPL, RELIANCE.NSE).
    ticker: String,

    /// History period: 1mo, 3mo, 6mo, 1y, 2y, 5y. Defaults to the config value.
    #[arg(long)]
    period: Option<String>,

    /// Data source: auto, yahoo, alpha_vantage, polygon. Defaults to the config value.
    #[arg(long)]
    source: Option<String>,

    /// Skip every provider and use sample data.
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on the ticker's history and predict the next close.
    Predict {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Number of feature importances to show.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Print the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch and enrich the ticker's history without training.
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Number of most recent rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Check which data providers are reachable.
    Status,
    /// List the curated tickers.
    Tickers {
        /// Only this market (e.g. "US Markets").
        #[arg(long)]
        market: Option<String>,

        /// Load the catalog from a TOML file instead of the built-in list.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Export the enriched series as CSV.
    Export {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Commands::Predict { fetch, top, json } => run_predict(&config, &fetch, top, json),
        Commands::Fetch { fetch, rows } => run_fetch(&config, &fetch, rows),
        Commands::Status => run_status(&config),
        Commands::Tickers { market, catalog } => {
            run_tickers(market.as_deref(), catalog.as_deref())
        }
        Commands::Export { fetch, out } => run_export(&config, &fetch, &out),
    }
}

/// Apply command-line overrides and build the session.
fn session_for(config: &AppConfig, args: &FetchArgs) -> Result<(AnalysisSession, Period)> {
    let mut config = config.clone();
    if let Some(source) = &args.source {
        config.data.source = source
            .parse::<SourcePreference>()
            .map_err(ConfigError::from)?;
    }
    let period = match &args.period {
        Some(p) => p.parse::<Period>().map_err(ConfigError::from)?,
        None => config.data.period,
    };
    tracing::info!(
        ticker = %args.ticker,
        period = %period,
        source = %config.data.source,
        offline = args.offline,
        "starting session"
    );
    let session = if args.offline {
        AnalysisSession::offline(&config)
    } else {
        AnalysisSession::from_config(&config)
    };
    Ok((session, period))
}

fn run_predict(config: &AppConfig, args: &FetchArgs, top: usize, json: bool) -> Result<()> {
    let (session, period) = session_for(config, args)?;
    let report = session.analyze(&args.ticker, period)?;

    if json {
        println!("{}", report_json(&report)?);
        return Ok(());
    }

    print_header(&report.ticker, &report.info, period);
    print_trace(&report.resolution.trace);
    println!("Data source:    {}", report.source());
    if report.source().is_synthetic() {
        println!("WARNING: all providers failed; showing SAMPLE data");
    }
    if let Some(summary) = &report.summary {
        print_summary(summary, &report.info);
    }

    match &report.model {
        Ok(model) => print_model(&report, model, top),
        Err(e) => {
            println!();
            println!("Prediction unavailable: {e}");
            println!("Try a longer period (at least 3 months of data is needed).");
        }
    }
    println!();
    println!("This prediction is for educational purposes only and is not financial advice.");
    Ok(())
}

fn run_fetch(config: &AppConfig, args: &FetchArgs, rows: usize) -> Result<()> {
    let (session, period) = session_for(config, args)?;
    let (resolution, enriched) = session.fetch(&args.ticker, period)?;
    let info = aether_core::data::stock_info(enriched.ticker());

    print_header(enriched.ticker(), &info, period);
    print_trace(&resolution.trace);
    println!(
        "Data source:    {} ({} raw rows, {} enriched)",
        resolution.source,
        resolution.series.len(),
        enriched.len()
    );
    println!("Dataset hash:   {}", &resolution.series.content_hash()[..12]);
    if let Some(summary) = PriceSummary::compute(&resolution.series, Some(&enriched)) {
        print_summary(&summary, &info);
    }
    print_rows(&enriched, rows);
    Ok(())
}

fn run_status(config: &AppConfig) -> Result<()> {
    let session = AnalysisSession::from_config(config);
    let statuses: Vec<ConnectionStatus> = session.orchestrator().check_connections();
    println!("{:<16} {:<12} Details", "Provider", "Status");
    println!("{}", "-".repeat(60));
    for s in &statuses {
        let state = if s.working { "working" } else { "not working" };
        println!("{:<16} {:<12} {}", s.provider.display_name(), state, s.message);
    }
    Ok(())
}

fn run_tickers(market: Option<&str>, catalog_path: Option<&Path>) -> Result<()> {
    let catalog = match catalog_path {
        Some(p) => TickerCatalog::from_file(p)
            .with_context(|| format!("failed to load catalog {}", p.display()))?,
        None => TickerCatalog::builtin(),
    };
    let markets: Vec<_> = match market {
        Some(name) => vec![catalog
            .market(name)
            .with_context(|| format!("unknown market '{name}'"))?],
        None => catalog.markets.iter().collect(),
    };
    for m in markets {
        println!("{} ({} tickers)", m.name, m.tickers.len());
        for entry in &m.tickers {
            println!("  {:<14} {}", entry.symbol, entry.name);
        }
        println!();
    }
    Ok(())
}

fn run_export(config: &AppConfig, args: &FetchArgs, out: &Path) -> Result<()> {
    let (session, period) = session_for(config, args)?;
    let (resolution, enriched) = session.fetch(&args.ticker, period)?;
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let today = chrono::Local::now().date_naive();
    let path = export_to_dir(&enriched, out, today)?;
    println!(
        "Exported {} rows ({}) to {}",
        enriched.len(),
        resolution.source,
        path.display()
    );
    Ok(())
}

// ─── Rendering ──────────────────────────────────────────────────────

fn print_header(ticker: &str, info: &StockInfo, period: Period) {
    println!();
    println!("=== {} ({}) ===", info.name, ticker);
    println!("Sector:         {} / {}", info.sector, info.industry);
    println!("Currency:       {}", info.currency);
    println!("Period:         {period}");
}

fn print_trace(trace: &FetchTrace) {
    println!();
    println!("--- Fetch trace ---");
    for attempt in trace.iter() {
        let mark = match attempt.outcome {
            AttemptOutcome::Success => "+",
            AttemptOutcome::Failed => "x",
            AttemptOutcome::Skipped => "-",
        };
        println!("  {mark} {}", attempt.message);
    }
    println!();
}

fn print_summary(s: &PriceSummary, info: &StockInfo) {
    let c = info.currency.symbol();
    println!();
    println!("--- Summary ---");
    println!(
        "Current price:  {c}{:.2} ({:+.2}, {:+.2}%)",
        s.current_price, s.change, s.change_pct
    );
    println!("Volume:         {}", s.volume);
    match s.volatility_pct {
        Some(v) => println!("Volatility:     {v:.1}% annualized"),
        None => println!("Volatility:     n/a"),
    }
    println!("Period high:    {c}{:.2}", s.period_high);
    println!("Period low:     {c}{:.2}", s.period_low);
    println!("Avg volume:     {:.0}", s.avg_volume);
    if let Some(rsi) = s.latest_rsi {
        println!("RSI (14):       {rsi:.1}");
    }
}

fn print_model(report: &AnalysisReport, model: &TrainedModel, top: usize) {
    let m = model.metrics();
    println!();
    println!("--- Model ---");
    println!("Train/test:     {} / {} rows", m.train_size, m.test_size);
    println!("RMSE:           {:.4} train, {:.4} test", m.train_rmse, m.test_rmse);
    println!("MAE:            {:.4} train, {:.4} test", m.train_mae, m.test_mae);
    println!("R²:             {:.4} train, {:.4} test", m.train_r2, m.test_r2);
    println!("Quality:        {}", m.quality());

    println!();
    println!("Top features:");
    for (rank, f) in model.top_importances(top).iter().enumerate() {
        println!("  {:>2}. {:<14} {:.4}", rank + 1, f.feature, f.importance);
    }

    if let Some(o) = report.outlook() {
        let c = report.info.currency.symbol();
        println!();
        println!("--- Outlook ---");
        println!("Last close:     {c}{:.2}", o.last_close);
        println!("Predicted:      {c}{:.2}", o.predicted);
        println!("Expected:       {:+.2} ({:+.2}%)", o.change, o.change_pct);
        println!("Signal:         {}", o.signal);
    }
}

fn print_rows(series: &EnrichedSeries, n: usize) {
    if series.is_empty() {
        println!();
        println!("No complete rows: the period is shorter than the 50-day warmup.");
        return;
    }
    println!();
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>7} {:>9}",
        "Date", "Close", "MA_20", "MA_50", "RSI", "Change%"
    );
    let start = series.len().saturating_sub(n);
    for r in &series.rows()[start..] {
        println!(
            "{:<10} {:>10.2} {:>10.2} {:>10.2} {:>7.1} {:>9.2}",
            r.date,
            r.close,
            r.ma_20,
            r.ma_50,
            r.rsi,
            r.price_change * 100.0
        );
    }
}

fn report_json(report: &AnalysisReport) -> Result<String> {
    let model = report.trained();
    let value = serde_json::json!({
        "ticker": report.ticker,
        "period": report.period,
        "source": report.source().id(),
        "trace": report.resolution.trace,
        "info": report.info,
        "rows": report.enriched.len(),
        "summary": report.summary,
        "metrics": model.map(|m| m.metrics()),
        "importances": model.map(|m| m.importances()),
        "outlook": report.outlook(),
        "error": report.model.as_ref().err().map(|e| e.to_string()),
    });
    serde_json::to_string_pretty(&value).context("failed to serialize report")
}
