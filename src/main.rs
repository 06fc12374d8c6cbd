use analyzer::Insights;
use anyhow::{Context, Result, bail};
use api_client::loader::PCT_CHANGE_SUFFIX;
use api_client::{FredClient, IndicatorLoader, SeriesCache};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{Config, LoggingSettings, OutputFormat, load_config, logging};
use core_types::{IndicatorSet, MonthlySeries};
use engine::{AnalysisBundle, AnalysisEngine};
use indicatif::ProgressStyle;
use ingest::{SalesColumns, load_sales_csv, read_indicator_csv, write_indicator_csv};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// The main entry point for the leadlag analysis tool.
#[tokio::main]
async fn main() -> Result<()> {
    // A .env file is optional; it usually only carries FRED_API_KEY.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config).await,
        Commands::Fetch(args) => handle_fetch(args, &config).await,
        Commands::Catalog => {
            handle_catalog(&config);
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Correlation and lead/lag analysis of monthly sales against economic indicators.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (default: ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correlate a sales file against indicators and rank the relationships.
    Analyze(AnalyzeArgs),
    /// Download the indicator catalog from FRED into a wide CSV file.
    Fetch(FetchArgs),
    /// List the configured indicator catalog.
    Catalog,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// CSV file with the monthly (or finer) sales figures.
    #[arg(long)]
    sales: PathBuf,

    /// Name of the date column; guessed from the header when omitted.
    #[arg(long)]
    date_column: Option<String>,

    /// Name of the sales column; guessed from the header when omitted.
    #[arg(long)]
    sales_column: Option<String>,

    /// Read indicators from a wide CSV (as written by `fetch`) instead of FRED.
    #[arg(long)]
    indicators_csv: Option<PathBuf>,

    /// Indicator to include; repeat for several. Defaults to every loaded indicator.
    #[arg(long = "indicator")]
    indicators: Vec<String>,

    /// Trailing window in months. Defaults to `analysis.lookback_months`.
    #[arg(long)]
    lookback: Option<u32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Parser)]
struct FetchArgs {
    /// Destination CSV file.
    #[arg(long)]
    output: PathBuf,

    /// Restrict the download to these catalog entries.
    #[arg(long = "indicator")]
    indicators: Vec<String>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber. Log lines are routed through the progress-bar
/// layer so spinners and messages do not interleave on stderr.
fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let indicatif_layer = IndicatifLayer::new().with_progress_style(
        ProgressStyle::with_template("{spinner:.green} {span_name} {span_fields} [{elapsed}]")
            .context("Invalid progress template")?,
    );

    let (file_layer, guard) = match logging::file_writer(settings) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(logging::env_filter(settings))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> Result<()> {
    let columns = SalesColumns {
        date: args.date_column,
        sales: args.sales_column,
    };
    let sales = load_sales_csv(&args.sales, &columns)
        .with_context(|| format!("Failed to load sales from {}", args.sales.display()))?;

    let indicators = match &args.indicators_csv {
        Some(path) => read_indicator_csv(path)
            .with_context(|| format!("Failed to read indicators from {}", path.display()))?,
        None => fetch_indicators(config, &[]).await?,
    };

    let selected = if args.indicators.is_empty() {
        indicators
            .keys()
            .filter(|name| **name != config.analysis.target_name)
            .cloned()
            .collect()
    } else {
        args.indicators
    };
    let lookback = args.lookback.unwrap_or(config.analysis.lookback_months);

    info!(
        months = sales.len(),
        indicators = selected.len(),
        lookback,
        "Running analysis"
    );
    let engine = AnalysisEngine::new(&config.analysis);
    let bundle = engine.run_full_analysis(&indicators, &sales, &selected, lookback)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&bundle)?),
        OutputFormat::Table => print_report(&bundle, &sales),
    }
    Ok(())
}

async fn handle_fetch(args: FetchArgs, config: &Config) -> Result<()> {
    let indicators = fetch_indicators(config, &args.indicators).await?;
    write_indicator_csv(&args.output, &indicators)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Wrote {} indicator series to {}",
        indicators.len(),
        args.output.display()
    );
    Ok(())
}

fn handle_catalog(config: &Config) {
    let mut table = new_table(&["Indicator", "FRED series", "Derived change series"]);
    for spec in &config.fred.indicators {
        let derived = if config.fred.pct_change.contains(&spec.name) {
            format!("{}{PCT_CHANGE_SUFFIX}", spec.name)
        } else {
            String::new()
        };
        table.add_row(vec![spec.name.clone(), spec.series_id.clone(), derived]);
    }
    println!("{table}");
}

/// Loads indicators from FRED through a fresh cache.
async fn fetch_indicators(config: &Config, only: &[String]) -> Result<IndicatorSet> {
    let client = FredClient::new(&config.fred).context("Cannot reach FRED")?;
    let cache = Arc::new(SeriesCache::new(config.fred.cache_ttl));
    let mut loader = IndicatorLoader::new(Arc::new(client), cache, &config.fred);
    if !only.is_empty() {
        loader = loader.only(only);
        if loader.catalog().is_empty() {
            bail!("None of {:?} is in the indicator catalog", only);
        }
    }
    Ok(loader.load().await?)
}

// ==============================================================================
// Table Output
// ==============================================================================

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h)));
    table
}

fn print_report(bundle: &AnalysisBundle, sales: &MonthlySeries) {
    let meta = &bundle.metadata;
    println!(
        "Analysis period: {} ({} month look-back, lags ±{}, {} sales months loaded)",
        meta.period,
        meta.lookback_months,
        meta.lag_window,
        sales.len()
    );

    let mut top = new_table(&["Rank", "Indicator", "r", "p-value", "n", "Strength"]);
    for row in &bundle.top_correlations {
        top.add_row(vec![
            row.rank.to_string(),
            row.indicator.clone(),
            format!("{:.3}", row.correlation),
            format!("{:.4}", row.p_value),
            row.n_observations.to_string(),
            row.strength.to_string(),
        ]);
    }
    println!("\nTop correlations with {}\n{top}", meta.target_name);

    let mut lagged = new_table(&["Rank", "Indicator", "Lag", "r", "Relationship"]);
    for row in &bundle.top_lagged_correlations {
        lagged.add_row(vec![
            row.rank.to_string(),
            row.indicator.clone(),
            row.lag.to_string(),
            format!("{:.3}", row.correlation),
            row.lead_lag.describe(&row.indicator, &meta.target_name),
        ]);
    }
    println!("\nTop lagged correlations\n{lagged}");

    if let Some(matrix) = &bundle.correlation_matrix {
        let mut header = vec![""];
        header.extend(matrix.labels().iter().map(String::as_str));
        let mut table = new_table(&header);
        for (label, row) in matrix.labels().iter().zip(matrix.rows()) {
            let mut cells = vec![label.clone()];
            cells.extend(row.iter().map(|cell| match cell {
                Some(r) => format!("{r:.2}"),
                None => "n/a".to_string(),
            }));
            table.add_row(cells);
        }
        println!(
            "\nCorrelation matrix ({} joint months)\n{table}",
            matrix.n_observations()
        );
    }

    if !bundle.skipped.is_empty() {
        let mut skipped = new_table(&["Skipped indicator", "Reason"]);
        for entry in &bundle.skipped {
            skipped.add_row(vec![entry.indicator.clone(), entry.detail.clone()]);
        }
        println!("\n{skipped}");
    }

    print_insights(&bundle.insights);
}

fn print_insights(insights: &Insights) {
    println!();
    if let Some(line) = &insights.strongest_correlation {
        println!("Strongest correlation: {line}");
    }
    if let Some(line) = &insights.best_predictive_relationship {
        println!("Best predictive relationship: {line}");
    }
}
