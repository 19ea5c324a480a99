//! Ronda CLI binary.
//!
//! Command-line interface for the ronda cross-sectional evaluation engine.

mod data;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use ronda_curve::{analyze, rebase, Reference};
use ronda_data::{feature_coverage, price_coverage, CatalogQuery};
use ronda_eval::{EvalRequest, FeatureReport, PanelEvaluator};
use ronda_traits::{parse_iso_date, CorrMethod, FeatureSource, PriceProvider, TargetKind};

use data::Workspace;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Cross-sectional feature evaluation engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Data root directory (calendars/, instruments/, prices/, tables/)
    #[arg(long)]
    data_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show data-root status: calendar span, universes, loaded tables
    Status,

    /// List known features
    Catalog {
        /// Case-insensitive substring filter on the feature name
        #[arg(short, long)]
        query: Option<String>,

        /// Filter by originating table
        #[arg(short, long)]
        source: Option<String>,

        /// Maximum number of listed features
        #[arg(short, long)]
        limit: Option<usize>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Evaluate features against forward returns
    Eval {
        /// Feature names, comma separated
        #[arg(short, long, value_delimiter = ',')]
        features: Vec<String>,

        /// Universe: a named group (all, indexes) or comma-separated tickers
        #[arg(short, long, default_value = "all")]
        universe: String,

        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Forward horizon in trading days
        #[arg(short = 'H', long, default_value = "1")]
        horizon: usize,

        /// Target kind (ret_cc, close_open, open_open)
        #[arg(short, long, default_value = "ret_cc")]
        kind: String,

        /// Correlation method (pearson, spearman)
        #[arg(short, long, default_value = "spearman")]
        method: String,

        /// Rolling window over the daily IC series
        #[arg(short, long, default_value = "20")]
        window: usize,

        /// Emit the full report as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },

    /// Extract drawdown episodes from an equity-curve JSON file
    Drawdowns {
        /// Curve file: {"dates": [...], "equity": [...]}
        curve: PathBuf,

        /// Number of episodes to show, most severe first
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rebase a reference series onto an instrument's price level
    Rebase {
        /// Instrument whose price level anchors the rebasing
        instrument: String,

        /// Reference market index ticker (close-price rebasing)
        #[arg(long, conflicts_with = "factor")]
        index: Option<String>,

        /// Reference factor-return feature (cumulative chain rebasing)
        #[arg(long, requires = "factor_key")]
        factor: Option<String>,

        /// Instrument key the factor-return series is stored under
        #[arg(long)]
        factor_key: Option<String>,

        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Report bar or feature coverage of one instrument over a range
    Coverage {
        /// Instrument ticker
        instrument: String,

        /// Feature names to align instead of price bars, comma separated
        #[arg(short, long, value_delimiter = ',')]
        features: Vec<String>,

        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ronda=info".into()),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let workspace = Workspace::open(&cli.data_root)?;

    match cli.command {
        Commands::Status => status(&workspace),
        Commands::Catalog {
            query,
            source,
            limit,
            json,
        } => catalog(&workspace, query, source, limit, json),
        Commands::Eval {
            features,
            universe,
            from,
            to,
            horizon,
            kind,
            method,
            window,
            json,
        } => eval(
            &workspace, features, &universe, &from, &to, horizon, &kind, &method, window, json,
        ),
        Commands::Drawdowns { curve, top, json } => drawdowns(&curve, top, json),
        Commands::Rebase {
            instrument,
            index,
            factor,
            factor_key,
            from,
            to,
            json,
        } => rebase_cmd(
            &workspace,
            &instrument,
            index.as_deref(),
            factor.as_deref(),
            factor_key.as_deref(),
            &from,
            &to,
            json,
        ),
        Commands::Coverage {
            instrument,
            features,
            from,
            to,
            json,
        } => coverage(&workspace, &instrument, &features, &from, &to, json),
    }
}

fn status(workspace: &Workspace) -> Result<()> {
    let dates = workspace.calendar.dates();
    println!("Calendar: {} trading days", dates.len());
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        println!("  span: {first} .. {last}");
    }
    println!(
        "Universe: {} equities, {} indexes",
        workspace.universe.resolve("all")?.len(),
        workspace.universe.indexes().len()
    );
    println!("Features: {} known", workspace.store.catalog().len());
    for table in workspace.store.tables() {
        println!("  table: {table}");
    }
    for table in &workspace.missing_tables {
        println!("  missing: {table}");
    }
    Ok(())
}

fn catalog(
    workspace: &Workspace,
    query: Option<String>,
    source: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let page = workspace.store.search(&CatalogQuery {
        query,
        source,
        limit,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page.features)?);
        return Ok(());
    }

    for meta in &page.features {
        println!("{:32} {:24} {}", meta.name, meta.source, meta.dtype);
    }
    println!(
        "\n{} shown, {} matched, {} total",
        page.features.len(),
        page.matched,
        page.total
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn eval(
    workspace: &Workspace,
    features: Vec<String>,
    universe: &str,
    from: &str,
    to: &str,
    horizon: usize,
    kind: &str,
    method: &str,
    window: usize,
    json: bool,
) -> Result<()> {
    let request = EvalRequest {
        features,
        universe: workspace.universe.resolve(universe)?,
        from: parse_iso_date(from, "from")?,
        to: parse_iso_date(to, "to")?,
        horizon,
        kind: kind.parse::<TargetKind>()?,
        method: method.parse::<CorrMethod>()?,
        window,
    };

    let evaluator = PanelEvaluator::new(&workspace.calendar, &workspace.prices, &workspace.store);
    let report = evaluator.evaluate(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Evaluated {} feature(s) over {} valid dates ({} .. {}, horizon {}, {}, {})",
        report.features.len(),
        report.valid_dates.len(),
        from,
        to,
        horizon,
        request.kind,
        request.method,
    );
    for feature in &report.features {
        print_feature_summary(feature);
    }
    Ok(())
}

fn print_feature_summary(feature: &FeatureReport) {
    fn fmt(value: Option<f64>) -> String {
        value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
    }

    println!("\n{} (source: {})", feature.feature, feature.source);
    println!("  days with IC: {}", feature.summary.days);
    println!("  mean IC:      {}", fmt(feature.summary.mean));
    println!("  IC std:       {}", fmt(feature.summary.std));
    println!("  IR:           {}", fmt(feature.summary.ir));
    println!("  t-stat:       {}", fmt(feature.summary.t_stat));
    println!("  hit rate:     {}", fmt(feature.summary.hit_rate));
    println!(
        "  decile spread: {} over {} day(s)",
        fmt(feature.deciles.spread),
        feature.deciles.days
    );
}

#[derive(Debug, Deserialize)]
struct CurveFile {
    dates: Vec<String>,
    equity: Vec<f64>,
}

fn drawdowns(curve: &Path, top: usize, json: bool) -> Result<()> {
    let raw = fs::read_to_string(curve)
        .with_context(|| format!("reading curve file {}", curve.display()))?;
    let file: CurveFile = serde_json::from_str(&raw)?;

    let dates = file
        .dates
        .iter()
        .map(|d| parse_iso_date(d, "dates"))
        .collect::<ronda_traits::Result<Vec<_>>>()?;

    let report = analyze(&dates, &file.equity);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Max drawdown: {:.2}%", report.max_drawdown() * 100.0);
    for event in report.top(top) {
        let recovery = event
            .recovery
            .map_or_else(|| "unrecovered".to_string(), |d| d.to_string());
        println!(
            "  {:.2}%  {} -> trough {} ({} d) -> {}  length {}",
            event.depth * 100.0,
            event.start,
            event.trough,
            event.days_to_trough,
            recovery,
            event.length,
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn rebase_cmd(
    workspace: &Workspace,
    instrument: &str,
    index: Option<&str>,
    factor: Option<&str>,
    factor_key: Option<&str>,
    from: &str,
    to: &str,
    json: bool,
) -> Result<()> {
    let from = parse_iso_date(from, "from")?;
    let to = parse_iso_date(to, "to")?;
    let requested = workspace.calendar.slice(from, to)?;

    let instrument_closes = close_map(&workspace.prices, instrument, from, to)?;

    let reference = match (index, factor) {
        (Some(index), None) => Reference::Close(close_map(&workspace.prices, index, from, to)?),
        (None, Some(factor)) => {
            let key = factor_key.context("--factor requires --factor-key")?;
            let returns: BTreeMap<_, _> = workspace
                .store
                .series(factor, key, from, to)?
                .into_iter()
                .filter_map(|(date, value)| value.map(|v| (date, v)))
                .collect();
            Reference::FactorReturns(returns)
        }
        _ => bail!("exactly one of --index or --factor is required"),
    };

    let series = rebase(requested, &instrument_closes, &reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    println!(
        "Base: {} close {:.4}",
        series.base_date, series.base_close
    );
    for (date, value) in &series.points {
        match value {
            Some(v) => println!("  {date}  {v:.4}"),
            None => println!("  {date}  -"),
        }
    }
    Ok(())
}

fn close_map(
    prices: &impl PriceProvider,
    instrument: &str,
    from: ronda_traits::Date,
    to: ronda_traits::Date,
) -> Result<BTreeMap<ronda_traits::Date, f64>> {
    Ok(prices
        .bars(instrument, from, to)?
        .into_iter()
        .filter_map(|bar| bar.close.map(|close| (bar.date, close)))
        .collect())
}

fn coverage(
    workspace: &Workspace,
    instrument: &str,
    features: &[String],
    from: &str,
    to: &str,
    json: bool,
) -> Result<()> {
    let from = parse_iso_date(from, "from")?;
    let to = parse_iso_date(to, "to")?;
    let sliced = workspace.calendar.slice(from, to)?;

    let report = if features.is_empty() {
        let bars = workspace.prices.bars(instrument, from, to)?;
        price_coverage(sliced, &bars)
    } else {
        let mut series = Vec::with_capacity(features.len());
        for name in features {
            let rows = workspace.store.series(name, instrument, from, to)?;
            series.push((name.clone(), rows));
        }
        feature_coverage(sliced, &series)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let unit = if features.is_empty() {
        "without any bar"
    } else {
        "with every feature missing"
    };
    println!(
        "{}: {} calendar days, {} {}",
        instrument,
        report.days,
        report.missing_dates.len(),
        unit
    );
    for field in &report.fields {
        println!(
            "  {:8} missing {:4} ({:.1}%)",
            field.field,
            field.missing,
            field.ratio * 100.0
        );
    }
    Ok(())
}
