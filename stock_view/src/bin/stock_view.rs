use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use stock_view::clock::{Clock, SystemClock};
use stock_view::config::{CONFIG_ENV_VAR, StockViewConfig, load_config_path};
use stock_view::controller::StateController;
use stock_view::models::{Instrument, Symbol, TimeSeriesPoint, sort_chronologically};
use stock_view::providers::Collaborators;
use stock_view::providers::memory::{
    FailureKind, MemoryCache, MemoryMarket, MemoryRemote, MemorySession,
};
use stock_view::series::{ChartOptions, build_chart};
use stock_view::{search, watchlist};

#[derive(Parser)]
#[command(version, about = "Stock view CLI")]
struct Cli {
    /// Config TOML; falls back to $STOCK_VIEW_CONFIG, then built-in defaults.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Filter an instrument list (JSON array) by prefix.
    Search {
        #[arg(long, value_name = "FILE")]
        instruments: PathBuf,
        #[arg(long)]
        query: Option<String>,
    },
    /// Window and shape a series (JSON array of points) for charting.
    Series {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        days: Option<i64>,
        #[arg(long)]
        percentage: bool,
    },
    /// Reconcile a remote watch list with the local cache file.
    Watchlist(WatchlistCmd),
}

#[derive(Args)]
struct WatchlistCmd {
    /// Remote watch list (JSON array of symbols).
    #[arg(long, value_name = "FILE")]
    remote: PathBuf,
    /// Local cache (JSON array of symbols); created if missing.
    #[arg(long, value_name = "FILE")]
    cache: PathBuf,
    /// Symbols to add after reconciling.
    #[arg(long = "add", value_name = "SYMBOL")]
    add: Vec<String>,
    /// Print the merge result without touching the cache file.
    #[arg(long)]
    dry_run: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
}

fn load_config(explicit: Option<PathBuf>) -> Result<StockViewConfig> {
    match shared_utils::config::resolve_config_path(explicit, CONFIG_ENV_VAR, false)? {
        Some(path) => load_config_path(path),
        None => Ok(StockViewConfig::default()),
    }
}

async fn run_watchlist(cmd: WatchlistCmd, config: StockViewConfig) -> Result<()> {
    let remote: Vec<Symbol> = read_json(&cmd.remote)?;
    let cache = if cmd.cache.exists() {
        MemoryCache::new(read_json(&cmd.cache)?)
    } else {
        MemoryCache::default().failing_read(FailureKind::Unavailable)
    };

    if cmd.dry_run {
        let cached = if cmd.cache.exists() {
            cache.stored().await
        } else {
            Vec::new()
        };
        println!("{}", watchlist::merge(&remote, &cached));
        return Ok(());
    }

    // Reads fall back to an empty list for a missing cache, writes still land.
    let cache = Arc::new(cache);
    let market = Arc::new(MemoryMarket::new(Vec::new()));
    let collab = Collaborators {
        instruments: market.clone(),
        series: market,
        remote: Arc::new(MemoryRemote::new(remote)),
        cache: cache.clone(),
        session: Arc::new(MemorySession::signed_out()),
    };
    let (mut ctrl, _teardown) = StateController::new(collab, Arc::new(SystemClock), config)?;
    ctrl.initialize().await?;

    for raw in &cmd.add {
        let out = ctrl.add_to_watchlist(raw).await?;
        if !out.inserted {
            println!("{} already watched", out.symbol);
        }
    }

    let report = ctrl.settle().await;
    let written = report.written.len();
    if let Err(e) = report.into_result() {
        eprintln!("warning: cache not fully updated: {e}");
    }

    let stored = cache.stored().await;
    std::fs::write(&cmd.cache, serde_json::to_string_pretty(&stored)?)
        .with_context(|| format!("write {}", cmd.cache.display()))?;

    for s in ctrl.watchlist().symbols() {
        println!("{s}");
    }
    println!("{written} written to cache");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.cmd {
        Cmd::Search { instruments, query } => {
            let all: Vec<Instrument> = read_json(&instruments)?;
            for inst in search::filter(&all, query.as_deref(), config.match_mode) {
                println!("{:<8} {:<32} {}", inst.symbol, inst.name, inst.industry);
            }
        }
        Cmd::Series {
            file,
            days,
            percentage,
        } => {
            let mut points: Vec<TimeSeriesPoint> = read_json(&file)?;
            sort_chronologically(&mut points);
            let chart = build_chart(
                &points,
                days.or(config.default_day_window),
                percentage,
                &ChartOptions::from(&config),
                SystemClock.now(),
            )?;
            println!("{}", serde_json::to_string_pretty(&chart)?);
        }
        Cmd::Watchlist(cmd) => run_watchlist(cmd, config).await?,
    }

    Ok(())
}
