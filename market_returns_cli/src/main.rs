mod commands;
mod output;
mod xml_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use market_returns_lib::timezone::{now_in, parse_as_of};
use market_returns_lib::{DashboardConfig, PriceProvider, YahooProvider};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "market-returns")]
#[command(about = "Month, quarter and year-to-date returns for tracked market indices")]
struct Cli {
    /// Output format: table, json, csv, markdown, xml
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// TOML file listing the tracked indices (defaults to the built-in list)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference timezone, e.g. America/New_York (overrides MARKET_RETURNS_TZ)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// As-of date (YYYY-MM-DD) or RFC 3339 timestamp; defaults to now
    #[arg(long, global = true)]
    as_of: Option<String>,

    /// Only show this symbol (repeatable)
    #[arg(long = "symbol", global = true)]
    symbols: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show MTD, QTD and YTD returns for each tracked index
    Returns,
    /// Show the year-to-date price history behind the performance chart
    History(commands::history::HistoryArgs),
    /// Describe the tracked indices
    Indices,
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(cli.config.as_deref())?;

    let tz_override = cli
        .timezone
        .clone()
        .or_else(|| std::env::var("MARKET_RETURNS_TZ").ok())
        .filter(|tz| !tz.trim().is_empty());
    if let Some(tz) = tz_override {
        config = config.with_timezone(&tz)?;
    }

    config = config.select_symbols(&cli.symbols)?;
    Ok(config)
}

fn build_provider(config: &DashboardConfig, tz: Tz) -> Arc<dyn PriceProvider> {
    match std::env::var("MARKET_RETURNS_BASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            tracing::info!("using provider base URL {}", url.trim());
            Arc::new(YahooProvider::with_base_url(url.trim(), tz, config.price_field))
        }
        _ => Arc::new(YahooProvider::new(tz, config.price_field)),
    }
}

fn resolve_as_of(raw: Option<&str>, tz: Tz) -> Result<DateTime<Tz>> {
    match raw {
        Some(s) => Ok(parse_as_of(s, tz)?),
        None => Ok(now_in(tz)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_returns=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format: OutputFormat = cli.output.parse()?;
    let config = load_config(&cli).context("loading dashboard configuration")?;
    let tz = config.reference_timezone()?;

    match &cli.command {
        Commands::Returns => {
            let provider = build_provider(&config, tz);
            let as_of = resolve_as_of(cli.as_of.as_deref(), tz)?;
            commands::returns::run(provider, &config, as_of, &format).await?
        }
        Commands::History(args) => {
            let provider = build_provider(&config, tz);
            let as_of = resolve_as_of(cli.as_of.as_deref(), tz)?;
            commands::history::run(args, provider, &config, as_of, &format).await?
        }
        Commands::Indices => commands::indices::run(&config, &format)?,
    }

    Ok(())
}
