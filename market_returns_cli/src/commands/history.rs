//! The `history` subcommand: price series behind the performance chart.

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use clap::Args;
use market_returns_lib::performance::price_range;
use market_returns_lib::{build_dashboard, DashboardConfig, Period, PriceProvider};

use crate::output::{
    print_history_csv, print_history_markdown, print_history_table, print_history_xml, print_json,
    HistorySeries, OutputFormat,
};

#[derive(Args)]
pub struct HistoryArgs {
    /// Period to chart: ytd, qtd or mtd
    #[arg(long, default_value = "ytd")]
    pub period: String,

    /// Only show the most recent N points of each index
    #[arg(long)]
    pub tail: Option<usize>,
}

pub async fn run(
    args: &HistoryArgs,
    provider: Arc<dyn PriceProvider>,
    config: &DashboardConfig,
    as_of: DateTime<Tz>,
    format: &OutputFormat,
) -> Result<()> {
    if args.tail == Some(0) {
        bail!("--tail must be at least 1");
    }
    let period: Period = args.period.parse()?;

    let dashboard = build_dashboard(provider, config, as_of).await?;

    let as_of_date = dashboard.as_of.date_naive();
    let series: Vec<HistorySeries<'_>> = dashboard
        .panels
        .iter()
        .map(|p| HistorySeries::from_panel(p, period, as_of_date, args.tail))
        .collect();

    eprintln!("{} history as of {}", period.long_name(), as_of_date);
    for s in &series {
        match (s.points.first(), price_range(&s.points)) {
            (Some(first), Some((low, high))) => eprintln!(
                "{}: {} points since {}, range {:.2} - {:.2}",
                s.symbol,
                s.points.len(),
                first.date,
                low,
                high
            ),
            _ => eprintln!("{}: no data", s.symbol),
        }
    }

    match format {
        OutputFormat::Table => print_history_table(&series),
        OutputFormat::Json => print_json(&series),
        OutputFormat::Csv => print_history_csv(&series)?,
        OutputFormat::Markdown => print_history_markdown(&series),
        OutputFormat::Xml => print_history_xml(&series)?,
    }

    Ok(())
}
