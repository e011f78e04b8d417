//! The `returns` subcommand: the MTD / QTD / YTD table for every tracked index.

use std::sync::Arc;

use anyhow::Result;
use chrono::DateTime;
use chrono_tz::Tz;
use market_returns_lib::{build_dashboard, DashboardConfig, PriceProvider};

use crate::output::{
    print_json, print_returns_csv, print_returns_markdown, print_returns_table, print_returns_xml,
    OutputFormat,
};

pub async fn run(
    provider: Arc<dyn PriceProvider>,
    config: &DashboardConfig,
    as_of: DateTime<Tz>,
    format: &OutputFormat,
) -> Result<()> {
    let dashboard = build_dashboard(provider, config, as_of).await?;

    eprintln!(
        "Returns as of {} ({})",
        dashboard.as_of.format("%Y-%m-%d %H:%M %Z"),
        dashboard.timezone.name()
    );
    let unavailable = dashboard.unavailable_symbols();
    if !unavailable.is_empty() {
        eprintln!("No data for: {}", unavailable.join(", "));
    }

    match format {
        OutputFormat::Table => print_returns_table(&dashboard),
        OutputFormat::Json => print_json(&dashboard),
        OutputFormat::Csv => print_returns_csv(&dashboard)?,
        OutputFormat::Markdown => print_returns_markdown(&dashboard),
        OutputFormat::Xml => print_returns_xml(&dashboard)?,
    }

    Ok(())
}
