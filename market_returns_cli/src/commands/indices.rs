//! The `indices` subcommand: the "About the indices" section.

use anyhow::Result;
use market_returns_lib::DashboardConfig;

use crate::output::{
    print_indices_csv, print_indices_markdown, print_indices_table, print_indices_xml, print_json,
    OutputFormat,
};

pub fn run(config: &DashboardConfig, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_indices_table(&config.indices),
        OutputFormat::Json => print_json(&config.indices),
        OutputFormat::Csv => print_indices_csv(&config.indices)?,
        OutputFormat::Markdown => print_indices_markdown(&config.indices),
        OutputFormat::Xml => print_indices_xml(&config.indices)?,
    }
    Ok(())
}
