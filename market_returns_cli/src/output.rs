use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use market_returns_lib::{
    history_since, Dashboard, IndexPanel, PerformancePoint, Period, TrackedIndex,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::xml_output;

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
    Xml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "xml" => Ok(OutputFormat::Xml),
            other => bail!(
                "unknown output format '{}': expected table, json, csv, markdown or xml",
                other
            ),
        }
    }
}

#[derive(Tabled, Serialize)]
struct ReturnRow {
    #[tabled(rename = "Index")]
    #[serde(rename = "Index")]
    name: String,
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "MTD")]
    #[serde(rename = "MTD")]
    mtd: String,
    #[tabled(rename = "QTD")]
    #[serde(rename = "QTD")]
    qtd: String,
    #[tabled(rename = "YTD")]
    #[serde(rename = "YTD")]
    ytd: String,
    #[tabled(rename = "Data As Of")]
    #[serde(rename = "Data As Of")]
    data_as_of: String,
}

#[derive(Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    price: String,
    #[tabled(rename = "Change")]
    #[serde(rename = "Change")]
    change: String,
}

#[derive(Tabled, Serialize)]
struct IndexRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    #[serde(rename = "Description")]
    description: String,
}

/// Price history of one index over one period.
#[derive(Serialize)]
pub struct HistorySeries<'a> {
    pub symbol: &'a str,
    pub name: &'a str,
    pub period: Period,
    pub points: Vec<PerformancePoint>,
}

impl<'a> HistorySeries<'a> {
    /// The panel's history narrowed to `period` as of `as_of`, keeping only
    /// the last `tail` points when given.
    pub fn from_panel(
        panel: &'a IndexPanel,
        period: Period,
        as_of: NaiveDate,
        tail: Option<usize>,
    ) -> Self {
        let mut points = history_since(&panel.history, period.boundary(as_of));
        if let Some(n) = tail {
            let skip = points.len().saturating_sub(n);
            points.drain(..skip);
        }
        Self {
            symbol: &panel.symbol,
            name: &panel.name,
            period,
            points,
        }
    }
}

// -- Row builders --

fn period_cell(panel: &IndexPanel, period: Period) -> String {
    panel
        .returns
        .get(period)
        .map(|o| o.display())
        .unwrap_or_else(|| "N/A".to_string())
}

fn build_return_rows(dashboard: &Dashboard) -> Vec<ReturnRow> {
    dashboard
        .panels
        .iter()
        .map(|p| ReturnRow {
            name: p.name.clone(),
            symbol: p.symbol.clone(),
            mtd: period_cell(p, Period::Mtd),
            qtd: period_cell(p, Period::Qtd),
            ytd: period_cell(p, Period::Ytd),
            data_as_of: p
                .returns
                .last_observation
                .map(|ts| ts.format("%Y-%m-%d %H:%M %Z").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect()
}

fn build_history_rows(series: &[HistorySeries<'_>]) -> Vec<HistoryRow> {
    series
        .iter()
        .flat_map(|s| {
            s.points.iter().map(move |pt| HistoryRow {
                symbol: s.symbol.to_string(),
                date: pt.date.to_string(),
                price: format!("{:.2}", pt.price),
                change: pt
                    .change_pct
                    .map(market_returns_lib::format_pct)
                    .unwrap_or_else(|| "N/A".to_string()),
            })
        })
        .collect()
}

fn build_index_rows(indices: &[TrackedIndex]) -> Vec<IndexRow> {
    indices
        .iter()
        .map(|i| IndexRow {
            symbol: i.symbol.clone(),
            name: i.name.clone(),
            description: i
                .description
                .as_deref()
                .map(collapse_whitespace)
                .unwrap_or_default(),
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// -- Table output --

pub fn print_returns_table(dashboard: &Dashboard) {
    println!("{}", Table::new(build_return_rows(dashboard)));
}

pub fn print_history_table(series: &[HistorySeries<'_>]) {
    println!("{}", Table::new(build_history_rows(series)));
}

pub fn print_indices_table(indices: &[TrackedIndex]) {
    println!("{}", Table::new(build_index_rows(indices)));
}

// -- Markdown output --

pub fn print_returns_markdown(dashboard: &Dashboard) {
    let mut table = Table::new(build_return_rows(dashboard));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_history_markdown(series: &[HistorySeries<'_>]) {
    let mut table = Table::new(build_history_rows(series));
    table.with(Style::markdown());
    println!("{}", table);
}

/// Markdown rendering of the "About the indices" section.
pub fn print_indices_markdown(indices: &[TrackedIndex]) {
    println!("{}", indices_markdown(indices));
}

fn indices_markdown(indices: &[TrackedIndex]) -> String {
    let mut out = String::from("## About the indices\n");
    for index in indices {
        out.push_str(&format!("\n### {} ({})\n", index.name, index.symbol));
        if let Some(desc) = &index.description {
            out.push('\n');
            out.push_str(&collapse_whitespace(desc));
            out.push('\n');
        }
    }
    out
}

// -- CSV output --

fn write_csv<T: Serialize, W: std::io::Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_returns_csv(dashboard: &Dashboard) -> Result<()> {
    write_csv(std::io::stdout(), &build_return_rows(dashboard))
}

pub fn print_history_csv(series: &[HistorySeries<'_>]) -> Result<()> {
    write_csv(std::io::stdout(), &build_history_rows(series))
}

pub fn print_indices_csv(indices: &[TrackedIndex]) -> Result<()> {
    write_csv(std::io::stdout(), &build_index_rows(indices))
}

// -- XML output --

pub fn print_returns_xml(dashboard: &Dashboard) -> Result<()> {
    println!("{}", xml_output::dashboard_to_xml(dashboard)?);
    Ok(())
}

pub fn print_history_xml(series: &[HistorySeries<'_>]) -> Result<()> {
    println!("{}", xml_output::history_to_xml(series)?);
    Ok(())
}

pub fn print_indices_xml(indices: &[TrackedIndex]) -> Result<()> {
    println!("{}", xml_output::indices_to_xml(indices)?);
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
