//! Dashboard configuration: tracked indices, reference timezone, price field.
//!
//! Defaults are embedded at compile time from `seed_data/indices.toml`; a
//! TOML file with the same shape can replace them at runtime.

use std::collections::HashSet;
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::MarketReturnsError;
use crate::provider::PriceField;
use crate::timezone::parse_timezone;
use crate::validation::{validate_concurrency, validate_symbol};

/// An index or instrument shown on the dashboard.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TrackedIndex {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TrackedIndex {
    /// An ad-hoc entry named after its symbol.
    pub fn from_symbol(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            description: None,
        }
    }
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_concurrency() -> usize {
    4
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub price_field: PriceField,
    #[serde(default = "default_concurrency")]
    pub max_concurrent_fetches: usize,
    pub indices: Vec<TrackedIndex>,
}

impl DashboardConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, MarketReturnsError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validated()
    }

    /// The built-in configuration.
    pub fn load_default() -> Result<Self, MarketReturnsError> {
        Self::from_toml(include_str!("../../seed_data/indices.toml"))
    }

    pub fn load_from_path(path: &Path) -> Result<Self, MarketReturnsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| match e {
            MarketReturnsError::Config(msg) => {
                MarketReturnsError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Loads `path` if given, otherwise the built-in configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, MarketReturnsError> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load_default(),
        }
    }

    /// Normalizes symbols and checks timezone, concurrency and uniqueness.
    pub fn validated(mut self) -> Result<Self, MarketReturnsError> {
        if self.indices.is_empty() {
            return Err(MarketReturnsError::Config(
                "at least one index must be configured".to_string(),
            ));
        }
        parse_timezone(&self.timezone)?;
        validate_concurrency(self.max_concurrent_fetches)?;

        let mut seen = HashSet::new();
        for index in self.indices.iter_mut() {
            index.symbol = validate_symbol(&index.symbol)?;
            if !seen.insert(index.symbol.clone()) {
                return Err(MarketReturnsError::Config(format!(
                    "index '{}' is configured more than once",
                    index.symbol
                )));
            }
            if index.name.trim().is_empty() {
                index.name = index.symbol.clone();
            }
        }
        Ok(self)
    }

    pub fn reference_timezone(&self) -> Result<Tz, MarketReturnsError> {
        parse_timezone(&self.timezone)
    }

    pub fn with_timezone(mut self, timezone: &str) -> Result<Self, MarketReturnsError> {
        parse_timezone(timezone)?;
        self.timezone = timezone.trim().to_string();
        Ok(self)
    }

    /// Restricts the dashboard to `symbols`, in the given order.
    ///
    /// Symbols that are not configured are added as ad-hoc entries. An empty
    /// slice leaves the configuration untouched.
    pub fn select_symbols(mut self, symbols: &[String]) -> Result<Self, MarketReturnsError> {
        if symbols.is_empty() {
            return Ok(self);
        }
        let mut selected = Vec::with_capacity(symbols.len());
        for raw in symbols {
            let symbol = validate_symbol(raw)?;
            if selected.iter().any(|i: &TrackedIndex| i.symbol == symbol) {
                continue;
            }
            let index = self
                .indices
                .iter()
                .find(|i| i.symbol == symbol)
                .cloned()
                .unwrap_or_else(|| TrackedIndex::from_symbol(&symbol));
            selected.push(index);
        }
        self.indices = selected;
        Ok(self)
    }
}
