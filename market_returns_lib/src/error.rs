//! Error types for the library layer.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding configuration, timezone, and input validation failures.
#[derive(Debug)]
pub enum MarketReturnsError {
    /// An error from the underlying API client.
    Api(market_returns_api::Error),
    /// The dashboard configuration is malformed or inconsistent.
    Config(String),
    /// A timezone name or local time could not be resolved.
    Timezone(String),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// A configuration file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for MarketReturnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Timezone(msg) => write!(f, "Timezone error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for MarketReturnsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<market_returns_api::Error> for MarketReturnsError {
    fn from(e: market_returns_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<std::io::Error> for MarketReturnsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for MarketReturnsError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Why a single period cell of a dashboard has no value.
///
/// Every variant is recovered at per-symbol, per-period granularity and
/// rendered as "N/A"; none of them aborts a render.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The provider returned nothing usable at or before the as-of time.
    #[error("no price data available")]
    DataUnavailable,
    /// Fetching the series failed.
    #[error("provider error: {0}")]
    ProviderError(String),
    /// Data exists, but the period's start or current price could not be resolved.
    #[error("computation skipped: {0}")]
    ComputationSkipped(String),
}

impl UnavailableReason {
    /// Stable machine-readable name, matching the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataUnavailable => "data_unavailable",
            Self::ProviderError(_) => "provider_error",
            Self::ComputationSkipped(_) => "computation_skipped",
        }
    }
}

impl From<&MarketReturnsError> for UnavailableReason {
    fn from(e: &MarketReturnsError) -> Self {
        Self::ProviderError(e.to_string())
    }
}
