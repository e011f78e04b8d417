//! Market data providers.
//!
//! The dashboard only needs `fetch_series(symbol, start, end)`; the
//! [`PriceProvider`] trait keeps that seam open so tests can swap in a
//! canned provider.

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use market_returns_api::types::ChartResult;
use market_returns_api::{ChartQuery, Client};
use serde::{Deserialize, Serialize};

use crate::error::MarketReturnsError;
use crate::series::PriceSeries;

/// Which close the series is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    /// Split and dividend adjusted close, falling back to the raw close.
    #[default]
    Adjusted,
    Close,
}

/// Source of daily price series.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches observations for `symbol` between `start` and `end`, both inclusive.
    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketReturnsError>;
}

/// [`PriceProvider`] backed by the Yahoo Finance chart API.
pub struct YahooProvider {
    client: Client,
    timezone: Tz,
    price_field: PriceField,
}

impl YahooProvider {
    pub fn new(timezone: Tz, price_field: PriceField) -> Self {
        Self {
            client: Client::new(),
            timezone,
            price_field,
        }
    }

    /// Creates a provider with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, timezone: Tz, price_field: PriceField) -> Self {
        Self {
            client: Client::with_base_url(base_url),
            timezone,
            price_field,
        }
    }
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketReturnsError> {
        if start > end {
            return Err(MarketReturnsError::InvalidInput(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        tracing::debug!("fetching {} from {} to {}", symbol, start, end);
        let query = ChartQuery::new(start, end);
        let result = self.client.get_chart_result(symbol, &query).await?;
        let series = series_from_chart(symbol, &result, self.timezone, self.price_field);
        tracing::debug!("{}: {} observations", symbol, series.len());
        Ok(series)
    }
}

/// Converts a chart block into a [`PriceSeries`] in `timezone`.
///
/// With [`PriceField::Adjusted`], a bar whose adjusted close is `null` uses
/// its raw close; when the adjusted array is missing or misaligned, raw closes
/// are used throughout. Bars with no price at all are skipped.
pub fn series_from_chart(
    symbol: &str,
    result: &ChartResult,
    timezone: Tz,
    price_field: PriceField,
) -> PriceSeries {
    let timestamps = result.timestamps();
    let closes = result.closes();
    let adjusted = match price_field {
        PriceField::Adjusted => {
            let aligned = result
                .adjusted_closes()
                .filter(|adj| adj.len() == timestamps.len());
            if aligned.is_none() {
                tracing::debug!("{}: no aligned adjusted closes, using raw closes", symbol);
            }
            aligned
        }
        PriceField::Close => None,
    };

    let points = timestamps.iter().enumerate().filter_map(|(i, ts)| {
        let close = closes.get(i).copied().flatten();
        let price = match adjusted {
            Some(adj) => adj[i].or(close),
            None => close,
        };
        price.map(|p| (*ts, p))
    });
    PriceSeries::from_unix(symbol, timezone, points)
}
