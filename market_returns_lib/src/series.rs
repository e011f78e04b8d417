//! Price observations and the chronologically ordered series built from them.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::timezone::from_unix_timestamp;

/// A single price print.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceObservation {
    pub timestamp: DateTime<Tz>,
    pub price: f64,
}

impl PriceObservation {
    pub fn new(timestamp: DateTime<Tz>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Calendar date of the observation in its own timezone.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Price history for one symbol.
///
/// Observations are held in ascending timestamp order, in a single reference
/// timezone, with no duplicate timestamps and no non-finite prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    timezone: Tz,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Builds a series, normalizing every timestamp to `timezone`.
    ///
    /// Input order does not matter. Non-finite prices are dropped, and for
    /// duplicate timestamps the first observation wins.
    pub fn new(symbol: impl Into<String>, timezone: Tz, observations: Vec<PriceObservation>) -> Self {
        let mut observations: Vec<PriceObservation> = observations
            .into_iter()
            .filter(|o| o.price.is_finite())
            .map(|o| PriceObservation {
                timestamp: o.timestamp.with_timezone(&timezone),
                price: o.price,
            })
            .collect();
        observations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        observations.dedup_by(|later, earlier| later.timestamp == earlier.timestamp);
        Self {
            symbol: symbol.into(),
            timezone,
            observations,
        }
    }

    /// Builds a series from `(unix seconds, price)` pairs.
    pub fn from_unix(
        symbol: impl Into<String>,
        timezone: Tz,
        points: impl IntoIterator<Item = (i64, f64)>,
    ) -> Self {
        let observations = points
            .into_iter()
            .filter_map(|(ts, price)| {
                from_unix_timestamp(ts, timezone).map(|t| PriceObservation::new(t, price))
            })
            .collect();
        Self::new(symbol, timezone, observations)
    }

    pub fn empty(symbol: impl Into<String>, timezone: Tz) -> Self {
        Self::new(symbol, timezone, Vec::new())
    }

    /// The same observations re-expressed in `timezone`.
    pub fn with_timezone(self, timezone: Tz) -> Self {
        if self.timezone == timezone {
            return self;
        }
        Self::new(self.symbol, timezone, self.observations)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&PriceObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    /// Latest observation with timestamp <= `as_of`.
    pub fn last_on_or_before(&self, as_of: &DateTime<Tz>) -> Option<&PriceObservation> {
        let end = self.observations.partition_point(|o| o.timestamp <= *as_of);
        end.checked_sub(1).map(|i| &self.observations[i])
    }

    /// Observations whose local date is on or after `boundary` and whose
    /// timestamp is on or before `as_of`.
    pub fn window(&self, boundary: NaiveDate, as_of: &DateTime<Tz>) -> &[PriceObservation] {
        let start = self.observations.partition_point(|o| o.date() < boundary);
        let end = self.observations.partition_point(|o| o.timestamp <= *as_of);
        if start >= end {
            &[]
        } else {
            &self.observations[start..end]
        }
    }

    /// Earliest observation inside [`PriceSeries::window`].
    pub fn first_in_window(
        &self,
        boundary: NaiveDate,
        as_of: &DateTime<Tz>,
    ) -> Option<&PriceObservation> {
        self.window(boundary, as_of).first()
    }
}
