//! Period return calculation (MTD / QTD / YTD) over a price series.
//!
//! The calculation is pure: the same series and as-of instant always give
//! the same [`ReturnSet`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::UnavailableReason;
use crate::period::Period;
use crate::series::{PriceObservation, PriceSeries};

/// Return over one period, from the first in-window observation to the
/// latest observation at or before the as-of instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReturn {
    pub period: Period,
    pub boundary: NaiveDate,
    pub start_price: f64,
    pub start_timestamp: DateTime<Tz>,
    pub current_price: f64,
    pub current_timestamp: DateTime<Tz>,
    pub return_pct: f64,
}

/// Result of one period cell: a value, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PeriodOutcome {
    Available(PeriodReturn),
    Unavailable { reason: UnavailableReason },
}

impl PeriodOutcome {
    pub fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn as_return(&self) -> Option<&PeriodReturn> {
        match self {
            Self::Available(r) => Some(r),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&UnavailableReason> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }

    /// Display text: signed percentage with two decimals, or `N/A`.
    pub fn display(&self) -> String {
        match self {
            Self::Available(r) => format_pct(r.return_pct),
            Self::Unavailable { .. } => "N/A".to_string(),
        }
    }
}

/// All period outcomes for one symbol at one as-of instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSet {
    pub as_of: DateTime<Tz>,
    /// Timestamp of the observation used as the current price ("data as of").
    pub last_observation: Option<DateTime<Tz>>,
    pub periods: BTreeMap<Period, PeriodOutcome>,
}

impl ReturnSet {
    /// A set where every period carries the same unavailability reason.
    pub fn unavailable(as_of: DateTime<Tz>, reason: UnavailableReason) -> Self {
        let periods = Period::ALL
            .iter()
            .map(|p| (*p, PeriodOutcome::unavailable(reason.clone())))
            .collect();
        Self {
            as_of,
            last_observation: None,
            periods,
        }
    }

    pub fn get(&self, period: Period) -> Option<&PeriodOutcome> {
        self.periods.get(&period)
    }

    pub fn available_count(&self) -> usize {
        self.periods.values().filter(|o| o.is_available()).count()
    }
}

/// Percentage change from `start` to `current`.
///
/// Returns `None` when `start` is zero or either price is not finite.
pub fn percentage_change(start: f64, current: f64) -> Option<f64> {
    if start == 0.0 || !start.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - start) * 100.0 / start)
}

/// Formats a percentage as `+1.23%` / `-0.45%`.
pub fn format_pct(pct: f64) -> String {
    let rounded = (pct * 100.0).round() / 100.0;
    // avoid "-0.00%"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:+.2}%", rounded)
}

fn resolve_start<'a>(
    series: &'a PriceSeries,
    boundary: NaiveDate,
    as_of: &DateTime<Tz>,
) -> Result<&'a PriceObservation, UnavailableReason> {
    series.first_in_window(boundary, as_of).ok_or_else(|| {
        UnavailableReason::ComputationSkipped(format!(
            "no observation between {} and {}",
            boundary,
            as_of.date_naive()
        ))
    })
}

/// Computes the return for a single period.
pub fn compute_period_return(
    series: &PriceSeries,
    period: Period,
    as_of: &DateTime<Tz>,
) -> PeriodOutcome {
    let as_of = as_of.with_timezone(&series.timezone());

    let current = match series.last_on_or_before(&as_of) {
        Some(obs) => obs,
        None => return PeriodOutcome::unavailable(UnavailableReason::DataUnavailable),
    };

    let boundary = period.boundary(as_of.date_naive());
    let start = match resolve_start(series, boundary, &as_of) {
        Ok(obs) => obs,
        Err(reason) => return PeriodOutcome::unavailable(reason),
    };

    match percentage_change(start.price, current.price) {
        Some(return_pct) => PeriodOutcome::Available(PeriodReturn {
            period,
            boundary,
            start_price: start.price,
            start_timestamp: start.timestamp,
            current_price: current.price,
            current_timestamp: current.timestamp,
            return_pct,
        }),
        None => PeriodOutcome::unavailable(UnavailableReason::ComputationSkipped(format!(
            "start price on {} is zero",
            start.date()
        ))),
    }
}

/// Computes MTD, QTD and YTD returns for `series` as of `as_of`.
pub fn compute_returns(series: &PriceSeries, as_of: &DateTime<Tz>) -> ReturnSet {
    let as_of = as_of.with_timezone(&series.timezone());
    let periods = Period::ALL
        .iter()
        .map(|p| (*p, compute_period_return(series, *p, &as_of)))
        .collect();
    ReturnSet {
        last_observation: series.last_on_or_before(&as_of).map(|o| o.timestamp),
        as_of,
        periods,
    }
}
