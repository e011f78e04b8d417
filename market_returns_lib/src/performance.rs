//! Period price history for charting.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::period::Period;
use crate::returns::percentage_change;
use crate::series::PriceSeries;

/// One point of a performance chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub timestamp: DateTime<Tz>,
    pub price: f64,
    /// Change since the first point of the period, `None` if that price is zero.
    pub change_pct: Option<f64>,
}

/// Price history inside `period`'s window as of `as_of`.
pub fn period_history(
    series: &PriceSeries,
    period: Period,
    as_of: &DateTime<Tz>,
) -> Vec<PerformancePoint> {
    let as_of = as_of.with_timezone(&series.timezone());
    let window = series.window(period.boundary(as_of.date_naive()), &as_of);
    let base = match window.first() {
        Some(obs) => obs.price,
        None => return Vec::new(),
    };
    window
        .iter()
        .map(|obs| PerformancePoint {
            date: obs.date(),
            timestamp: obs.timestamp,
            price: obs.price,
            change_pct: percentage_change(base, obs.price),
        })
        .collect()
}

/// The points of a history dated on or after `boundary`, rebased on the
/// first of them.
///
/// Narrows a year-to-date history to a shorter period ending at the same
/// as-of date.
pub fn history_since(points: &[PerformancePoint], boundary: NaiveDate) -> Vec<PerformancePoint> {
    let window = &points[points.partition_point(|p| p.date < boundary)..];
    let base = match window.first() {
        Some(p) => p.price,
        None => return Vec::new(),
    };
    window
        .iter()
        .map(|p| PerformancePoint {
            change_pct: percentage_change(base, p.price),
            ..p.clone()
        })
        .collect()
}

/// Lowest and highest price of a history, `None` when empty.
pub fn price_range(points: &[PerformancePoint]) -> Option<(f64, f64)> {
    points.iter().fold(None, |acc, p| match acc {
        None => Some((p.price, p.price)),
        Some((lo, hi)) => Some((lo.min(p.price), hi.max(p.price))),
    })
}
