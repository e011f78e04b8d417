use std::fmt;

use chrono::{Days, NaiveDate};
use url::Url;

use super::common::Query;

/// Bar size requested from the chart endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interval {
    #[default]
    OneDay,
    OneWeek,
    OneMonth,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
        };
        write!(f, "{}", s)
    }
}

/// Corporate action events that can be attached to a chart response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartEvents {
    Dividends,
    Splits,
}

impl fmt::Display for ChartEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartEvents::Dividends => write!(f, "div"),
            ChartEvents::Splits => write!(f, "split"),
        }
    }
}

/// Query for `/v8/finance/chart/{symbol}`.
///
/// `start` and `end` are inclusive calendar dates. They are sent as unix
/// seconds at UTC midnight, with `period2` pointing at the midnight after
/// `end` so the last requested day is part of the response.
#[derive(Clone, Debug)]
pub struct ChartQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
    pub events: Vec<ChartEvents>,
    pub include_adjusted_close: bool,
}

impl ChartQuery {
    /// Daily bars between `start` and `end`, adjusted closes and dividend/split events included.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            interval: Interval::OneDay,
            events: vec![ChartEvents::Dividends, ChartEvents::Splits],
            include_adjusted_close: true,
        }
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_events(mut self, events: &[ChartEvents]) -> Self {
        self.events = events.to_vec();
        self
    }

    pub fn without_adjusted_close(mut self) -> Self {
        self.include_adjusted_close = false;
        self
    }

    fn period1(&self) -> i64 {
        midnight_utc(self.start)
    }

    fn period2(&self) -> i64 {
        let after_end = self.end.checked_add_days(Days::new(1)).unwrap_or(self.end);
        midnight_utc(after_end)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

impl Query for ChartQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("period1", &self.period1().to_string())
            .append_pair("period2", &self.period2().to_string())
            .append_pair("interval", &self.interval.to_string());
        if self.include_adjusted_close {
            url.query_pairs_mut()
                .append_pair("includeAdjustedClose", "true");
        }
        if !self.events.is_empty() {
            let events = self
                .events
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("|");
            url.query_pairs_mut().append_pair("events", &events);
        }
        url
    }
}
