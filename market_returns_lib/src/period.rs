//! Calendar periods and their start boundaries.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::MarketReturnsError;

/// A to-date period measured from the start of the calendar month, quarter, or year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Period {
    Mtd,
    Qtd,
    Ytd,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Mtd, Period::Qtd, Period::Ytd];

    /// First calendar day of the period that contains `as_of`.
    ///
    /// Quarters start in January, April, July and October.
    pub fn boundary(self, as_of: NaiveDate) -> NaiveDate {
        let month = match self {
            Period::Mtd => as_of.month(),
            Period::Qtd => quarter_start_month(as_of.month()),
            Period::Ytd => 1,
        };
        NaiveDate::from_ymd_opt(as_of.year(), month, 1).unwrap_or(as_of)
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Period::Mtd => "MTD",
            Period::Qtd => "QTD",
            Period::Ytd => "YTD",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Period::Mtd => "Month-to-Date",
            Period::Qtd => "Quarter-to-Date",
            Period::Ytd => "Year-to-Date",
        }
    }
}

/// Calendar quarter (1-4) of a month number.
pub fn quarter_of(month: u32) -> u32 {
    (month.clamp(1, 12) - 1) / 3 + 1
}

fn quarter_start_month(month: u32) -> u32 {
    (quarter_of(month) - 1) * 3 + 1
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for Period {
    type Err = MarketReturnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mtd" | "month" => Ok(Period::Mtd),
            "qtd" | "quarter" => Ok(Period::Qtd),
            "ytd" | "year" => Ok(Period::Ytd),
            other => Err(MarketReturnsError::InvalidInput(format!(
                "unknown period '{}': expected mtd, qtd or ytd",
                other
            ))),
        }
    }
}
