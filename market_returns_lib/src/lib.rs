//! Library layer for the market returns dashboard: price series, period
//! boundaries, the return calculator, and concurrent dashboard assembly.
//!
//! Wraps the `market_returns_api` chart client behind the [`PriceProvider`]
//! trait and normalizes every timestamp to one reference timezone before any
//! comparison.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod performance;
pub mod period;
pub mod provider;
pub mod returns;
pub mod series;
pub mod timezone;
pub mod validation;

pub use market_returns_api;

pub use config::{DashboardConfig, TrackedIndex};
pub use dashboard::{build_dashboard, fetch_window, Dashboard, IndexPanel};
pub use error::{MarketReturnsError, UnavailableReason};
pub use performance::{history_since, period_history, PerformancePoint};
pub use period::Period;
pub use provider::{PriceField, PriceProvider, YahooProvider};
pub use returns::{compute_returns, format_pct, PeriodOutcome, PeriodReturn, ReturnSet};
pub use series::{PriceObservation, PriceSeries};
