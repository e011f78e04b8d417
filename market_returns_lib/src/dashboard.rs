//! Dashboard assembly: fetch every tracked index, compute its returns, and
//! collect the panels in configuration order.
//!
//! Symbols are fetched concurrently (Semaphore + JoinSet). A failed fetch
//! only marks that symbol's cells unavailable.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{DashboardConfig, TrackedIndex};
use crate::error::{MarketReturnsError, UnavailableReason};
use crate::performance::{period_history, PerformancePoint};
use crate::period::Period;
use crate::provider::PriceProvider;
use crate::returns::{compute_returns, ReturnSet};
use crate::series::PriceSeries;

/// Everything rendered for one index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexPanel {
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub returns: ReturnSet,
    /// Year-to-date history backing the performance chart.
    pub history: Vec<PerformancePoint>,
}

impl IndexPanel {
    pub fn from_series(index: &TrackedIndex, series: &PriceSeries, as_of: &DateTime<Tz>) -> Self {
        Self {
            symbol: index.symbol.clone(),
            name: index.name.clone(),
            description: index.description.clone(),
            returns: compute_returns(series, as_of),
            history: period_history(series, Period::Ytd, as_of),
        }
    }

    pub fn unavailable(index: &TrackedIndex, as_of: &DateTime<Tz>, reason: UnavailableReason) -> Self {
        Self {
            symbol: index.symbol.clone(),
            name: index.name.clone(),
            description: index.description.clone(),
            returns: ReturnSet::unavailable(*as_of, reason),
            history: Vec::new(),
        }
    }

    /// `true` when no period could be computed.
    pub fn is_unavailable(&self) -> bool {
        self.returns.available_count() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub as_of: DateTime<Tz>,
    pub timezone: Tz,
    pub panels: Vec<IndexPanel>,
}

impl Dashboard {
    pub fn panel(&self, symbol: &str) -> Option<&IndexPanel> {
        self.panels.iter().find(|p| p.symbol == symbol)
    }

    /// Symbols for which nothing could be computed.
    pub fn unavailable_symbols(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|p| p.is_unavailable())
            .map(|p| p.symbol.as_str())
            .collect()
    }
}

/// Date range requested from the provider for an as-of instant.
///
/// Covers the whole year to date; the start is pulled back one day so bars
/// stamped in UTC still cover January 1 in every reference timezone.
pub fn fetch_window(as_of: &DateTime<Tz>) -> (NaiveDate, NaiveDate) {
    let end = as_of.date_naive();
    let boundary = Period::Ytd.boundary(end);
    (boundary.pred_opt().unwrap_or(boundary), end)
}

/// Fetches and computes every configured index as of `as_of`.
///
/// Fails only when the configured timezone is invalid; provider failures are
/// reported per panel.
pub async fn build_dashboard(
    provider: Arc<dyn PriceProvider>,
    config: &DashboardConfig,
    as_of: DateTime<Tz>,
) -> Result<Dashboard, MarketReturnsError> {
    let timezone = config.reference_timezone()?;
    let as_of = as_of.with_timezone(&timezone);
    let (start, end) = fetch_window(&as_of);
    tracing::debug!(
        "building dashboard for {} indices, window {}..={}",
        config.indices.len(),
        start,
        end
    );

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1)));
    let mut join_set = JoinSet::new();

    for (idx, index) in config.indices.iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let provider = Arc::clone(&provider);
        let symbol = index.symbol.clone();

        join_set.spawn(async move {
            let _permit = sem.acquire_owned().await;
            let result = provider.fetch_series(&symbol, start, end).await;
            (idx, result)
        });
    }

    let mut fetched: Vec<Option<Result<PriceSeries, MarketReturnsError>>> =
        config.indices.iter().map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, result)) => fetched[idx] = Some(result),
            Err(e) => tracing::error!("fetch task failed: {}", e),
        }
    }

    let panels = config
        .indices
        .iter()
        .zip(fetched)
        .map(|(index, result)| match result {
            Some(Ok(series)) => {
                let series = series.with_timezone(timezone);
                if series.is_empty() {
                    tracing::warn!("{}: provider returned no observations", index.symbol);
                }
                IndexPanel::from_series(index, &series, &as_of)
            }
            Some(Err(e)) => {
                tracing::warn!("{}: {}", index.symbol, e);
                IndexPanel::unavailable(index, &as_of, UnavailableReason::from(&e))
            }
            None => IndexPanel::unavailable(
                index,
                &as_of,
                UnavailableReason::ProviderError("fetch task did not complete".to_string()),
            ),
        })
        .collect();

    Ok(Dashboard {
        as_of,
        timezone,
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PriceField;
    use crate::series::PriceObservation;
    use crate::timezone::{end_of_day, DEFAULT_REFERENCE_TZ};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const TZ: Tz = DEFAULT_REFERENCE_TZ;

    enum Canned {
        Prices(Vec<(u32, u32, f64)>),
        Unix(Vec<(i64, f64)>),
        Fail,
    }

    /// Serves canned 2024 closes and records the peak number of concurrent calls.
    struct FakeProvider {
        data: HashMap<String, Canned>,
        delay_ms: HashMap<String, u64>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(data: Vec<(&str, Canned)>) -> Self {
            Self {
                data: data.into_iter().map(|(s, c)| (s.to_string(), c)).collect(),
                delay_ms: HashMap::new(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, symbol: &str, ms: u64) -> Self {
            self.delay_ms.insert(symbol.to_string(), ms);
            self
        }
    }

    #[async_trait]
    impl PriceProvider for FakeProvider {
        async fn fetch_series(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, MarketReturnsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = self.delay_ms.get(symbol).copied().unwrap_or(10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.data.get(symbol) {
                Some(Canned::Prices(prices)) => Ok(PriceSeries::new(
                    symbol,
                    TZ,
                    prices
                        .iter()
                        .map(|(m, d, p)| {
                            PriceObservation::new(TZ.with_ymd_and_hms(2024, *m, *d, 16, 0, 0).unwrap(), *p)
                        })
                        .collect(),
                )),
                Some(Canned::Unix(points)) => {
                    Ok(PriceSeries::from_unix(symbol, TZ, points.iter().copied()))
                }
                Some(Canned::Fail) => Err(MarketReturnsError::Api(
                    market_returns_api::Error::HttpStatus {
                        status: 500,
                        body: "boom".to_string(),
                    },
                )),
                None => Ok(PriceSeries::empty(symbol, TZ)),
            }
        }
    }

    fn config(symbols: &[&str], concurrency: usize) -> DashboardConfig {
        DashboardConfig {
            timezone: "America/New_York".to_string(),
            price_field: PriceField::Adjusted,
            max_concurrent_fetches: concurrency,
            indices: symbols.iter().map(|s| TrackedIndex::from_symbol(s)).collect(),
        }
    }

    fn as_of() -> DateTime<Tz> {
        end_of_day(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(), TZ).unwrap()
    }

    #[test]
    fn fetch_window_covers_year_to_date() {
        let (start, end) = fetch_window(&as_of());
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_isolated_per_symbol() {
        let provider = Arc::new(FakeProvider::new(vec![
            ("GOOD", Canned::Prices(vec![(1, 2, 100.0), (3, 31, 110.0), (6, 30, 121.0)])),
            ("BAD", Canned::Fail),
        ]));
        let dashboard = build_dashboard(provider, &config(&["GOOD", "BAD", "EMPTY"], 4), as_of())
            .await
            .unwrap();

        let good = dashboard.panel("GOOD").unwrap();
        assert_eq!(good.returns.available_count(), 3);
        assert_eq!(good.returns.get(Period::Ytd).unwrap().display(), "+21.00%");
        assert_eq!(good.history.len(), 3);

        let bad = dashboard.panel("BAD").unwrap();
        assert!(bad.is_unavailable());
        assert!(matches!(
            bad.returns.get(Period::Mtd).unwrap().reason(),
            Some(UnavailableReason::ProviderError(msg)) if msg.contains("500")
        ));

        let empty = dashboard.panel("EMPTY").unwrap();
        assert_eq!(
            empty.returns.get(Period::Qtd).unwrap().reason(),
            Some(&UnavailableReason::DataUnavailable)
        );
        assert_eq!(dashboard.unavailable_symbols(), vec!["BAD", "EMPTY"]);
    }

    #[tokio::test(start_paused = true)]
    async fn panels_follow_config_order() {
        let provider = Arc::new(
            FakeProvider::new(vec![
                ("SLOW", Canned::Prices(vec![(6, 3, 1.0)])),
                ("FAST", Canned::Prices(vec![(6, 3, 2.0)])),
            ])
            .with_delay("SLOW", 500)
            .with_delay("FAST", 1),
        );
        let dashboard = build_dashboard(provider, &config(&["SLOW", "FAST"], 4), as_of())
            .await
            .unwrap();
        let order: Vec<&str> = dashboard.panels.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(order, vec!["SLOW", "FAST"]);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_is_bounded() {
        let symbols = ["A", "B", "C", "D", "E", "F"];
        let provider = Arc::new(FakeProvider::new(vec![]));
        let dashboard = build_dashboard(provider.clone(), &config(&symbols, 2), as_of())
            .await
            .unwrap();
        assert_eq!(dashboard.panels.len(), 6);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
        assert!(provider.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn invalid_timezone_fails_whole_build() {
        let mut cfg = config(&["A"], 1);
        cfg.timezone = "Nowhere/Special".to_string();
        let provider = Arc::new(FakeProvider::new(vec![]));
        assert!(build_dashboard(provider, &cfg, as_of()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn as_of_is_normalized_to_config_timezone() {
        let mut cfg = config(&["A"], 1);
        cfg.timezone = "Europe/London".to_string();
        let provider = Arc::new(FakeProvider::new(vec![]));
        let dashboard = build_dashboard(provider, &cfg, as_of()).await.unwrap();
        assert_eq!(dashboard.timezone, chrono_tz::Europe::London);
        assert_eq!(dashboard.as_of.timezone(), chrono_tz::Europe::London);
        assert_eq!(dashboard.as_of, as_of());
    }

    #[tokio::test(start_paused = true)]
    async fn boundaries_follow_config_timezone() {
        let london = chrono_tz::Europe::London;
        // 2024-03-28 20:00 UTC, then 2024-03-31 23:30 UTC: still March 31 in
        // New York, already April 1 in London.
        let provider = Arc::new(FakeProvider::new(vec![(
            "A",
            Canned::Unix(vec![(1711656000, 100.0), (1711927800, 102.0)]),
        )]));
        let mut cfg = config(&["A"], 1);
        cfg.timezone = "Europe/London".to_string();
        let as_of = end_of_day(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), london).unwrap();

        let dashboard = build_dashboard(provider, &cfg, as_of).await.unwrap();
        let returns = &dashboard.panel("A").unwrap().returns;
        assert_eq!(returns.as_of.timezone(), london);

        let qtd = returns.get(Period::Qtd).unwrap().as_return().unwrap();
        assert_eq!(qtd.boundary, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(qtd.start_price, 102.0);
        assert_eq!(qtd.start_timestamp.timezone(), london);
        assert_eq!(qtd.start_timestamp.date_naive(), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(returns.get(Period::Ytd).unwrap().display(), "+2.00%");

        let history = &dashboard.panel("A").unwrap().history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn dashboard_serializes() {
        let index = TrackedIndex {
            symbol: "AGG".to_string(),
            name: "Agg".to_string(),
            description: None,
        };
        let panel = IndexPanel::unavailable(&index, &as_of(), UnavailableReason::DataUnavailable);
        let dashboard = Dashboard {
            as_of: as_of(),
            timezone: TZ,
            panels: vec![panel],
        };
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["timezone"], "America/New_York");
        assert_eq!(json["panels"][0]["symbol"], "AGG");
        assert!(json["panels"][0].get("description").is_none());
        assert_eq!(json["as_of"], "2024-06-30T23:59:59-04:00");
    }
}
