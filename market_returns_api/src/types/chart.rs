use serde::{Deserialize, Serialize};

/// Top-level envelope of a `/v8/finance/chart` response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

/// One symbol's bars. `timestamp` is absent when the range holds no trading days.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    pub exchange_name: Option<String>,
    pub instrument_type: Option<String>,
    pub exchange_timezone_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_time: Option<i64>,
    #[serde(rename = "gmtoffset")]
    pub gmt_offset: Option<i64>,
    pub data_granularity: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
    #[serde(default)]
    pub adjclose: Option<Vec<AdjClose>>,
}

/// Parallel arrays aligned with [`ChartResult::timestamp`]. Halted or
/// partial bars show up as `null`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct QuoteIndicator {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// Timestamps, or an empty slice when the response carried none.
    pub fn timestamps(&self) -> &[i64] {
        self.timestamp.as_deref().unwrap_or(&[])
    }

    /// Raw close prices of the first quote block.
    pub fn closes(&self) -> &[Option<f64>] {
        self.indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or(&[])
    }

    /// Split/dividend adjusted closes, if the query asked for them.
    pub fn adjusted_closes(&self) -> Option<&[Option<f64>]> {
        self.indicators
            .adjclose
            .as_ref()
            .and_then(|a| a.first())
            .map(|a| a.adjclose.as_slice())
    }
}
