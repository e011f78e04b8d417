//! HTTP client for the Yahoo Finance chart API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{ChartQuery, Query},
    types::{ChartResponse, ChartResult},
    user_agent::get_user_agent,
    Error,
};

/// HTTP client for the Yahoo Finance chart API.
///
/// Sends requests with a randomized browser user agent. Each request builds
/// a fresh `reqwest::Client` with a 30-second timeout.
pub struct Client {
    /// Base URL for the API. Defaults to `https://query1.finance.yahoo.com`.
    base_api_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the production chart API.
    pub fn new() -> Self {
        Self {
            base_api_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, path: &str, query: Option<&impl Query>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    async fn get<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let url = self.get_url(path, query)?;
        tracing::debug!("GET {}", url);
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .get(url)
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            tracing::error!("Rate limited: {}", truncate_body(&body));
            return Err(Error::RateLimited);
        }

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::ParseFailed(e.to_string())
        })?;

        Ok(parsed)
    }

    /// Fetches the raw chart response for `symbol`.
    ///
    /// A 404 from the provider becomes [`Error::SymbolNotFound`]; a `chart.error`
    /// object in a successful response becomes [`Error::Upstream`].
    pub async fn get_chart(&self, symbol: &str, query: &ChartQuery) -> Result<ChartResponse, Error> {
        let path = format!("/v8/finance/chart/{}", symbol);
        let resp = match self.get::<ChartResponse, ChartQuery>(&path, Some(query)).await {
            Err(Error::HttpStatus { status: 404, .. }) => {
                return Err(Error::SymbolNotFound(symbol.to_string()))
            }
            other => other?,
        };

        if let Some(err) = &resp.chart.error {
            return Err(Error::Upstream {
                code: err.code.clone(),
                description: err.description.clone(),
            });
        }

        Ok(resp)
    }

    /// Fetches the chart for `symbol` and returns its single result block.
    ///
    /// An empty `result` array is reported as [`Error::SymbolNotFound`].
    pub async fn get_chart_result(
        &self,
        symbol: &str,
        query: &ChartQuery,
    ) -> Result<ChartResult, Error> {
        let resp = self.get_chart(symbol, query).await?;
        resp.chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| Error::SymbolNotFound(symbol.to_string()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
