//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable response).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The API answered with HTTP 429.
    #[error("Rate limited by the market data provider (HTTP 429)")]
    RateLimited,
    /// The provider does not know the requested symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
    /// The response carried a `chart.error` object instead of a result.
    #[error("Provider error {code}: {description}")]
    Upstream { code: String, description: String },
    /// The body could not be deserialized into the expected shape.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
}
