use crate::error::MarketReturnsError;

pub const MAX_SYMBOL_LENGTH: usize = 20;
pub const MAX_CONCURRENT_FETCHES: usize = 16;

/// Validates a provider symbol and returns it uppercased.
///
/// Accepts ASCII letters, digits and `^ . - =` (index, share class, futures
/// and currency-pair notations).
pub fn validate_symbol(input: &str) -> Result<String, MarketReturnsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MarketReturnsError::InvalidInput(
            "symbol cannot be empty".into(),
        ));
    }
    if trimmed.len() > MAX_SYMBOL_LENGTH {
        return Err(MarketReturnsError::InvalidInput(format!(
            "symbol '{}' exceeds {} characters",
            trimmed, MAX_SYMBOL_LENGTH
        )));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '^' | '.' | '-' | '=')))
    {
        return Err(MarketReturnsError::InvalidInput(format!(
            "symbol '{}' contains invalid character '{}'",
            trimmed, bad
        )));
    }
    Ok(trimmed.to_uppercase())
}

pub fn validate_concurrency(value: usize) -> Result<usize, MarketReturnsError> {
    if value == 0 || value > MAX_CONCURRENT_FETCHES {
        return Err(MarketReturnsError::InvalidInput(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, value
        )));
    }
    Ok(value)
}
