//! Remote market-data provider trait and its errors.
//!
//! Providers return untyped [`RawRow`]s; [`fetch_records`] runs them through
//! the same validator as the CSV loader, so remote bars obey the same
//! invariants as file bars.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::loader::{LoadError, LoadReport, RowPolicy};
use crate::domain::RawRow;

/// Lookback window and bar size requested from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchRange {
    /// Provider range string, e.g. `6mo`, `1y`, `5d`.
    pub period: String,
    /// Bar size, e.g. `1d`.
    pub interval: String,
}

impl Default for FetchRange {
    fn default() -> Self {
        Self {
            period: "6mo".into(),
            interval: "1d".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("provider returned invalid bar: {0}")]
    InvalidBar(#[from] LoadError),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily OHLCV rows for one symbol.
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch raw rows (`date, company, open, high, low, close, volume`).
    fn fetch(&self, symbol: &str, range: &FetchRange) -> Result<Vec<RawRow>, FetchError>;

    /// False while the provider is refusing requests.
    fn is_available(&self) -> bool;
}

/// Fetch `symbol` and validate every row.
///
/// Failure line numbers are 1-based positions in the provider response.
pub fn fetch_records(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    range: &FetchRange,
    policy: RowPolicy,
) -> Result<LoadReport, FetchError> {
    let rows = provider.fetch(symbol, range)?;
    let mut report = LoadReport::default();
    for (i, row) in rows.into_iter().enumerate() {
        report.push_row(i as u64 + 1, Ok(row), policy)?;
    }
    info!(
        provider = provider.name(),
        symbol,
        records = report.records.len(),
        skipped = report.skipped(),
        "fetched bars"
    );
    Ok(report)
}
