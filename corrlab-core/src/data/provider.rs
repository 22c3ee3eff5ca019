//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the market-data source so the
//! fetch stage can be exercised against a mock in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily OHLCV bar as returned by a provider, before normalization.
///
/// Individual price fields may be NaN when the source reported a partial
/// day; the store layer decides what to do with those.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no data returned for ticker '{ticker}'")]
    EmptyData { ticker: String },

    #[error("store error: {0}")]
    Store(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Empty responses are skipped with a warning rather than reported
    /// as failures; everything else is a real (still per-symbol) error.
    pub fn is_empty_data(&self) -> bool {
        matches!(self, DataError::EmptyData { .. })
    }
}

/// Trait for market-data providers.
///
/// Given a ticker and a date range, return daily bars, or empty/error.
/// Implementations own their transport concerns (timeouts, transient
/// retries); callers never retry.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for a ticker over an inclusive date range.
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError>;
}

/// Progress callback for multi-symbol fetch batches.
pub trait FetchProgress {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes (row count on success).
    fn on_complete(&self, symbol: &str, result: &Result<usize, DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, skipped: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout, warnings to stderr.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, result: &Result<usize, DataError>) {
        match result {
            Ok(rows) => println!("  OK: {symbol} ({rows} rows)"),
            Err(e) if e.is_empty_data() => eprintln!("  WARN: {symbol}: empty data, skipping"),
            Err(e) => eprintln!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, skipped: usize, failed: usize, total: usize) {
        println!(
            "\nFetch complete: {succeeded}/{total} succeeded, {skipped} skipped, {failed} failed"
        );
    }
}

/// No-op progress reporter for tests.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}
    fn on_complete(&self, _symbol: &str, _result: &Result<usize, DataError>) {}
    fn on_batch_complete(&self, _s: usize, _sk: usize, _f: usize, _t: usize) {}
}
