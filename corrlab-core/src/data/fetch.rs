//! Fetch stage — sequential multi-symbol download into the CSV store.
//!
//! Per-symbol failures never abort the batch: an empty response is a
//! warning and a skip, any other error is logged and the loop moves on.
//! Partial success is a valid terminal state; the aggregation stage
//! decides what it can do with whatever CSVs exist afterwards.

use super::csv_store::CsvStore;
use super::provider::{DataError, DataProvider, FetchProgress};
use crate::config::PipelineConfig;
use crate::domain::DailyBar;
use chrono::{Duration, NaiveDate};

/// Outcome of one fetch batch.
#[derive(Debug)]
pub struct FetchSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Symbols with an empty response (warned, not failed).
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl FetchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Fetch every configured symbol and overwrite its CSV.
///
/// The requested range runs from the config start date through tomorrow;
/// the one-day overhang tolerates timezone skew at the data source.
pub fn fetch_symbols(
    provider: &dyn DataProvider,
    store: &CsvStore,
    config: &PipelineConfig,
    today: NaiveDate,
    progress: &dyn FetchProgress,
) -> FetchSummary {
    let total = config.symbols.len();
    let end = today + Duration::days(1);

    let mut succeeded = 0;
    let mut skipped = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, spec) in config.symbols.iter().enumerate() {
        progress.on_start(&spec.name, i, total);

        let result = fetch_single(provider, store, &spec.ticker, &spec.name, config.start_date, end);
        progress.on_complete(&spec.name, &result);

        match result {
            Ok(_) => succeeded += 1,
            Err(e) if e.is_empty_data() => skipped += 1,
            Err(e) => {
                errors.push((spec.name.clone(), e));
                failed += 1;
            }
        }
    }

    progress.on_batch_complete(succeeded, skipped, failed, total);

    FetchSummary {
        total,
        succeeded,
        skipped,
        failed,
        errors,
    }
}

/// Fetch one symbol: provider → domain bars → CSV. Returns the row count.
fn fetch_single(
    provider: &dyn DataProvider,
    store: &CsvStore,
    ticker: &str,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize, DataError> {
    let raw = provider.fetch(ticker, start, end)?;

    // Void bars (any NaN price) carry nothing downstream. Implausible
    // OHLC is kept but flagged; its close still drives the weekly series.
    let mut bars: Vec<DailyBar> = Vec::with_capacity(raw.len());
    for b in raw {
        let bar = DailyBar {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        };
        if bar.is_void() {
            continue;
        }
        if !bar.is_sane() {
            eprintln!("  WARN: {symbol}: implausible OHLC on {}", bar.date);
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(DataError::EmptyData {
            ticker: ticker.to_string(),
        });
    }

    store
        .write(symbol, &bars)
        .map_err(|e| DataError::Store(e.to_string()))?;
    Ok(bars.len())
}
