//! Aggregation stage — CSVs in, dashboard document out.
//!
//! Reads whatever per-symbol CSVs exist, resamples to weekly bars,
//! computes rolling correlations against the primary asset, and
//! assembles the output document. A missing non-primary CSV just drops
//! that asset from the output; a missing primary CSV aborts the stage
//! before anything is written.

use crate::config::PipelineConfig;
use crate::correlate::rolling_correlation;
use crate::data::csv_store::{CsvStore, StoreError};
use crate::domain::DailyBar;
use crate::report::{
    clean_corr, clean_price, format_date, write_json, CandlePoint, CorrelationPoint, Dashboard,
    ReportError,
};
use crate::resample::{resample_weekly, weekly_closes};
use crate::table::WeeklyCloseTable;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("missing primary asset data: no CSV for '{symbol}'")]
    MissingPrimary { symbol: String },

    #[error("primary asset '{symbol}' has no usable rows")]
    EmptyPrimary { symbol: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Run the aggregation pipeline and build the output document.
///
/// Any per-row CSV error is a hard failure of the run; there is no
/// partial document.
pub fn aggregate(config: &PipelineConfig) -> Result<Dashboard, AggregateError> {
    let store = CsvStore::new(&config.data_dir);

    // 1. Load every available CSV into a date-sorted daily series.
    let mut daily: BTreeMap<String, Vec<DailyBar>> = BTreeMap::new();
    for spec in &config.symbols {
        if !store.exists(&spec.name) {
            if spec.name == config.primary {
                return Err(AggregateError::MissingPrimary {
                    symbol: spec.name.clone(),
                });
            }
            eprintln!("  WARN: no CSV for {}, omitting from output", spec.name);
            continue;
        }
        daily.insert(spec.name.clone(), store.load(&spec.name)?);
    }

    let primary_bars = daily
        .get(&config.primary)
        .ok_or_else(|| AggregateError::MissingPrimary {
            symbol: config.primary.clone(),
        })?;

    // 2. Primary asset weekly candles.
    let weekly = resample_weekly(primary_bars);
    let last_bar = weekly.last().ok_or_else(|| AggregateError::EmptyPrimary {
        symbol: config.primary.clone(),
    })?;

    // 3. Weekly last closes per symbol.
    let mut close_series: BTreeMap<String, Vec<(chrono::NaiveDate, f64)>> = BTreeMap::new();
    for (name, bars) in &daily {
        close_series.insert(name.clone(), weekly_closes(bars));
    }

    // 4–5. Combined table on the primary's weekly index, then returns.
    let table = WeeklyCloseTable::build(&config.primary, &close_series).ok_or_else(|| {
        AggregateError::MissingPrimary {
            symbol: config.primary.clone(),
        }
    })?;
    let rets = table.returns();
    let primary_returns = &rets.returns[&config.primary];

    // 6. Rolling correlations per window, assets with no CSV omitted.
    let mut correlations = BTreeMap::new();
    for &window in &config.windows {
        let per_asset: Vec<(String, Vec<Option<f64>>)> = config
            .correlation_assets
            .iter()
            .filter_map(|asset| {
                rets.returns.get(asset).map(|asset_returns| {
                    (
                        asset.clone(),
                        rolling_correlation(primary_returns, asset_returns, window),
                    )
                })
            })
            .collect();

        let points: Vec<CorrelationPoint> = rets
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| CorrelationPoint {
                t: format_date(*date),
                assets: per_asset
                    .iter()
                    .map(|(name, series)| (name.clone(), clean_corr(series[i])))
                    .collect(),
            })
            .collect();

        correlations.insert(window.to_string(), points);
    }

    // 7. Assemble, rounded and null-sanitized.
    let candles: Vec<CandlePoint> = weekly
        .iter()
        .map(|w| CandlePoint {
            t: format_date(w.week),
            o: clean_price(w.open),
            h: clean_price(w.high),
            l: clean_price(w.low),
            c: clean_price(w.close),
        })
        .collect();

    Ok(Dashboard {
        last_updated: format_date(last_bar.week),
        primary_latest: clean_price(last_bar.close),
        candles,
        correlations,
    })
}

/// Aggregate and write the artifact. Returns the document and its size
/// in bytes. Nothing is written when aggregation fails.
pub fn aggregate_to_file(config: &PipelineConfig) -> Result<(Dashboard, u64), AggregateError> {
    let dashboard = aggregate(config)?;
    let size = write_json(&dashboard, &config.output_path)?;
    Ok((dashboard, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SymbolSpec;
    use chrono::{Duration, NaiveDate};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir =
            std::env::temp_dir().join(format!("corrlab_agg_{}_{id}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn daily_closes(start: NaiveDate, closes: &[f64]) -> Vec<DailyBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| DailyBar {
                date: start + Duration::weeks(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 10,
            })
            .collect()
    }

    fn test_config(dir: &PathBuf) -> PipelineConfig {
        PipelineConfig {
            symbols: vec![
                SymbolSpec::new("BTC", "BTC-USD"),
                SymbolSpec::new("SPY", "SPY"),
            ],
            primary: "BTC".into(),
            correlation_assets: vec!["SPY".into()],
            windows: vec![3],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            data_dir: dir.clone(),
            output_path: dir.join("data.json"),
        }
    }

    #[test]
    fn aggregates_two_symbols() {
        let dir = temp_dir();
        let config = test_config(&dir);
        let store = CsvStore::new(&dir);
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        store
            .write(
                "BTC",
                &daily_closes(monday, &[100.0, 110.0, 99.0, 120.0, 130.0]),
            )
            .unwrap();
        store
            .write(
                "SPY",
                &daily_closes(monday, &[50.0, 55.0, 49.5, 60.0, 65.0]),
            )
            .unwrap();

        let dashboard = aggregate(&config).unwrap();

        assert_eq!(dashboard.candles.len(), 5);
        assert_eq!(dashboard.last_updated, "2024-01-29");
        assert_eq!(dashboard.primary_latest, Some(130.0));

        let corr = &dashboard.correlations["3"];
        // 5 weekly closes -> 4 returns
        assert_eq!(corr.len(), 4);
        assert_eq!(corr[0].assets["SPY"], None);
        assert_eq!(corr[1].assets["SPY"], None);
        // SPY tracks BTC exactly in fractional terms
        assert_eq!(corr[2].assets["SPY"], Some(1.0));
        assert_eq!(corr[3].assets["SPY"], Some(1.0));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_primary_csv_is_fatal() {
        let dir = temp_dir();
        let config = test_config(&dir);
        let store = CsvStore::new(&dir);
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store
            .write("SPY", &daily_closes(monday, &[50.0, 55.0]))
            .unwrap();

        assert!(matches!(
            aggregate(&config),
            Err(AggregateError::MissingPrimary { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
