//! corrlab core — the Bitcoin correlation dashboard data pipeline.
//!
//! Two sequential stages driven by one explicit [`config::PipelineConfig`]:
//! - Fetch: daily OHLCV per symbol from the data provider into one CSV
//!   per symbol (`data::fetch_symbols`).
//! - Aggregate: weekly resampling, rolling Pearson correlations against
//!   the primary asset, and the `data.json` artifact
//!   (`aggregate::aggregate_to_file`).
//!
//! The computation seams (resampling, return table, correlation) are
//! pure functions independent of I/O.

pub mod aggregate;
pub mod config;
pub mod correlate;
pub mod data;
pub mod domain;
pub mod report;
pub mod resample;
pub mod table;

pub use aggregate::{aggregate, aggregate_to_file, AggregateError};
pub use config::{ConfigError, PipelineConfig, SymbolSpec};
pub use data::{fetch_symbols, CsvStore, FetchSummary, StdoutProgress, YahooProvider};
pub use report::Dashboard;
