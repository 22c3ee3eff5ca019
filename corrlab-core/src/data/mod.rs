//! Data layer: provider trait, Yahoo Finance implementation, column
//! normalization, CSV store, and the fetch orchestrator.

pub mod csv_store;
pub mod fetch;
pub mod normalize;
pub mod provider;
pub mod yahoo;

pub use csv_store::{CsvStore, StoreError};
pub use fetch::{fetch_symbols, FetchSummary};
pub use provider::{DataError, DataProvider, FetchProgress, RawBar, SilentProgress, StdoutProgress};
pub use yahoo::YahooProvider;
