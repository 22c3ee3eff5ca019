//! Flat CSV store — one `data/<Symbol>.csv` per symbol.
//!
//! Schema: header `Date,Close,High,Low,Open,Volume`, `YYYY-MM-DD` dates,
//! integer volume. Writes are atomic (write to .tmp, rename into place)
//! and fully replace the previous file. Loading tolerates the header
//! shapes the normalize module knows about and returns bars sorted by
//! date ascending.

use super::normalize::{self, Field, NormalizeError};
use crate::domain::DailyBar;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no CSV for symbol '{symbol}'")]
    MissingFile { symbol: String },

    #[error("bad header in {path}: {source}")]
    BadHeader {
        path: PathBuf,
        source: NormalizeError,
    },

    #[error("bad row {row} in {path}: {reason}")]
    BadRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("csv error for {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("io error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The per-symbol CSV store.
pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of a symbol's CSV: `{data_dir}/{Symbol}.csv`
    pub fn path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.csv"))
    }

    pub fn exists(&self, symbol: &str) -> bool {
        self.path(symbol).exists()
    }

    /// Write a symbol's bars, fully replacing any previous file.
    ///
    /// The write is atomic: a .tmp file is renamed into place, so a
    /// failed run never leaves a truncated CSV behind.
    pub fn write(&self, symbol: &str, bars: &[DailyBar]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::Io {
            path: self.data_dir.clone(),
            source: e,
        })?;

        let path = self.path(symbol);
        let tmp_path = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp_path).map_err(|e| StoreError::Csv {
            path: tmp_path.clone(),
            source: e,
        })?;

        let write_err = |e: csv::Error| StoreError::Csv {
            path: tmp_path.clone(),
            source: e,
        };

        writer
            .write_record(normalize::FILE_ORDER.map(Field::header))
            .map_err(write_err)?;

        for bar in bars {
            writer
                .write_record([
                    bar.date.format(DATE_FORMAT).to_string(),
                    bar.close.to_string(),
                    bar.high.to_string(),
                    bar.low.to_string(),
                    bar.open.to_string(),
                    bar.volume.to_string(),
                ])
                .map_err(write_err)?;
        }

        writer.flush().map_err(|e| StoreError::Io {
            path: tmp_path.clone(),
            source: e,
        })?;
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io { path, source: e }
        })
    }

    /// Load a symbol's bars, sorted by date ascending.
    pub fn load(&self, symbol: &str) -> Result<Vec<DailyBar>, StoreError> {
        let path = self.path(symbol);
        if !path.exists() {
            return Err(StoreError::MissingFile {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| StoreError::Csv {
            path: path.clone(),
            source: e,
        })?;

        let headers = reader
            .headers()
            .map_err(|e| StoreError::Csv {
                path: path.clone(),
                source: e,
            })?
            .clone();
        let header_cells: Vec<&str> = headers.iter().collect();
        let columns = normalize::map_columns(&header_cells).map_err(|e| StoreError::BadHeader {
            path: path.clone(),
            source: e,
        })?;

        let mut bars = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| StoreError::Csv {
                path: path.clone(),
                source: e,
            })?;
            // Header row is row 1 in the file
            let row = i + 2;
            let bad_row = |reason: String| StoreError::BadRow {
                path: path.clone(),
                row,
                reason,
            };

            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

            let date = NaiveDate::parse_from_str(cell(columns.date), DATE_FORMAT)
                .map_err(|e| bad_row(format!("date '{}': {e}", cell(columns.date))))?;

            let price = |idx: usize, name: &str| -> Result<f64, StoreError> {
                cell(idx)
                    .parse::<f64>()
                    .map_err(|e| bad_row(format!("{name} '{}': {e}", cell(idx))))
            };

            let close = price(columns.close, "close")?;
            let high = price(columns.high, "high")?;
            let low = price(columns.low, "low")?;
            let open = price(columns.open, "open")?;

            // Volume: missing column or empty cell means 0; float-formatted
            // integers from other tools are coerced.
            let volume = match columns.volume {
                Some(idx) if !cell(idx).is_empty() => cell(idx)
                    .parse::<f64>()
                    .map_err(|e| bad_row(format!("volume '{}': {e}", cell(idx))))?
                    .max(0.0) as u64,
                _ => 0,
            };

            bars.push(DailyBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
