//! Output document — the stable contract with the downstream chart.
//!
//! Prices round to 2 decimal places, correlations to 4. Anything
//! non-finite becomes JSON null; a null is always emitted under its key
//! rather than the key being dropped. The one legitimate absence is an
//! asset with no CSV at all, which has no key anywhere.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Round a price to 2 decimal places; non-finite values become None.
pub fn clean_price(v: f64) -> Option<f64> {
    if v.is_finite() {
        Some((v * 100.0).round() / 100.0)
    } else {
        None
    }
}

/// Round a correlation to 4 decimal places; non-finite values become None.
pub fn clean_corr(v: Option<f64>) -> Option<f64> {
    match v {
        Some(c) if c.is_finite() => Some((c * 10_000.0).round() / 10_000.0),
        _ => None,
    }
}

/// One weekly candle of the primary asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub t: String,
    pub o: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub c: Option<f64>,
}

/// One week's correlation coefficients for a single window length.
///
/// Assets flatten into the object alongside `t`; an asset with data that
/// week carries its coefficient, one inside a warmup/gapped window
/// carries null, and an asset with no CSV has no key at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub t: String,
    #[serde(flatten)]
    pub assets: BTreeMap<String, Option<f64>>,
}

/// The full output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    #[serde(rename = "btcLatest")]
    pub primary_latest: Option<f64>,
    pub candles: Vec<CandlePoint>,
    /// Stringified window length → one entry per return-series week.
    pub correlations: BTreeMap<String, Vec<CorrelationPoint>>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Format a date the way every `t` and `lastUpdated` field expects.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Serialize the document and write it atomically (tmp + rename).
///
/// Nothing is written unless serialization succeeds in full, and a
/// pre-existing artifact is never left half-overwritten.
pub fn write_json(dashboard: &Dashboard, path: &Path) -> Result<u64, ReportError> {
    let json = serde_json::to_string(dashboard)?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json).map_err(|e| ReportError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ReportError::Io {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(json.len() as u64)
}
