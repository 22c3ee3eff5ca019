//! Canonical column mapping at the fetch boundary.
//!
//! External sources qualify columns with ticker strings (`Close BTC-USD`)
//! or duplicate them outright. This module collapses any such header row
//! to one canonical column per field, so the rest of the pipeline only
//! ever sees the flat `Date,Close,High,Low,Open,Volume` schema.

use thiserror::Error;

/// The canonical fields of a daily bar CSV, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Close,
    High,
    Low,
    Open,
    Volume,
}

/// The canonical fields in on-disk file order.
pub const FILE_ORDER: [Field; 6] = [
    Field::Date,
    Field::Close,
    Field::High,
    Field::Low,
    Field::Open,
    Field::Volume,
];

impl Field {
    pub fn header(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Close => "Close",
            Field::High => "High",
            Field::Low => "Low",
            Field::Open => "Open",
            Field::Volume => "Volume",
        }
    }
}

/// Match one header cell to a canonical field.
///
/// The first whitespace-separated token is compared case-insensitively,
/// which collapses ticker-qualified headers like `Close BTC-USD`.
pub fn canonical_field(header: &str) -> Option<Field> {
    let token = header.trim().split_whitespace().next()?;
    match token.to_ascii_lowercase().as_str() {
        "date" => Some(Field::Date),
        "close" => Some(Field::Close),
        "high" => Some(Field::High),
        "low" => Some(Field::Low),
        "open" => Some(Field::Open),
        "volume" => Some(Field::Volume),
        _ => None,
    }
}

/// Column indices of the canonical fields within a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub close: usize,
    pub high: usize,
    pub low: usize,
    pub open: usize,
    /// Absent in some hand-made files; rows then default to volume 0.
    pub volume: Option<usize>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Map a header row to canonical column indices.
///
/// Duplicated fields keep the first occurrence; unknown columns are
/// ignored. Date, Open, High, Low, and Close are required.
pub fn map_columns(headers: &[&str]) -> Result<ColumnMap, NormalizeError> {
    let mut date = None;
    let mut close = None;
    let mut high = None;
    let mut low = None;
    let mut open = None;
    let mut volume = None;

    for (i, header) in headers.iter().enumerate() {
        let slot = match canonical_field(header) {
            Some(Field::Date) => &mut date,
            Some(Field::Close) => &mut close,
            Some(Field::High) => &mut high,
            Some(Field::Low) => &mut low,
            Some(Field::Open) => &mut open,
            Some(Field::Volume) => &mut volume,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(i);
        }
    }

    Ok(ColumnMap {
        date: date.ok_or(NormalizeError::MissingColumn("Date"))?,
        close: close.ok_or(NormalizeError::MissingColumn("Close"))?,
        high: high.ok_or(NormalizeError::MissingColumn("High"))?,
        low: low.ok_or(NormalizeError::MissingColumn("Low"))?,
        open: open.ok_or(NormalizeError::MissingColumn("Open"))?,
        volume,
    })
}
