//! Daily → weekly resampling.
//!
//! Weeks are Monday-anchored, left-labeled, left-closed: a day belongs
//! to the week of the most recent Monday on or before it, and that
//! Monday is the bucket's label. Buckets are only ever built from
//! observations, so a week with no trading days simply does not exist
//! in the output.

use crate::domain::{DailyBar, WeeklyBar};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Resample daily bars into weekly OHLCV bars, date ascending.
///
/// Bars must be sorted by date ascending (the CSV store guarantees it).
/// open = first day's open, high = max, low = min, close = last day's
/// close, volume = sum. NaN highs/lows are skipped by the max/min fold.
pub fn resample_weekly(bars: &[DailyBar]) -> Vec<WeeklyBar> {
    let mut weeks: BTreeMap<NaiveDate, WeeklyBar> = BTreeMap::new();

    for bar in bars {
        let label = week_start(bar.date);
        weeks
            .entry(label)
            .and_modify(|w| {
                w.high = w.high.max(bar.high);
                w.low = w.low.min(bar.low);
                w.close = bar.close;
                w.volume += bar.volume;
            })
            .or_insert_with(|| WeeklyBar {
                week: label,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            });
    }

    weeks.into_values().collect()
}

/// Last observed close per Monday-anchored week, date ascending.
pub fn weekly_closes(bars: &[DailyBar]) -> Vec<(NaiveDate, f64)> {
    let mut closes: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for bar in bars {
        closes.insert(week_start(bar.date), bar.close);
    }
    closes.into_iter().collect()
}
