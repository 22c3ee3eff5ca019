//! Combined weekly-close table and return series.
//!
//! The table's date index is the primary asset's weekly index; other
//! assets are aligned to it and keep a gap (`None`) wherever they have
//! no observation. Weeks where only a non-primary asset traded are
//! dropped entirely.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Weekly closes for several assets on a shared weekly date index.
#[derive(Debug, Clone)]
pub struct WeeklyCloseTable {
    /// Weekly labels, ascending; exactly the primary asset's weeks.
    pub dates: Vec<NaiveDate>,
    /// Asset name → closes aligned to `dates` (None = no data that week).
    pub closes: BTreeMap<String, Vec<Option<f64>>>,
}

impl WeeklyCloseTable {
    /// Build the table from per-asset weekly close series.
    ///
    /// `primary` must be one of the keys in `series`; its weeks define
    /// the index. Other assets' weeks outside that index are dropped.
    pub fn build(
        primary: &str,
        series: &BTreeMap<String, Vec<(NaiveDate, f64)>>,
    ) -> Option<Self> {
        let primary_series = series.get(primary)?;
        let dates: Vec<NaiveDate> = primary_series.iter().map(|(d, _)| *d).collect();

        let mut closes = BTreeMap::new();
        for (name, asset_series) in series {
            let by_date: BTreeMap<NaiveDate, f64> = asset_series.iter().copied().collect();
            let column: Vec<Option<f64>> =
                dates.iter().map(|d| by_date.get(d).copied()).collect();
            closes.insert(name.clone(), column);
        }

        Some(Self { dates, closes })
    }

    /// Week-over-week fractional returns for every asset.
    ///
    /// The first row of the table has no prior period and is dropped, so
    /// the returned dates are `self.dates[1..]`. A missing close voids
    /// both returns that would reference it; a non-positive previous
    /// close is treated as a gap rather than producing an infinity.
    pub fn returns(&self) -> ReturnTable {
        let dates: Vec<NaiveDate> = self.dates.iter().skip(1).copied().collect();

        let mut returns = BTreeMap::new();
        for (name, column) in &self.closes {
            let col: Vec<Option<f64>> = column
                .windows(2)
                .map(|pair| match (pair[0], pair[1]) {
                    (Some(prev), Some(curr)) if prev > 0.0 => Some(curr / prev - 1.0),
                    _ => None,
                })
                .collect();
            returns.insert(name.clone(), col);
        }

        ReturnTable { dates, returns }
    }
}

/// Weekly fractional returns on a shared date index.
#[derive(Debug, Clone)]
pub struct ReturnTable {
    pub dates: Vec<NaiveDate>,
    pub returns: BTreeMap<String, Vec<Option<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mondays(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| day(2024, 1, 1) + chrono::Duration::weeks(i as i64))
            .collect()
    }

    fn series(dates: &[NaiveDate], closes: &[f64]) -> Vec<(NaiveDate, f64)> {
        dates.iter().copied().zip(closes.iter().copied()).collect()
    }

    #[test]
    fn index_is_restricted_to_primary_weeks() {
        let weeks = mondays(4);
        let mut input = BTreeMap::new();
        // Primary is missing week 2; SPY has it plus an extra later week
        input.insert(
            "BTC".to_string(),
            vec![
                (weeks[0], 100.0),
                (weeks[1], 110.0),
                (weeks[3], 120.0),
            ],
        );
        input.insert("SPY".to_string(), series(&weeks, &[50.0, 51.0, 52.0, 53.0]));

        let table = WeeklyCloseTable::build("BTC", &input).unwrap();

        assert_eq!(table.dates, vec![weeks[0], weeks[1], weeks[3]]);
        // SPY's week-2 close is dropped with the row
        assert_eq!(
            table.closes["SPY"],
            vec![Some(50.0), Some(51.0), Some(53.0)]
        );
    }

    #[test]
    fn missing_asset_weeks_stay_as_gaps() {
        let weeks = mondays(3);
        let mut input = BTreeMap::new();
        input.insert("BTC".to_string(), series(&weeks, &[100.0, 110.0, 121.0]));
        input.insert(
            "GLD".to_string(),
            vec![(weeks[0], 10.0), (weeks[2], 12.0)],
        );

        let table = WeeklyCloseTable::build("BTC", &input).unwrap();
        assert_eq!(table.closes["GLD"], vec![Some(10.0), None, Some(12.0)]);
    }

    #[test]
    fn build_without_primary_returns_none() {
        let input = BTreeMap::new();
        assert!(WeeklyCloseTable::build("BTC", &input).is_none());
    }

    #[test]
    fn returns_drop_first_row() {
        let weeks = mondays(3);
        let mut input = BTreeMap::new();
        input.insert("BTC".to_string(), series(&weeks, &[100.0, 110.0, 99.0]));

        let table = WeeklyCloseTable::build("BTC", &input).unwrap();
        let rets = table.returns();

        assert_eq!(rets.dates, vec![weeks[1], weeks[2]]);
        let btc = &rets.returns["BTC"];
        assert_eq!(btc.len(), 2);
        assert!((btc[0].unwrap() - 0.10).abs() < 1e-12);
        assert!((btc[1].unwrap() - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn gap_in_closes_voids_both_adjacent_returns() {
        let weeks = mondays(4);
        let mut input = BTreeMap::new();
        input.insert(
            "BTC".to_string(),
            series(&weeks, &[100.0, 110.0, 121.0, 133.1]),
        );
        input.insert(
            "DXY".to_string(),
            vec![(weeks[0], 10.0), (weeks[2], 12.0), (weeks[3], 13.0)],
        );

        let table = WeeklyCloseTable::build("BTC", &input).unwrap();
        let rets = table.returns();

        // DXY: week1 return needs week0+week1 closes (week1 missing),
        // week2 return needs week1 (missing), week3 is fine.
        assert_eq!(
            rets.returns["DXY"],
            vec![None, None, Some(13.0 / 12.0 - 1.0)]
        );
    }

    #[test]
    fn non_positive_previous_close_is_a_gap() {
        let weeks = mondays(3);
        let mut input = BTreeMap::new();
        input.insert("BTC".to_string(), series(&weeks, &[0.0, 110.0, 121.0]));

        let table = WeeklyCloseTable::build("BTC", &input).unwrap();
        let rets = table.returns();
        assert_eq!(rets.returns["BTC"][0], None);
        assert!((rets.returns["BTC"][1].unwrap() - 0.10).abs() < 1e-12);
    }
}
