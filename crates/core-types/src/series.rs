use crate::error::CoreError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named collection of indicator series, e.g. `"USD/KRW" -> MonthlySeries`.
pub type IndicatorSet = BTreeMap<String, MonthlySeries>;

/// Returns the last calendar day of the month containing `date`.
///
/// Every timestamp stored in a `MonthlySeries` is normalized through this function,
/// which makes "one observation per month" a structural property of the map key.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date - Days::new(u64::from(date.day0()));
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Builds the month-end date for a year and a 1-based month.
pub fn month_end_of(year: i32, month: u32) -> Result<NaiveDate, CoreError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(month_end)
        .ok_or_else(|| CoreError::InvalidDate(format!("{year}-{month:02}")))
}

/// A monthly time series keyed by month-end date.
///
/// Values may be `NaN`; such points count as missing wherever a statistic is computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from raw `(date, value)` points.
    ///
    /// Dates are normalized to month-end. Two points falling in the same month are
    /// rejected with `CoreError::DuplicateMonth`.
    pub fn from_points<I>(points: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut series = Self::new();
        for (date, value) in points {
            series.insert(date, value)?;
        }
        Ok(series)
    }

    /// Inserts a single observation, rejecting a second value for an already-present month.
    pub fn insert(&mut self, date: NaiveDate, value: f64) -> Result<(), CoreError> {
        let key = month_end(date);
        if self.points.contains_key(&key) {
            return Err(CoreError::DuplicateMonth(key));
        }
        self.points.insert(key, value);
        Ok(())
    }

    /// Adds `value` to the month's running total, creating the month if absent.
    pub fn accumulate(&mut self, date: NaiveDate, value: f64) {
        *self.points.entry(month_end(date)).or_insert(0.0) += value;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&month_end(date)).copied()
    }

    /// Iterates over `(month_end, value)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.keys().copied().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Keeps only the observations with `start <= date <= end`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::new();
        }
        Self {
            points: self
                .points
                .range(start..=end)
                .map(|(d, v)| (*d, *v))
                .collect(),
        }
    }

    /// Shifts values forward by `positions` observations.
    ///
    /// The shift is positional: the value observed at index `i` moves to the date at
    /// index `i + positions`. The first `positions` dates have no value afterwards and
    /// are dropped, so the result is `positions` observations shorter.
    pub fn shift_forward(&self, positions: usize) -> Self {
        if positions == 0 {
            return self.clone();
        }
        let dates = self.points.keys().skip(positions).copied();
        let values = self.points.values().copied();
        Self {
            points: dates.zip(values).collect(),
        }
    }

    /// Fills gaps so the series covers every month between its first and last date.
    ///
    /// Missing months and `NaN` values take the most recent preceding value. Leading
    /// `NaN`s have nothing to carry forward and are dropped.
    pub fn forward_fill(&self) -> Self {
        match self.last_date() {
            Some(last) => self.forward_fill_to(last),
            None => Self::new(),
        }
    }

    /// Like `forward_fill`, but extends the grid through the month of `end`,
    /// carrying the last value past the series' own last date.
    pub fn forward_fill_to(&self, end: NaiveDate) -> Self {
        let Some(first) = self.first_date() else {
            return Self::new();
        };
        let last = month_end(end).max(self.last_date().unwrap_or(first));

        let mut filled = BTreeMap::new();
        let mut carry: Option<f64> = None;
        let mut cursor = first;
        while cursor <= last {
            if let Some(value) = self.points.get(&cursor).copied().filter(|v| !v.is_nan()) {
                carry = Some(value);
            }
            if let Some(value) = carry {
                filled.insert(cursor, value);
            }
            cursor = match cursor.checked_add_months(Months::new(1)) {
                Some(next) => month_end(next),
                None => break,
            };
        }
        Self { points: filled }
    }

    /// Month-over-month percentage change, `(v[t] / v[t-1] - 1) * 100`.
    ///
    /// Computed positionally like `shift_forward`. Points whose change is not finite
    /// (a zero or missing predecessor) are omitted.
    pub fn pct_change(&self) -> Self {
        let points = self
            .points
            .iter()
            .zip(self.points.iter().skip(1))
            .filter_map(|((_, prev), (date, current))| {
                let change = (current / prev - 1.0) * 100.0;
                change.is_finite().then_some((*date, change))
            })
            .collect();
        Self { points }
    }
}

impl FromIterator<(NaiveDate, f64)> for MonthlySeries {
    /// Collects points, keeping the last value when two fall in the same month.
    fn from_iter<T: IntoIterator<Item = (NaiveDate, f64)>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().map(|(d, v)| (month_end(d), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly(start_year: i32, start_month: u32, values: &[f64]) -> MonthlySeries {
        let start = month_end_of(start_year, start_month).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (month_end(start + Months::new(i as u32)), *v))
            .collect()
    }

    #[test]
    fn month_end_handles_leap_years_and_december() {
        assert_eq!(month_end(d(2024, 2, 3)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 2, 28)), d(2023, 2, 28));
        assert_eq!(month_end(d(2023, 12, 1)), d(2023, 12, 31));
        assert_eq!(month_end(d(2023, 4, 30)), d(2023, 4, 30));
    }

    #[test]
    fn month_end_of_rejects_invalid_month() {
        assert!(month_end_of(2023, 13).is_err());
        assert_eq!(month_end_of(2023, 6).unwrap(), d(2023, 6, 30));
    }

    #[test]
    fn insert_normalizes_and_rejects_duplicate_months() {
        let mut series = MonthlySeries::new();
        series.insert(d(2023, 1, 5), 1.0).unwrap();
        let err = series.insert(d(2023, 1, 20), 2.0).unwrap_err();
        assert_eq!(err, CoreError::DuplicateMonth(d(2023, 1, 31)));
        assert_eq!(series.get(d(2023, 1, 1)), Some(1.0));
        assert_eq!(series.dates(), vec![d(2023, 1, 31)]);
    }

    #[test]
    fn accumulate_sums_within_a_month() {
        let mut series = MonthlySeries::new();
        series.accumulate(d(2023, 3, 1), 10.0);
        series.accumulate(d(2023, 3, 15), 5.0);
        series.accumulate(d(2023, 4, 2), 1.0);
        assert_eq!(series.values(), vec![15.0, 1.0]);
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let series = monthly(2023, 1, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let windowed = series.window(d(2023, 2, 28), d(2023, 4, 30));
        assert_eq!(windowed.values(), vec![2.0, 3.0, 4.0]);
        assert!(series.window(d(2023, 5, 31), d(2023, 1, 31)).is_empty());
    }

    #[test]
    fn shift_forward_drops_leading_observations() {
        let series = monthly(2023, 1, &[1.0, 2.0, 3.0, 4.0]);
        let shifted = series.shift_forward(1);
        assert_eq!(shifted.dates(), vec![d(2023, 2, 28), d(2023, 3, 31), d(2023, 4, 30)]);
        assert_eq!(shifted.values(), vec![1.0, 2.0, 3.0]);
        assert!(series.shift_forward(4).is_empty());
        assert_eq!(series.shift_forward(0), series);
    }

    #[test]
    fn shift_is_positional_across_calendar_gaps() {
        let series =
            MonthlySeries::from_points([(d(2023, 1, 31), 1.0), (d(2023, 5, 31), 2.0), (d(2023, 6, 30), 3.0)])
                .unwrap();
        let shifted = series.shift_forward(1);
        assert_eq!(shifted.get(d(2023, 5, 31)), Some(1.0));
        assert_eq!(shifted.get(d(2023, 6, 30)), Some(2.0));
    }

    #[test]
    fn forward_fill_covers_gaps_and_nans() {
        let series = MonthlySeries::from_points([
            (d(2023, 1, 31), f64::NAN),
            (d(2023, 2, 28), 1.0),
            (d(2023, 3, 31), f64::NAN),
            (d(2023, 5, 31), 4.0),
        ])
        .unwrap();
        let filled = series.forward_fill();
        assert_eq!(
            filled.dates(),
            vec![d(2023, 2, 28), d(2023, 3, 31), d(2023, 4, 30), d(2023, 5, 31)]
        );
        assert_eq!(filled.values(), vec![1.0, 1.0, 1.0, 4.0]);
    }

    #[test]
    fn forward_fill_to_pads_past_the_last_observation() {
        let series = MonthlySeries::from_points([(d(2023, 1, 31), 2.0), (d(2023, 3, 31), 3.0)])
            .unwrap();
        let filled = series.forward_fill_to(d(2023, 5, 15));
        assert_eq!(filled.last_date(), Some(d(2023, 5, 31)));
        assert_eq!(filled.values(), vec![2.0, 2.0, 3.0, 3.0, 3.0]);

        // An earlier end never truncates.
        assert_eq!(series.forward_fill_to(d(2023, 2, 1)), series.forward_fill());
    }

    #[test]
    fn pct_change_skips_zero_predecessors() {
        let series = monthly(2023, 1, &[100.0, 110.0, 0.0, 5.0]);
        let change = series.pct_change();
        assert_eq!(change.len(), 2);
        assert!((change.get(d(2023, 2, 28)).unwrap() - 10.0).abs() < 1e-9);
        assert!((change.get(d(2023, 3, 31)).unwrap() + 100.0).abs() < 1e-9);
        assert_eq!(change.get(d(2023, 4, 30)), None);
    }

    #[test]
    fn serializes_as_date_keyed_map() {
        let series = monthly(2023, 1, &[1.5]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"points":{"2023-01-31":1.5}}"#);
    }
}
