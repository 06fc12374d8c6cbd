use chrono::NaiveDate;
use core_types::MonthlySeries;
use serde::Serialize;

/// Several series laid side by side on the months where every one of them has a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JointFrame {
    pub columns: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// One row per date, one value per column, in `columns` order.
    pub rows: Vec<Vec<f64>>,
}

impl JointFrame {
    /// Inner-joins the given columns on their dates.
    ///
    /// A month survives only if every column holds a non-`NaN` value for it, so all
    /// columns share one consistent sample.
    pub fn inner_join(columns: &[(&str, &MonthlySeries)]) -> Self {
        let Some((_, first)) = columns.first() else {
            return Self::default();
        };

        let mut frame = Self {
            columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
            ..Self::default()
        };

        for date in first.dates() {
            let row: Option<Vec<f64>> = columns
                .iter()
                .map(|(_, series)| series.get(date).filter(|v| !v.is_nan()))
                .collect();
            if let Some(row) = row {
                frame.dates.push(date);
                frame.rows.push(row);
            }
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::month_end_of;

    fn series(points: &[(u32, f64)]) -> MonthlySeries {
        points
            .iter()
            .map(|(m, v)| (month_end_of(2023, *m).unwrap(), *v))
            .collect()
    }

    #[test]
    fn drops_dates_missing_in_any_column() {
        let a = series(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
        let b = series(&[(1, 10.0), (2, f64::NAN), (3, 30.0), (4, 40.0)]);
        let c = series(&[(1, 100.0), (3, 300.0)]);
        let frame = JointFrame::inner_join(&[("a", &a), ("b", &b), ("c", &c)]);
        assert_eq!(frame.columns, vec!["a", "b", "c"]);
        assert_eq!(frame.dates, vec![month_end_of(2023, 1).unwrap(), month_end_of(2023, 3).unwrap()]);
        assert_eq!(frame.rows, vec![vec![1.0, 10.0, 100.0], vec![3.0, 30.0, 300.0]]);
        assert_eq!(frame.column("b"), Some(vec![10.0, 30.0]));
        assert_eq!(frame.column("missing"), None);
    }

    #[test]
    fn no_columns_means_empty_frame() {
        let frame = JointFrame::inner_join(&[]);
        assert!(frame.is_empty());
        assert!(frame.columns.is_empty());
    }
}
