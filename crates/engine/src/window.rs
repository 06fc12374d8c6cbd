use chrono::{Months, NaiveDate};
use core_types::{MonthlySeries, month_end};
use serde::Serialize;

/// The trailing look-back window an analysis runs on. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisWindow {
    /// The window ending at the month of `end` and reaching back `lookback_months`.
    ///
    /// It spans `lookback_months + 1` calendar months.
    pub fn trailing(end: NaiveDate, lookback_months: u32) -> Self {
        let end = month_end(end);
        let start = end
            .checked_sub_months(Months::new(lookback_months))
            .map(month_end)
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Resolves the window for a target and the indicators being compared with it.
    ///
    /// The window ends at the earlier of the target's latest month and the latest
    /// month of any indicator. Without indicator data the target alone decides.
    /// Returns `None` for an empty target.
    pub fn resolve<'a, I>(target: &MonthlySeries, indicators: I, lookback_months: u32) -> Option<Self>
    where
        I: IntoIterator<Item = &'a MonthlySeries>,
    {
        let target_end = target.last_date()?;
        let end = indicators
            .into_iter()
            .filter_map(MonthlySeries::last_date)
            .max()
            .map_or(target_end, |latest| latest.min(target_end));
        Some(Self::trailing(end, lookback_months))
    }

    pub fn apply(&self, series: &MonthlySeries) -> MonthlySeries {
        series.window(self.start, self.end)
    }

    /// Human-readable range, e.g. `"2023-01 to 2023-12"`.
    pub fn period(&self) -> String {
        format!("{} to {}", self.start.format("%Y-%m"), self.end.format("%Y-%m"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::month_end_of;

    fn series(months: &[(i32, u32)]) -> MonthlySeries {
        months
            .iter()
            .map(|(y, m)| (month_end_of(*y, *m).unwrap(), 1.0))
            .collect()
    }

    #[test]
    fn trailing_window_covers_lookback_plus_one_months() {
        let window = AnalysisWindow::trailing(month_end_of(2023, 12).unwrap(), 12);
        assert_eq!(window.start, month_end_of(2022, 12).unwrap());
        assert_eq!(window.end, month_end_of(2023, 12).unwrap());
        assert_eq!(window.period(), "2022-12 to 2023-12");
    }

    #[test]
    fn start_is_normalized_to_month_end() {
        // March 31 minus one month clamps to Feb 28; month_end keeps it there.
        let window = AnalysisWindow::trailing(month_end_of(2023, 3).unwrap(), 1);
        assert_eq!(window.start, month_end_of(2023, 2).unwrap());
        let window = AnalysisWindow::trailing(month_end_of(2024, 4).unwrap(), 2);
        assert_eq!(window.start, month_end_of(2024, 2).unwrap());
    }

    #[test]
    fn end_is_the_earlier_latest_date() {
        let target = series(&[(2023, 1), (2023, 2), (2023, 3), (2023, 4)]);
        let short = series(&[(2023, 1), (2023, 2)]);
        let long = series(&[(2023, 1), (2023, 6)]);

        let window = AnalysisWindow::resolve(&target, [&short], 12).unwrap();
        assert_eq!(window.end, month_end_of(2023, 2).unwrap());

        // The latest indicator date counts, not the earliest.
        let window = AnalysisWindow::resolve(&target, [&short, &long], 12).unwrap();
        assert_eq!(window.end, month_end_of(2023, 4).unwrap());

        let window = AnalysisWindow::resolve(&target, std::iter::empty(), 12).unwrap();
        assert_eq!(window.end, month_end_of(2023, 4).unwrap());

        assert!(AnalysisWindow::resolve(&MonthlySeries::new(), [&short], 12).is_none());
    }

    #[test]
    fn apply_truncates_inclusively() {
        let target = series(&[(2023, 1), (2023, 2), (2023, 3), (2023, 4), (2023, 5)]);
        let window = AnalysisWindow::trailing(month_end_of(2023, 4).unwrap(), 2);
        assert_eq!(window.apply(&target).len(), 3);
    }
}
