//! # Ingest
//!
//! File-based inputs for the analysis: the sales series being explained and, as an
//! alternative to a live provider, a wide CSV of indicator series.

use chrono::NaiveDate;

pub mod error;
pub mod indicators;
pub mod sales;

pub use error::IngestError;
pub use indicators::{read_indicator_csv, write_indicator_csv};
pub use sales::{SalesColumns, load_sales_csv, read_sales};

/// Parses `YYYY-MM-DD`, `YYYY-MM`, `YYYY/MM/DD` or `MM/DD/YYYY`.
///
/// A trailing time of day (`2023-01-05 10:00:00`, `2023-01-05T10:00:00`) is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split([' ', 'T']).next()?;
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{date_part}-01"), "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_layouts() {
        let jan5 = NaiveDate::from_ymd_opt(2023, 1, 5);
        assert_eq!(parse_date("2023-01-05"), jan5);
        assert_eq!(parse_date("2023/01/05"), jan5);
        assert_eq!(parse_date("01/05/2023"), jan5);
        assert_eq!(parse_date("2023-01-05 10:30:00"), jan5);
        assert_eq!(parse_date("2023-01"), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(parse_date("Jan 2023"), None);
        assert_eq!(parse_date(""), None);
    }
}
