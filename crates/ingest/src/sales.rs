use crate::error::IngestError;
use crate::parse_date;
use core_types::MonthlySeries;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DATE_KEYWORDS: [&str; 5] = ["date", "time", "month", "year", "period"];
const SALES_KEYWORDS: [&str; 5] = ["sales", "revenue", "export", "amount", "value"];

/// Which columns of the sales file hold the date and the amount.
///
/// A `None` column is guessed from the header.
#[derive(Debug, Clone, Default)]
pub struct SalesColumns {
    pub date: Option<String>,
    pub sales: Option<String>,
}

/// Reads a sales CSV file into a monthly-summed series.
pub fn load_sales_csv<P: AsRef<Path>>(
    path: P,
    columns: &SalesColumns,
) -> Result<MonthlySeries, IngestError> {
    let file = std::fs::File::open(path.as_ref())?;
    info!(path = %path.as_ref().display(), "Loading sales data");
    read_sales(file, columns)
}

/// Reads sales rows from any CSV source with a header row.
///
/// Rows with an unparseable date or amount are dropped. Amounts are summed per
/// calendar month and months whose total is not positive are discarded.
pub fn read_sales<R: Read>(reader: R, columns: &SalesColumns) -> Result<MonthlySeries, IngestError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let (date_col, sales_col) = resolve_columns(&headers, columns)?;
    debug!(
        date_column = &headers[date_col],
        sales_column = &headers[sales_col],
        "Resolved sales columns"
    );

    let mut monthly = MonthlySeries::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let date = record.get(date_col).and_then(parse_date);
        let amount = record.get(sales_col).and_then(parse_amount);
        match (date, amount) {
            (Some(date), Some(amount)) => monthly.accumulate(date, amount),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "Dropped unparseable sales rows");
    }

    let series: MonthlySeries = monthly.iter().filter(|(_, total)| *total > 0.0).collect();
    if series.is_empty() {
        return Err(IngestError::NoValidRows);
    }
    info!(months = series.len(), "Sales data loaded");
    Ok(series)
}

/// Finds the date and sales column indices.
///
/// Explicit names win. Otherwise the first header containing a date keyword and the
/// first other header containing a sales keyword are used; when nothing matches the
/// first two columns are taken.
fn resolve_columns(
    headers: &StringRecord,
    columns: &SalesColumns,
) -> Result<(usize, usize), IngestError> {
    let lowered: Vec<String> = headers.iter().map(str::to_lowercase).collect();
    let find_named = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
    };
    let find_keyword = |keywords: &[&str], skip: Option<usize>| {
        lowered
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .find(|(_, h)| keywords.iter().any(|k| h.contains(k)))
            .map(|(i, _)| i)
    };

    let date_col = match &columns.date {
        Some(name) => Some(find_named(name)?),
        None => find_keyword(&DATE_KEYWORDS, None),
    };
    let sales_col = match &columns.sales {
        Some(name) => Some(find_named(name)?),
        None => find_keyword(&SALES_KEYWORDS, date_col),
    };

    let date_col = date_col.unwrap_or(0);
    let sales_col = match sales_col {
        Some(col) => col,
        None => (0..headers.len())
            .find(|i| *i != date_col)
            .ok_or(IngestError::UnidentifiedColumns(headers.len()))?,
    };
    if date_col == sales_col || sales_col >= headers.len() {
        return Err(IngestError::UnidentifiedColumns(headers.len()));
    }
    Ok((date_col, sales_col))
}

/// Parses an amount, tolerating thousands separators.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
