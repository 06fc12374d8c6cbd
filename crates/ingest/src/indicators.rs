use crate::error::IngestError;
use crate::parse_date;
use core_types::{IndicatorSet, MonthlySeries};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Reads a wide indicator file: a date column followed by one column per indicator.
///
/// Empty or non-numeric cells are treated as missing for that indicator only.
/// Columns with no usable value are left out of the returned set.
pub fn read_indicator_csv<P: AsRef<Path>>(path: P) -> Result<IndicatorSet, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;
    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(IngestError::UnidentifiedColumns(headers.len()));
    }

    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut columns: Vec<Vec<(chrono::NaiveDate, f64)>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        let Some(date) = record.get(0).and_then(parse_date) else {
            debug!(row = ?record.position().map(|p| p.line()), "Skipping row without a valid date");
            continue;
        };
        for (column, cell) in columns.iter_mut().zip(record.iter().skip(1)) {
            if let Ok(value) = cell.parse::<f64>() {
                if value.is_finite() {
                    column.push((date, value));
                }
            }
        }
    }

    let mut set = IndicatorSet::new();
    for (name, points) in names.into_iter().zip(columns) {
        if points.is_empty() {
            debug!(indicator = %name, "Column has no values, skipping");
            continue;
        }
        set.insert(name, MonthlySeries::from_points(points)?);
    }
    info!(path = %path.as_ref().display(), count = set.len(), "Indicator file loaded");
    Ok(set)
}

/// Writes an indicator set in the wide layout understood by `read_indicator_csv`.
///
/// Rows cover the union of all dates; a month an indicator lacks is left blank.
pub fn write_indicator_csv<P: AsRef<Path>>(path: P, set: &IndicatorSet) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec!["date".to_string()];
    header.extend(set.keys().cloned());
    writer.write_record(&header)?;

    let dates: BTreeSet<_> = set.values().flat_map(|s| s.dates()).collect();
    for date in dates {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        row.extend(
            set.values()
                .map(|s| s.get(date).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), count = set.len(), "Indicator file written");
    Ok(())
}
