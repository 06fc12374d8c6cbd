use crate::error::ApiError;
use chrono::NaiveDate;
use core_types::MonthlySeries;
use serde::Deserialize;

/// FRED uses this placeholder for a missing observation.
const MISSING_VALUE: &str = ".";

/// The response from `GET /fred/series/observations?file_type=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsResponse {
    pub observations: Vec<Observation>,
}

/// A single observation. FRED sends values as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    pub date: String,
    pub value: String,
}

/// Represents an error response from the FRED API.
#[derive(Debug, Clone, Deserialize)]
pub struct FredErrorResponse {
    pub error_code: u16,
    pub error_message: String,
}

impl ObservationsResponse {
    /// Converts the observations into a month-end keyed series.
    ///
    /// Missing (`"."`) and non-numeric values are dropped rather than stored as zero.
    pub fn into_series(self) -> Result<MonthlySeries, ApiError> {
        let mut points = Vec::with_capacity(self.observations.len());
        for obs in self.observations {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                ApiError::InvalidData(format!("Invalid observation date '{}': {}", obs.date, e))
            })?;
            if obs.value == MISSING_VALUE {
                continue;
            }
            match obs.value.parse::<f64>() {
                Ok(value) if value.is_finite() => points.push((date, value)),
                _ => tracing::debug!(date = %obs.date, value = %obs.value, "Skipping non-numeric observation"),
            }
        }
        Ok(MonthlySeries::from_points(points)?)
    }
}
