use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid analysis parameters: {0}")]
    InvalidParameters(String),

    #[error("No data in the analysis window {start} to {end}")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error("None of the {requested} selected indicator(s) produced a valid correlation for {period}")]
    NoValidResults { requested: usize, period: String },
}
