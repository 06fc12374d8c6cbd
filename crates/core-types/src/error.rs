use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Duplicate observation for month {0}")]
    DuplicateMonth(NaiveDate),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
