use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: found {found} aligned observations, need {required}")]
    InsufficientData { found: usize, required: usize },

    #[error("Correlation is undefined: {0}")]
    UndefinedStatistic(String),

    #[error("Input sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("No date has a value in every column; cannot build a joint sample")]
    InsufficientJointData,

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
