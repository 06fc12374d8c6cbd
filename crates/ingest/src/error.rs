use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column '{0}' not found in the header")]
    MissingColumn(String),

    #[error("Could not identify date and sales columns: the file has {0} column(s)")]
    UnidentifiedColumns(usize),

    #[error("No valid sales rows remained after parsing")]
    NoValidRows,

    #[error("Invalid series: {0}")]
    Core(#[from] core_types::CoreError),
}
