use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Carries no URL: the request URL holds the API key.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("FRED returned error {code}: {message}")]
    Fred { code: u16, message: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("Invalid series: {0}")]
    Core(#[from] core_types::CoreError),

    #[error("No FRED API key configured (set fred.api_key or FRED_API_KEY)")]
    MissingApiKey,

    #[error("No indicator data could be loaded")]
    NoData,
}

impl ApiError {
    pub fn http(err: reqwest::Error) -> Self {
        ApiError::Http(err.without_url())
    }
}
