use crate::error::ApiError;
use crate::responses::{FredErrorResponse, ObservationsResponse};
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::FredSettings;
use core_types::MonthlySeries;
use std::time::Duration;

pub mod cache;
pub mod error;
pub mod loader;
pub mod responses;
// --- Public API ---
pub use cache::{CacheKey, SeriesCache};
pub use loader::IndicatorLoader;

/// The abstract interface for a source of monthly indicator series.
/// Loaders depend on this trait, so the FRED client can be swapped for an
/// in-memory provider in tests.
#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    /// Short identifier of the provider, used in cache keys (e.g. `"fred"`).
    fn source_name(&self) -> &str;

    /// Fetches one series at monthly frequency, starting at `start`.
    async fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
    ) -> Result<MonthlySeries, ApiError>;
}

/// A concrete implementation of the `IndicatorProvider` for the FRED API.
#[derive(Clone)]
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,

    api_key: String,
}

impl FredClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(settings: &FredSettings) -> Result<Self, ApiError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Self::REQUEST_TIMEOUT)
                .build()
                .map_err(ApiError::http)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl IndicatorProvider for FredClient {
    fn source_name(&self) -> &str {
        "fred"
    }

    async fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
    ) -> Result<MonthlySeries, ApiError> {
        let url = format!("{}/series/observations", self.base_url);
        let observation_start = start.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", observation_start.as_str()),
                ("frequency", "m"),
            ])
            .send()
            .await
            .map_err(ApiError::http)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::http)?;

        if status.is_success() {
            let parsed = serde_json::from_str::<ObservationsResponse>(&text)
                .map_err(|e| ApiError::Deserialization(e.to_string()))?;
            parsed.into_series()
        } else {
            let api_error: FredErrorResponse = serde_json::from_str(&text).map_err(|e| {
                ApiError::Deserialization(format!(
                    "Failed to deserialize error response: {}. Original text: {}",
                    e, text
                ))
            })?;
            Err(ApiError::Fred {
                code: api_error.error_code,
                message: api_error.error_message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn client_requires_an_api_key() {
        let settings = FredSettings::default();
        assert!(matches!(FredClient::new(&settings), Err(ApiError::MissingApiKey)));

        let settings = FredSettings {
            api_key: Some(String::new()),
            ..FredSettings::default()
        };
        assert!(matches!(FredClient::new(&settings), Err(ApiError::MissingApiKey)));
    }

    fn client_for(base_url: &str) -> FredClient {
        FredClient::new(&FredSettings {
            api_key: Some("SECRETKEY123".to_string()),
            base_url: base_url.to_string(),
            ..FredSettings::default()
        })
        .unwrap()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
    }

    /// Answers a single HTTP request with the given status line and body.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/fred")
    }

    #[tokio::test]
    async fn transport_errors_do_not_expose_the_api_key() {
        let client = client_for("http://127.0.0.1:1/fred");
        let err = client.fetch_series("DGS10", start()).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
        let text = err.to_string();
        assert!(!text.contains("SECRETKEY123"), "{text}");
        assert!(!format!("{err:?}").contains("SECRETKEY123"));
    }

    #[tokio::test]
    async fn parses_a_successful_response() {
        let base = serve_once(
            "200 OK",
            r#"{"observations":[{"date":"2023-01-01","value":"3.5"},{"date":"2023-02-01","value":"."}]}"#,
        )
        .await;
        let series = client_for(&base).fetch_series("DGS10", start()).await.unwrap();
        assert_eq!(series.values(), vec![3.5]);
    }

    #[tokio::test]
    async fn error_body_becomes_a_fred_error() {
        let base = serve_once(
            "400 Bad Request",
            r#"{"error_code":400,"error_message":"Bad Request. The series does not exist."}"#,
        )
        .await;
        let err = client_for(&base).fetch_series("NOPE", start()).await.unwrap_err();
        match err {
            ApiError::Fred { code, message } => {
                assert_eq!(code, 400);
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_a_deserialization_error() {
        let base = serve_once("502 Bad Gateway", "<html>upstream down</html>").await;
        let err = client_for(&base).fetch_series("DGS10", start()).await.unwrap_err();
        match err {
            ApiError::Deserialization(text) => assert!(text.contains("upstream down")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_is_normalized() {
        let settings = FredSettings {
            api_key: Some("key".to_string()),
            base_url: "https://example.test/fred/".to_string(),
            ..FredSettings::default()
        };
        let client = FredClient::new(&settings).unwrap();
        assert_eq!(client.base_url, "https://example.test/fred");
        assert_eq!(client.source_name(), "fred");
    }
}
