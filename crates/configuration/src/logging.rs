use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Prefix of the daily-rolling log files.
pub const LOG_FILE_PREFIX: &str = "leadlag.log";

/// Builds the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}

/// A non-blocking writer for the rolling log file, if a log directory is configured.
///
/// The returned guard must be held for as long as logs should be flushed.
pub fn file_writer(settings: &LoggingSettings) -> Option<(NonBlocking, WorkerGuard)> {
    let directory = settings.directory.as_ref()?;
    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}
