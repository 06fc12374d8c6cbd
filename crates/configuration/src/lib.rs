use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisSettings, Config, FredSettings, IndicatorSpec, LoggingSettings, OutputFormat,
    default_indicators,
};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Upper bound on the lag half-width; beyond ten years every lag is empty anyway.
const MAX_LAG_WINDOW: u32 = 120;

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at `path`
/// (optional unless a path was given explicitly), then `LEADLAG__SECTION__KEY`
/// environment variables. A missing `fred.api_key` falls back to `FRED_API_KEY`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (file, required) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };

    let builder = config::Config::builder()
        .add_source(config::File::from(file).required(required))
        .add_source(
            config::Environment::with_prefix("LEADLAG")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let mut config = builder.try_deserialize::<Config>()?;

    if config.fred.api_key.is_none() {
        config.fred.api_key = std::env::var("FRED_API_KEY").ok().filter(|k| !k.is_empty());
    }

    validate(&config)?;
    Ok(config)
}

/// Rejects settings the analysis cannot run with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let analysis = &config.analysis;
    if analysis.lookback_months == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.lookback_months must be positive".to_string(),
        ));
    }
    if analysis.top_correlations == 0 || analysis.top_lagged_correlations == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.top_correlations and analysis.top_lagged_correlations must be positive"
                .to_string(),
        ));
    }
    if analysis.lag_window >= MAX_LAG_WINDOW {
        return Err(ConfigError::ValidationError(format!(
            "analysis.lag_window must be below {MAX_LAG_WINDOW}, got {}",
            analysis.lag_window
        )));
    }
    if analysis.target_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "analysis.target_name must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for spec in &config.fred.indicators {
        if !seen.insert(spec.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "fred.indicators lists '{}' more than once",
                spec.name
            )));
        }
        if spec.name == analysis.target_name {
            return Err(ConfigError::ValidationError(format!(
                "indicator '{}' collides with analysis.target_name",
                spec.name
            )));
        }
    }
    Ok(())
}
