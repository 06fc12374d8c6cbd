use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub fred: FredSettings,
    pub logging: LoggingSettings,
}

/// Parameters of a correlation and lag analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Trailing window, in months, ending at the latest date both inputs share.
    pub lookback_months: u32,
    /// Half-width `L` of the lag window `-L..=L`.
    pub lag_window: u32,
    /// How many simultaneous correlations to rank.
    pub top_correlations: usize,
    /// How many `(indicator, lag)` pairs to rank.
    pub top_lagged_correlations: usize,
    /// Column name of the sales series in the joint frame and matrix.
    pub target_name: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            lag_window: 6,
            top_correlations: 5,
            top_lagged_correlations: 3,
            target_name: "Sales".to_string(),
        }
    }
}

/// A display name mapped to the FRED series that backs it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndicatorSpec {
    pub name: String,
    pub series_id: String,
}

impl IndicatorSpec {
    pub fn new(name: &str, series_id: &str) -> Self {
        Self {
            name: name.to_string(),
            series_id: series_id.to_string(),
        }
    }
}

/// Contains the settings for retrieving indicators from FRED.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FredSettings {
    /// Falls back to the `FRED_API_KEY` environment variable when absent.
    pub api_key: Option<String>,
    pub base_url: String,
    /// First month requested from the API.
    pub observation_start: NaiveDate,
    /// How long a fetched series is served from the cache.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    pub indicators: Vec<IndicatorSpec>,
    /// Indicators that also get a derived `"{name}_pct"` month-over-month series.
    pub pct_change: Vec<String>,
}

impl Default for FredSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.stlouisfed.org/fred".to_string(),
            observation_start: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
            cache_ttl: Duration::from_secs(3600),
            indicators: default_indicators(),
            pct_change: ["USD/KRW", "WTI", "CPI", "PPI"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// The built-in indicator catalog.
pub fn default_indicators() -> Vec<IndicatorSpec> {
    vec![
        IndicatorSpec::new("USD/KRW", "DEXKOUS"),
        IndicatorSpec::new("WTI", "DCOILWTICO"),
        IndicatorSpec::new("US10Y", "DGS10"),
        IndicatorSpec::new("CPI", "CPIAUCSL"),
        IndicatorSpec::new("DSPI", "DSPI"),
        IndicatorSpec::new("PPI", "PPIACO"),
        IndicatorSpec::new("UNRATE", "UNRATE"),
        IndicatorSpec::new("TOTALSA", "TOTALSA"),
        IndicatorSpec::new("IPG3361T3S", "IPG3361T3S"),
        // STLFSI2 stands in for the Baltic Dry Index, which FRED does not carry.
        IndicatorSpec::new("BDIY", "STLFSI2"),
    ]
}

/// Contains the log output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// How the CLI renders an analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
