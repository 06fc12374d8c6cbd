use crate::cache::{CacheKey, SeriesCache};
use crate::error::ApiError;
use crate::IndicatorProvider;
use chrono::NaiveDate;
use configuration::{FredSettings, IndicatorSpec};
use core_types::{IndicatorSet, MonthlySeries};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Suffix of the derived month-over-month percentage-change series.
pub const PCT_CHANGE_SUFFIX: &str = "_pct";

/// Loads a catalog of indicators through a provider and an injected cache.
pub struct IndicatorLoader {
    provider: Arc<dyn IndicatorProvider>,
    cache: Arc<SeriesCache>,
    catalog: Vec<IndicatorSpec>,
    observation_start: NaiveDate,
    pct_change: Vec<String>,
}

impl IndicatorLoader {
    pub fn new(
        provider: Arc<dyn IndicatorProvider>,
        cache: Arc<SeriesCache>,
        settings: &FredSettings,
    ) -> Self {
        Self {
            provider,
            cache,
            catalog: settings.indicators.clone(),
            observation_start: settings.observation_start,
            pct_change: settings.pct_change.clone(),
        }
    }

    /// Restricts the catalog to the named indicators, keeping catalog order.
    pub fn only(mut self, names: &[String]) -> Self {
        self.catalog.retain(|spec| names.contains(&spec.name));
        self
    }

    pub fn catalog(&self) -> &[IndicatorSpec] {
        &self.catalog
    }

    /// Fetches every catalog entry concurrently.
    ///
    /// A series that fails to load or comes back empty is skipped with a warning.
    /// Loaded series are forward-filled onto a contiguous monthly grid that ends at
    /// the latest month of any loaded series and, where
    /// configured, complemented by a `"{name}_pct"` change series.
    ///
    /// # Errors
    ///
    /// `ApiError::NoData` if not a single series could be loaded.
    pub async fn load(&self) -> Result<IndicatorSet, ApiError> {
        let fetches = self.catalog.iter().map(|spec| self.load_one(spec));
        let results = join_all(fetches).await;

        let mut loaded = Vec::new();
        for (spec, result) in self.catalog.iter().zip(results) {
            match result {
                Ok(series) if series.is_empty() => {
                    warn!(indicator = %spec.name, series_id = %spec.series_id, "Series is empty, skipping");
                }
                Ok(series) => loaded.push((spec.name.clone(), series)),
                Err(e) => {
                    warn!(indicator = %spec.name, series_id = %spec.series_id, "Could not load series: {}", e);
                }
            }
        }

        // Every series is padded to the latest month seen in any of them.
        let Some(latest) = loaded.iter().filter_map(|(_, s)| s.last_date()).max() else {
            return Err(ApiError::NoData);
        };
        let mut indicators: IndicatorSet = loaded
            .into_iter()
            .map(|(name, series)| (name, series.forward_fill_to(latest)))
            .collect();

        for name in &self.pct_change {
            if let Some(series) = indicators.get(name) {
                let derived = series.pct_change();
                if !derived.is_empty() {
                    indicators.insert(format!("{name}{PCT_CHANGE_SUFFIX}"), derived);
                }
            }
        }

        info!(count = indicators.len(), "Indicators loaded");
        Ok(indicators)
    }

    /// Fetches one series, serving it from the cache while the entry is fresh.
    #[tracing::instrument(skip(self), fields(indicator = %spec.name))]
    pub async fn load_one(&self, spec: &IndicatorSpec) -> Result<MonthlySeries, ApiError> {
        let key = CacheKey::new(
            format!("{}:{}", self.provider.source_name(), spec.series_id),
            self.observation_start,
            None,
        );
        if let Some(series) = self.cache.get(&key) {
            tracing::debug!("Cache hit");
            return Ok(series);
        }

        let series = self
            .provider
            .fetch_series(&spec.series_id, self.observation_start)
            .await?;
        self.cache.insert(key, series.clone());
        Ok(series)
    }
}
