use chrono::NaiveDate;
use core_types::MonthlySeries;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Identifies one fetched series: where it came from and which range was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Provider and series, e.g. `"fred:DEXKOUS"`.
    pub source: String,
    pub start: NaiveDate,
    /// `None` means "up to the latest available observation".
    pub end: Option<NaiveDate>,
}

impl CacheKey {
    pub fn new(source: impl Into<String>, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            source: source.into(),
            start,
            end,
        }
    }
}

struct CacheEntry {
    series: MonthlySeries,
    stored_at: Instant,
}

/// An in-memory, time-limited store of fetched series.
///
/// The cache is owned by the caller and handed to whatever loads indicators, so two
/// loaders can share it or a test can start from an empty one.
pub struct SeriesCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh entry. Expired entries are evicted on access.
    pub fn get(&self, key: &CacheKey) -> Option<MonthlySeries> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.series.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: CacheKey, series: MonthlySeries) {
        self.lock().insert(
            key,
            CacheEntry {
                series,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        // A panic while holding the lock cannot leave a half-written entry behind.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(source: &str) -> CacheKey {
        CacheKey::new(source, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(), None)
    }

    fn series() -> MonthlySeries {
        [(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(), 1.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn returns_fresh_entries() {
        let cache = SeriesCache::new(Duration::from_secs(3600));
        assert!(cache.get(&key("fred:WTI")).is_none());
        cache.insert(key("fred:WTI"), series());
        assert_eq!(cache.get(&key("fred:WTI")), Some(series()));
        assert!(cache.get(&key("fred:CPI")).is_none());
    }

    #[test]
    fn key_includes_the_requested_range() {
        let cache = SeriesCache::new(Duration::from_secs(3600));
        cache.insert(key("fred:WTI"), series());
        let later = CacheKey::new("fred:WTI", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), None);
        assert!(cache.get(&later).is_none());
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = SeriesCache::new(Duration::ZERO);
        cache.insert(key("fred:WTI"), series());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("fred:WTI")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        cache.insert(key("a"), series());
        cache.insert(key("b"), series());
        cache.invalidate(&key("a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
