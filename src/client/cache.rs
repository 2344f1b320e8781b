use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::domain::{Article, NewsCategory};

pub const DEFAULT_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub category: NewsCategory,
    pub region: String,
    pub page: u32,
}

impl CacheKey {
    pub fn new(category: NewsCategory, region: &str, page: u32) -> Self {
        Self {
            category,
            region: region.to_string(),
            page,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.category, self.region, self.page)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    articles: Vec<Article>,
    fetched_at: DateTime<Utc>,
}

/// Headline pages keyed by (category, region, page), valid for a fixed TTL.
///
/// Expiry is checked when an entry is read; stale entries stay in the map
/// until they are overwritten or the cache is cleared.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached articles for `key` if they were stored strictly less than one
    /// TTL ago.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Article>> {
        let now = self.clock.now();
        let entries = self.entries();
        let entry = entries.get(key)?;
        if now - entry.fetched_at < self.ttl {
            Some(entry.articles.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: CacheKey, articles: Vec<Article>) {
        let entry = CacheEntry {
            articles,
            fetched_at: self.clock.now(),
        };
        self.entries().insert(key, entry);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn setup() -> (Arc<ManualClock>, ResponseCache) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        ));
        let cache = ResponseCache::new(Duration::seconds(DEFAULT_TTL_SECS), clock.clone());
        (clock, cache)
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article::new(format!("https://example.com/{}", i), format!("Story {}", i)))
            .collect()
    }

    #[test]
    fn test_key_display() {
        let key = CacheKey::new(NewsCategory::Business, "gb", 3);
        assert_eq!(key.to_string(), "business_gb_3");
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let (_, cache) = setup();
        assert!(cache.get(&CacheKey::new(NewsCategory::General, "us", 1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entry_valid_until_ttl() {
        let (clock, cache) = setup();
        let key = CacheKey::new(NewsCategory::General, "us", 1);
        cache.insert(key.clone(), articles(3));

        clock.advance(Duration::seconds(299));
        assert_eq!(cache.get(&key).map(|a| a.len()), Some(3));

        clock.advance(Duration::seconds(1));
        assert!(cache.get(&key).is_none(), "entry must expire at exactly one TTL");

        // lazily expired, not swept
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let (_, cache) = setup();
        cache.insert(CacheKey::new(NewsCategory::General, "us", 1), articles(2));

        assert!(cache.get(&CacheKey::new(NewsCategory::General, "us", 2)).is_none());
        assert!(cache.get(&CacheKey::new(NewsCategory::General, "gb", 1)).is_none());
        assert!(cache.get(&CacheKey::new(NewsCategory::Sports, "us", 1)).is_none());
    }

    #[test]
    fn test_reinsert_restarts_ttl() {
        let (clock, cache) = setup();
        let key = CacheKey::new(NewsCategory::General, "us", 1);
        cache.insert(key.clone(), articles(1));
        clock.advance(Duration::seconds(400));
        cache.insert(key.clone(), articles(4));
        clock.advance(Duration::seconds(100));
        assert_eq!(cache.get(&key).map(|a| a.len()), Some(4));
    }

    #[test]
    fn test_clear() {
        let (_, cache) = setup();
        cache.insert(CacheKey::new(NewsCategory::General, "us", 1), articles(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
