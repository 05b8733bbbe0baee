//! Time-boxed cache of formatted metric strings.
//!
//! Entries are never purged on expiry; an expired entry is ignored by `get`
//! and overwritten by the next `set`. Keys are bounded by the registry's
//! metric ids, so the map cannot grow past the registry size.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use claimset_core::clock::Clock;

/// Cache key for the friendly string of `metric_id`.
pub fn formatted_key(metric_id: &str) -> String {
    format!("formatted_{metric_id}")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    stored_at_ms: i64,
}

pub struct FormattedCache {
    entries: DashMap<String, CacheEntry>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl FormattedCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Cached value while `now - stored_at < ttl`.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_millis();
        let entry = self.entries.get(key)?;
        if now.saturating_sub(entry.stored_at_ms) < self.ttl_ms {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Unconditional overwrite.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let stored_at_ms = self.clock.now_millis();
        self.entries.insert(
            key.into(),
            CacheEntry {
                value: value.into(),
                stored_at_ms,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use claimset_core::clock::ManualClock;

    fn cache() -> (FormattedCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        (FormattedCache::new(Duration::from_secs(60), clock.clone()), clock)
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let (cache, clock) = cache();
        cache.set(formatted_key("collectionLift"), "35%");
        assert_eq!(cache.get("formatted_collectionLift").as_deref(), Some("35%"));

        clock.advance(chrono::Duration::milliseconds(59_999));
        assert_eq!(cache.get("formatted_collectionLift").as_deref(), Some("35%"));

        clock.advance(chrono::Duration::milliseconds(1));
        assert_eq!(cache.get("formatted_collectionLift"), None);
        // Expired entries stay in place until overwritten.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn set_overwrites_and_refreshes_timestamp() {
        let (cache, clock) = cache();
        cache.set("k", "old");
        clock.advance(chrono::Duration::seconds(61));
        cache.set("k", "new");
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn clear_empties_everything() {
        let (cache, _clock) = cache();
        cache.set("a", "1");
        cache.set("b", "2");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
