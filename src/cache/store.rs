//! Cache storage: LRU-bounded listings with per-entry expiry.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use tracing::debug;

use crate::application::seo::PageListing;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub site_id: String,
    pub fingerprint: u64,
}

struct CacheEntry {
    payload: PageListing,
    expires_at: Instant,
}

/// Site- and query-scoped cache of composed listings.
pub struct ListingCache {
    entries: RwLock<LruCache<ListingKey, CacheEntry>>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
            ttl: config.ttl(),
        }
    }

    /// Fetch a non-expired entry. Expired entries are dropped on access.
    pub fn get(&self, site_id: &str, fingerprint: u64) -> Option<PageListing> {
        let key = ListingKey {
            site_id: site_id.to_string(),
            fingerprint,
        };
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                counter!("seodeck_cache_hit_total").increment(1);
                Some(entry.payload.clone())
            }
            Some(_) => {
                entries.pop(&key);
                counter!("seodeck_cache_miss_total").increment(1);
                None
            }
            None => {
                counter!("seodeck_cache_miss_total").increment(1);
                None
            }
        }
    }

    pub fn put(&self, site_id: &str, fingerprint: u64, payload: PageListing) {
        let key = ListingKey {
            site_id: site_id.to_string(),
            fingerprint,
        };
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        rw_write(&self.entries, SOURCE, "put").put(key, entry);
    }

    /// Drop every entry for a site. Runs synchronously; callers must not
    /// return from a write until this has completed.
    pub fn invalidate_site(&self, site_id: &str) -> usize {
        let mut entries = rw_write(&self.entries, SOURCE, "invalidate_site");
        let keys: Vec<ListingKey> = entries
            .iter()
            .filter(|(key, _)| key.site_id == site_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            entries.pop(key);
        }
        if !keys.is_empty() {
            counter!("seodeck_cache_invalidate_total").increment(keys.len() as u64);
            debug!(site_id, dropped = keys.len(), "cache invalidated for site");
        }
        keys.len()
    }

    /// Administrative escape hatch.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::application::seo::ListingSummary;

    fn sample_listing(total: u64) -> PageListing {
        PageListing {
            items: Vec::new(),
            total,
            page: 1,
            limit: 20,
            summary: ListingSummary {
                total_pages: total,
                custom: 0,
                default: total,
            },
        }
    }

    fn config_with_ttl(ttl_seconds: u64) -> CacheConfig {
        CacheConfig {
            ttl_seconds,
            ..CacheConfig::default()
        }
    }

    #[test]
    fn roundtrip_and_site_invalidation() {
        let cache = ListingCache::new(&CacheConfig::default());

        cache.put("main", 1, sample_listing(3));
        cache.put("main", 2, sample_listing(4));
        cache.put("docs", 1, sample_listing(5));

        assert!(cache.get("main", 1).is_some());
        assert!(cache.get("main", 3).is_none());

        let dropped = cache.invalidate_site("main");
        assert_eq!(dropped, 2);
        assert!(cache.get("main", 1).is_none());
        assert!(cache.get("main", 2).is_none());
        // Other sites keep their entries.
        assert!(cache.get("docs", 1).is_some());
    }

    #[test]
    fn zero_ttl_entries_are_already_expired() {
        let cache = ListingCache::new(&config_with_ttl(0));
        cache.put("main", 1, sample_listing(1));
        assert!(cache.get("main", 1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn lru_eviction_respects_capacity() {
        let config = CacheConfig {
            capacity: 2,
            ..CacheConfig::default()
        };
        let cache = ListingCache::new(&config);

        cache.put("main", 1, sample_listing(1));
        cache.put("main", 2, sample_listing(2));
        cache.put("main", 3, sample_listing(3));

        assert!(cache.get("main", 1).is_none());
        assert!(cache.get("main", 2).is_some());
        assert!(cache.get("main", 3).is_some());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = ListingCache::new(&CacheConfig::default());
        cache.put("main", 1, sample_listing(1));
        cache.put("docs", 1, sample_listing(1));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let cache = ListingCache::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.entries.write().expect("lock");
            panic!("poison the entries lock");
        }));

        cache.put("main", 1, sample_listing(1));
        assert!(cache.get("main", 1).is_some());
    }
}
