//! TTL response cache for NetBox reads.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use super::api::Endpoint;

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheEntry {
    inserted: Instant,
    value: Value,
}

/// Bounded TTL cache keyed by endpoint and query.
///
/// Keys always start with the endpoint path, which is what
/// [`ResponseCache::invalidate`] matches on after a write.
pub struct ResponseCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    /// Create a cache with the given time-to-live and capacity.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Build the cache key for a request.
    pub fn key(endpoint: Endpoint, query: &str) -> String {
        format!("{}?{}", endpoint.path(), query)
    }

    /// Look up a live entry.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        let hit = match entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        };
        drop(entries);

        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit: {}", key);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    /// Store a value, evicting expired entries and then the oldest entry if
    /// the cache is full.
    pub fn insert(&self, key: String, value: Value) {
        let mut entries = self.lock();
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let ttl = self.ttl;
            entries.retain(|_, e| e.inserted.elapsed() < ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            CacheEntry {
                inserted: Instant::now(),
                value,
            },
        );
    }

    /// Drop every entry belonging to `endpoint`. Returns how many were removed.
    pub fn invalidate(&self, endpoint: Endpoint) -> usize {
        let prefix = format!("{}?", endpoint.path());
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&prefix));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Invalidated {} cached {} entries", removed, endpoint.label());
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_and_miss_counters() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let key = ResponseCache::key(Endpoint::Sites, "slug=dc1");
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), json!([{"id": 1}]));
        assert_eq!(cache.get(&key), Some(json!([{"id": 1}])));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_entries_expire() {
        let cache = ResponseCache::new(Duration::from_millis(0), 10);
        let key = ResponseCache::key(Endpoint::Sites, "");
        cache.insert(key.clone(), json!(1));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("dcim/sites?a".into(), json!(1));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("dcim/sites?b".into(), json!(2));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("dcim/sites?c".into(), json!(3));

        assert!(cache.get("dcim/sites?a").is_none());
        assert!(cache.get("dcim/sites?b").is_some());
        assert!(cache.get("dcim/sites?c").is_some());
    }

    #[test]
    fn test_invalidate_only_touches_endpoint() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        cache.insert(ResponseCache::key(Endpoint::Sites, "slug=a"), json!(1));
        cache.insert(ResponseCache::key(Endpoint::Sites, "id=2"), json!(2));
        cache.insert(ResponseCache::key(Endpoint::Devices, "name=x"), json!(3));

        assert_eq!(cache.invalidate(Endpoint::Sites), 2);
        assert_eq!(cache.stats().entries, 1);
        assert!(
            cache
                .get(&ResponseCache::key(Endpoint::Devices, "name=x"))
                .is_some()
        );
    }
}
