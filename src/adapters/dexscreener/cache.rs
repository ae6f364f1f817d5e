//! Response Cache
//!
//! TTL cache for upstream market data responses, keyed by request path.
//! Feeds are refreshed at most once per TTL window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cache entry with TTL tracking
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_valid(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
    /// Maximum entries before cleanup
    max_entries: usize,
}

impl<V: Clone> ResponseCache<V> {
    /// Default TTL (60 seconds)
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_ENTRIES: usize = 1000;

    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// A zero TTL disables caching
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn insert(&mut self, key: String, value: V) {
        if !self.is_enabled() {
            return;
        }

        if self.entries.len() >= self.max_entries {
            self.cleanup();
        }

        // Still at capacity after cleanup? Remove oldest entry
        if self.entries.len() >= self.max_entries {
            self.remove_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Get a clone of the cached value if still fresh
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_valid(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Remove expired entries
    pub fn cleanup(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.is_valid(ttl));
    }

    fn remove_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }

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

    #[test]
    fn test_insert_and_get() {
        let mut cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("/token-boosts/top/v1".to_string(), vec![1, 2, 3]);

        assert_eq!(cache.get("/token-boosts/top/v1"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("/other"), None);
    }

    #[test]
    fn test_expiry() {
        let mut cache = ResponseCache::new(Duration::from_millis(10));
        cache.insert("key".to_string(), 1u8);
        assert!(cache.get("key").is_some());

        std::thread::sleep(Duration::from_millis(20));

        assert!(cache.get("key").is_none());
        cache.cleanup();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let mut cache = ResponseCache::new(Duration::ZERO);
        cache.insert("key".to_string(), 1u8);
        assert!(!cache.is_enabled());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_max_entries() {
        let mut cache = ResponseCache::with_capacity(Duration::from_secs(60), 3);
        for i in 0..5 {
            cache.insert(format!("key-{}", i), i);
        }
        assert!(cache.len() <= 3);
        assert_eq!(cache.get("key-4"), Some(4));
    }
}
