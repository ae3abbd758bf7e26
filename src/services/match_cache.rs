//! Bounded LRU caches for hydration and non-unique matches.
//!
//! Both caches hold only deterministic results, so a hit is always
//! interchangeable with a fresh computation. Lookups and stores are
//! separate critical sections: two concurrent misses on the same key both
//! compute and both store the same value.

use color_vptree::{hydrate, ColorProfile, Rgb};
use lru::LruCache;
use serde::Serialize;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::models::Match;

/// Default number of hydrated profiles kept
pub const DEFAULT_HYDRATION_CAPACITY: usize = 2048;

/// Default number of closest matches kept
pub const DEFAULT_MATCH_CAPACITY: usize = 8192;

/// Hit/miss counters and occupancy of one cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Stats of both engine caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineCacheStats {
    pub hydration: CacheStats,
    pub closest_match: CacheStats,
}

struct BoundedLru<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> BoundedLru<K, V> {
    fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        let found = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store `value`, returning true if an older entry was evicted.
    fn put(&self, key: K, value: V) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let replaced = entries.contains(&key);
        let evicted = entries.push(key, value).is_some();
        evicted && !replaced
    }

    fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Normalized hex → hydrated color profile
pub struct HydrationCache {
    inner: BoundedLru<String, ColorProfile>,
}

impl HydrationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: BoundedLru::new(capacity),
        }
    }

    /// Return the cached profile of `rgb`, hydrating and storing it on a miss.
    pub fn get_or_hydrate(&self, rgb: Rgb) -> ColorProfile {
        let key = rgb.to_hex();
        if let Some(profile) = self.inner.get(&key) {
            return profile;
        }

        let profile = hydrate(rgb);
        if self.inner.put(key, profile.clone()) {
            tracing::trace!("Hydration cache evicted an entry");
        }
        profile
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for HydrationCache {
    fn default() -> Self {
        Self::new(DEFAULT_HYDRATION_CAPACITY)
    }
}

/// Key of a closest-match lookup. Built once per query and moved into the
/// cache on a miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    list: String,
    hex: String,
}

impl MatchKey {
    pub fn new(list_id: &str, rgb: Rgb) -> Self {
        Self {
            list: list_id.to_string(),
            hex: rgb.to_hex(),
        }
    }

    /// Normalized `#rrggbb`
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

/// (list id, normalized hex) → closest entry
///
/// Only non-unique lookups go through this cache. A unique-mode result
/// depends on what earlier queries of its batch consumed, so it is never a
/// function of its key alone.
pub struct ClosestMatchCache {
    inner: BoundedLru<MatchKey, Match>,
}

impl ClosestMatchCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: BoundedLru::new(capacity),
        }
    }

    pub fn get(&self, key: &MatchKey) -> Option<Match> {
        self.inner.get(key)
    }

    pub fn put(&self, key: MatchKey, matched: Match) {
        if self.inner.put(key, matched) {
            tracing::trace!("Closest-match cache evicted an entry");
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for ClosestMatchCache {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColorListEntry;

    fn sample_match(hex: &str) -> Match {
        Match {
            requested_hex: hex.to_string(),
            entry: ColorListEntry {
                index: 0,
                hex: "#000000".to_string(),
                name: "Black".to_string(),
                rgb: Rgb::BLACK,
            },
            distance: 1.0,
        }
    }

    #[test]
    fn test_hydration_miss_then_hit() {
        let cache = HydrationCache::new(4);
        let rgb = Rgb::new(0x12, 0x34, 0x56);

        let first = cache.get_or_hydrate(rgb);
        let second = cache.get_or_hydrate(rgb);

        assert_eq!(first, second);
        assert_eq!(first, hydrate(rgb));
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.len, 1);
        assert_eq!(stats.capacity, 4);
    }

    #[test]
    fn test_hydration_evicts_least_recently_used() {
        let cache = HydrationCache::new(2);
        let a = Rgb::new(1, 0, 0);
        let b = Rgb::new(2, 0, 0);
        let c = Rgb::new(3, 0, 0);

        cache.get_or_hydrate(a);
        cache.get_or_hydrate(b);
        cache.get_or_hydrate(a); // a is now most recent
        cache.get_or_hydrate(c); // evicts b

        assert_eq!(cache.stats().len, 2);
        let before = cache.stats().misses;
        cache.get_or_hydrate(a);
        assert_eq!(cache.stats().misses, before);
        cache.get_or_hydrate(b);
        assert_eq!(cache.stats().misses, before + 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = HydrationCache::new(0);
        cache.get_or_hydrate(Rgb::WHITE);
        assert_eq!(cache.stats().capacity, 1);
        assert_eq!(cache.stats().len, 1);
    }

    fn key(list_id: &str, hex: &str) -> MatchKey {
        MatchKey::new(list_id, hex.parse().unwrap())
    }

    #[test]
    fn test_match_key_normalizes_hex() {
        let k = key("basic", "ABC");
        assert_ne!(k, key("grays", "ABC"));
        assert_eq!(k.hex(), "#aabbcc");
        assert_eq!(k, key("basic", "#aabbcc"));
    }

    #[test]
    fn test_closest_match_keyed_by_list() {
        let cache = ClosestMatchCache::new(8);
        cache.put(key("basic", "#111111"), sample_match("#111111"));

        assert_eq!(
            cache.get(&key("basic", "#111111")),
            Some(sample_match("#111111"))
        );
        assert_eq!(cache.get(&key("grays", "#111111")), None);
        assert_eq!(cache.get(&key("basic", "#222222")), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_put_same_key_is_not_an_eviction() {
        let cache = BoundedLru::<u8, u8>::new(1);
        assert!(!cache.put(1, 1));
        assert!(!cache.put(1, 2));
        assert_eq!(cache.get(&1), Some(2));
        assert!(cache.put(2, 3));
    }

    #[test]
    fn test_clear() {
        let cache = ClosestMatchCache::new(8);
        cache.put(key("basic", "#111111"), sample_match("#111111"));
        cache.clear();
        assert_eq!(cache.stats().len, 0);
        assert_eq!(cache.get(&key("basic", "#111111")), None);
    }
}
