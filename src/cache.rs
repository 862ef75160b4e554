//! Resolution caching for dynamic routes.
//!
//! Static routes resolve through a hash map and never touch the cache.
//! Dynamic routes are matched by walking the pattern list in declaration
//! order, which [`ResolveCache`] short-circuits: it remembers, per
//! normalized path, which dynamic route won and which parameters it
//! captured (or that nothing matched).
//!
//! The route table is immutable once built, so entries never go stale; the
//! cache is bounded by LRU eviction through the [`lru`] crate. It is gated
//! behind the `cache` feature.
//!
//! ```
//! use spa_navigator::cache::ResolveCache;
//! use spa_navigator::RouteParams;
//!
//! let mut cache = ResolveCache::new(16).unwrap();
//! assert!(cache.get("/event/42").is_none());
//!
//! cache.insert("/event/42", Some((1, RouteParams::from_pairs([("id", "42")]))));
//! let (index, params) = cache.get("/event/42").unwrap().unwrap();
//! assert_eq!(index, 1);
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::params::RouteParams;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// What the cache remembers for a path: the index of the winning route in
/// the table plus its parameters, or `None` when no dynamic route matched.
pub type CachedResolution = Option<(usize, RouteParams)>;

/// Counters tracking cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Entries pushed out by LRU eviction.
    pub evictions: usize,
}

impl CacheStats {
    /// Hit rate as a value in `0.0..=1.0`; `0.0` before any lookup.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of dynamic-route resolutions keyed by normalized path.
#[derive(Debug)]
pub struct ResolveCache {
    entries: LruCache<String, CachedResolution>,
    stats: CacheStats,
}

impl ResolveCache {
    /// Create a cache holding up to `capacity` paths. Returns `None` for a
    /// zero capacity.
    pub fn new(capacity: usize) -> Option<Self> {
        let capacity = NonZeroUsize::new(capacity)?;
        Some(Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        })
    }

    /// Look up a path. `None` is a cache miss; `Some(None)` is a cached
    /// "no dynamic route matches".
    pub fn get(&mut self, path: &str) -> Option<CachedResolution> {
        if let Some(entry) = self.entries.get(path) {
            self.stats.hits += 1;
            trace_log!("Resolve cache hit for '{}'", path);
            Some(entry.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Resolve cache miss for '{}'", path);
            None
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, resolution: CachedResolution) {
        let path = path.into();
        if let Some((evicted, _)) = self.entries.push(path.clone(), resolution) {
            if evicted != path {
                self.stats.evictions += 1;
                trace_log!("Resolve cache evicted '{}'", evicted);
            }
        }
    }

    /// Change the capacity, evicting least recently used entries if needed.
    pub fn resize(&mut self, capacity: NonZeroUsize) {
        let before = self.entries.len();
        self.entries.resize(capacity);
        let dropped = before - self.entries.len();
        self.stats.evictions += dropped;
        debug_log!(
            "Resolve cache resized to {} ({} entries dropped)",
            capacity,
            dropped
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
