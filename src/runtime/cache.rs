//! Memoizing stage cache
//!
//! Maps the exact input of a stage to the output it produced. Entries are
//! never evicted or invalidated. Each key owns a [`OnceCell`] slot, so when
//! several tasks look up the same missing key at once only the first one runs
//! the computation and the rest wait for its result.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::OnceCell;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLookup {
    pub value: String,
    /// True when the value came from an earlier computation
    pub hit: bool,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total lookups
    pub lookups: u64,
    /// Lookups answered without computing
    pub hits: u64,
    /// Lookups that ran the computation
    pub misses: u64,
    /// Keys currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// Key-to-output memo for one kind of stage
pub struct StageCache {
    label: &'static str,
    entries: DashMap<String, Arc<OnceCell<String>>>,
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StageCache {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: DashMap::new(),
            lookups: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Name of the external tool whose results are cached
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Return the cached output for `key`, or run `compute` and store it.
    ///
    /// `compute` runs at most once per key for the lifetime of the cache.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> CacheLookup
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = String>,
    {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        // The map guard must be released before awaiting the slot.
        let slot = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        if let Some(value) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return CacheLookup {
                value: value.clone(),
                hit: true,
            };
        }

        let mut computed = false;
        let value = slot
            .get_or_init(|| {
                computed = true;
                compute()
            })
            .await
            .clone();

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        CacheLookup {
            value,
            hit: !computed,
        }
    }

    /// Peek at a stored output without computing
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .and_then(|slot| slot.get().cloned())
    }

    /// Number of keys with a stored output
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl std::fmt::Debug for StageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageCache")
            .field("label", &self.label)
            .field("stats", &self.stats())
            .finish()
    }
}

/// The two shader-compile caches, one per compiler
#[derive(Debug, Clone)]
pub struct ShaderCaches {
    pub shader_conductor: Arc<StageCache>,
    pub directx: Arc<StageCache>,
}

impl ShaderCaches {
    pub fn new() -> Self {
        Self {
            shader_conductor: Arc::new(StageCache::new("ShaderConductor")),
            directx: Arc::new(StageCache::new("DirectXShaderCompiler")),
        }
    }
}

impl Default for ShaderCaches {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_lookup_is_a_hit() {
        let cache = StageCache::new("test");
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let first = cache
            .get_or_compute("shader", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "compiled_shader".to_string()
            })
            .await;
        let second = cache
            .get_or_compute("shader", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "something else".to_string()
            })
            .await;

        assert!(!first.hit);
        assert!(second.hit);
        assert_eq!(first.value, "compiled_shader");
        assert_eq!(second.value, "compiled_shader");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = StageCache::new("test");

        cache
            .get_or_compute("a", || async { "A".to_string() })
            .await;
        let b = cache
            .get_or_compute("b", || async { "B".to_string() })
            .await;

        assert!(!b.hit);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").as_deref(), Some("A"));
        assert_eq!(cache.get("missing"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups_compute_once() {
        let cache = Arc::new(StageCache::new("test"));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("hot", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        "compiled_hot".to_string()
                    })
                    .await
            }));
        }

        for handle in handles {
            let lookup = handle.await.unwrap();
            assert_eq!(lookup.value, "compiled_hot");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.lookups, 16);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 15);
    }

    #[test]
    fn test_stats_hit_rate() {
        let cache = StageCache::new("test");
        assert_eq!(cache.stats().hit_rate(), 0.0);

        tokio_test::block_on(cache.get_or_compute("k", || async { "v".to_string() }));
        tokio_test::block_on(cache.get_or_compute("k", || async { "v".to_string() }));

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shader_caches_are_separate() {
        let caches = ShaderCaches::new();
        tokio_test::block_on(
            caches
                .shader_conductor
                .get_or_compute("src", || async { "compiled_src".to_string() }),
        );

        assert_eq!(caches.shader_conductor.len(), 1);
        assert!(caches.directx.is_empty());
        assert_eq!(caches.directx.label(), "DirectXShaderCompiler");
    }
}
