//! In-memory cache with LRU eviction and absolute TTLs.
//!
//! Pattern deletion walks the whole store, matching the documented
//! best-effort semantics of wildcard invalidation: a read racing the walk
//! may repopulate a stale value, which then lives at most one TTL.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use gather_core::cache::{pattern_matches, Cache, Result};

/// A cached value with its absolute expiry instant.
#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    /// Fixed at write time; reads never extend it.
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(bytes: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            bytes,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

/// Thread-safe in-memory [`Cache`] with LRU eviction.
///
/// Expired values are dropped the moment a read finds them, so an expired
/// entry is indistinguishable from a miss.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<Mutex<LruCache<String, StoredValue>>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` values.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.lock().await;
        match store.get(key) {
            Some(value) if !value.is_expired() => return Ok(Some(value.bytes.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        // Expired entry: drop it so it reads as a miss from here on.
        store.pop(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.lock().await;
        store.put(key.to_string(), StoredValue::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.lock().await;
        store.pop(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut store = self.store.lock().await;
        let matching: Vec<String> = store
            .iter()
            .filter(|(key, _)| pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in matching {
            store.pop(&key);
        }
        Ok(())
    }
}
