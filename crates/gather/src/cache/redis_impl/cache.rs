//! Redis cache backend.
//!
//! Wildcard invalidation walks the keyspace with `SCAN`/`MATCH` instead of
//! tracking key sets. The scan is best-effort: a read racing it can
//! repopulate a stale page, which then expires with its TTL. Redis glob
//! syntax is a superset of the `*`-only patterns this engine emits, so the
//! patterns pass through verbatim.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use gather_core::cache::{Cache, Result};

use super::map_redis_error;

/// Redis cache backend using a connection manager for pooling.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be
    /// established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;

            if !keys.is_empty() {
                conn.del::<_, ()>(&keys).await.map_err(map_redis_error)?;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url()).await.ok()
    }

    #[tokio::test]
    async fn test_set_get_delete_roundtrip() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("gather:test:{}", Uuid::new_v4());
        cache.set(&key, b"value", None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"value".to_vec()));

        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_with_ttl_expires() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = format!("gather:test:{}", Uuid::new_v4());
        cache
            .set(&key, b"v", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_pattern_via_scan() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let prefix = format!("gather:test:{}", Uuid::new_v4());
        let kept = format!("{prefix}:other");
        cache
            .set(&format!("{prefix}:page:1"), b"1", None)
            .await
            .unwrap();
        cache
            .set(&format!("{prefix}:page:2"), b"2", None)
            .await
            .unwrap();
        cache.set(&kept, b"3", None).await.unwrap();

        cache
            .delete_pattern(&format!("{prefix}:page:*"))
            .await
            .unwrap();

        assert!(cache
            .get(&format!("{prefix}:page:1"))
            .await
            .unwrap()
            .is_none());
        assert!(cache
            .get(&format!("{prefix}:page:2"))
            .await
            .unwrap()
            .is_none());
        assert!(cache.get(&kept).await.unwrap().is_some());

        cache.delete(&kept).await.unwrap();
    }
}
