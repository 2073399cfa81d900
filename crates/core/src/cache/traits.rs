use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for the read-through / write-invalidate cache.
///
/// The cache is a side channel with no authority: on any doubt the store
/// wins, and a failed or timed-out write is indistinguishable from a miss
/// on the next read.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value by exact key. The TTL is absolute from write time;
    /// reading does not refresh it.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Unconditionally overwrites a value, with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes one exact key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Deletes every key matching a glob pattern (e.g. `events:featured:*`).
    ///
    /// Best-effort and scan-based: a read racing the scan may repopulate a
    /// just-deleted key with a stale value. That window is bounded by the
    /// value's TTL, which is why list pages are always written with one.
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}
