//! Cached calendar repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use gather_core::cache::{calendar_key, deserialize_calendar, serialize_calendar, Cache};
use gather_core::calendar::Calendar;
use gather_core::storage::{CalendarRepository, Result};

/// Read-through decorator for [`CalendarRepository`].
///
/// `calendar:{id}` holds the serialized snapshot; updates and deletes
/// remove it before returning, which is what guarantees that a read issued
/// after a mutation's response observes the post-mutation owner and
/// membership.
pub struct CachedCalendarRepository<R, C>
where
    R: CalendarRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R, C> CachedCalendarRepository<R, C>
where
    R: CalendarRepository,
    C: Cache,
{
    /// Creates a new cached calendar repository.
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }
}

#[async_trait]
impl<R, C> CalendarRepository for CachedCalendarRepository<R, C>
where
    R: CalendarRepository + 'static,
    C: Cache + 'static,
{
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
        let cache_key = calendar_key(id);

        if let Ok(Some(bytes)) = self.cache.get(&cache_key).await {
            match deserialize_calendar(&bytes) {
                Ok(calendar) => {
                    tracing::trace!(calendar_id = %id, "Cache hit for calendar");
                    return Ok(Some(calendar));
                }
                Err(err) => {
                    tracing::warn!(calendar_id = %id, error = %err, "Cached calendar undecodable");
                }
            }
        }

        tracing::trace!(calendar_id = %id, "Cache miss for calendar");
        let calendar = self.repository.get_calendar(id).await?;

        if let Some(ref found) = calendar {
            if let Ok(bytes) = serialize_calendar(found) {
                if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                    tracing::warn!(calendar_id = %id, error = %err, "Failed to cache calendar");
                }
            }
        }

        Ok(calendar)
    }

    async fn create_calendar(&self, calendar: &Calendar) -> Result<()> {
        self.repository.create_calendar(calendar).await?;

        let cache_key = calendar_key(calendar.id);
        if let Ok(bytes) = serialize_calendar(calendar) {
            if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                tracing::warn!(calendar_id = %calendar.id, error = %err, "Failed to cache new calendar");
            }
        }

        tracing::debug!(calendar_id = %calendar.id, "Calendar created");
        Ok(())
    }

    async fn update_calendar(&self, calendar: &Calendar) -> Result<()> {
        self.repository.update_calendar(calendar).await?;

        if let Err(err) = self.cache.delete(&calendar_key(calendar.id)).await {
            tracing::warn!(calendar_id = %calendar.id, error = %err, "Failed to invalidate calendar cache");
        }

        tracing::debug!(calendar_id = %calendar.id, "Calendar updated");
        Ok(())
    }

    async fn delete_calendar(&self, id: Uuid) -> Result<()> {
        self.repository.delete_calendar(id).await?;

        if let Err(err) = self.cache.delete(&calendar_key(id)).await {
            tracing::warn!(calendar_id = %id, error = %err, "Failed to invalidate calendar cache");
        }

        tracing::debug!(calendar_id = %id, "Calendar deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    use gather_core::cache::Result as CacheResult;
    use gather_core::calendar::CalendarOwner;

    struct MockCalendarRepository {
        calendars: RwLock<HashMap<Uuid, Calendar>>,
        get_calls: AtomicUsize,
    }

    impl MockCalendarRepository {
        fn new() -> Self {
            Self {
                calendars: RwLock::new(HashMap::new()),
                get_calls: AtomicUsize::new(0),
            }
        }

        async fn insert(&self, calendar: Calendar) {
            self.calendars
                .write()
                .await
                .insert(calendar.id, calendar);
        }
    }

    #[async_trait]
    impl CalendarRepository for MockCalendarRepository {
        async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.calendars.read().await.get(&id).cloned())
        }

        async fn create_calendar(&self, calendar: &Calendar) -> Result<()> {
            self.calendars
                .write()
                .await
                .insert(calendar.id, calendar.clone());
            Ok(())
        }

        async fn update_calendar(&self, calendar: &Calendar) -> Result<()> {
            self.calendars
                .write()
                .await
                .insert(calendar.id, calendar.clone());
            Ok(())
        }

        async fn delete_calendar(&self, id: Uuid) -> Result<()> {
            self.calendars.write().await.remove(&id);
            Ok(())
        }
    }

    struct MockCache {
        store: RwLock<HashMap<String, Vec<u8>>>,
    }

    impl MockCache {
        fn new() -> Self {
            Self {
                store: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
            Ok(self.store.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> CacheResult<()> {
            self.store.write().await.remove(key);
            Ok(())
        }

        async fn delete_pattern(&self, _pattern: &str) -> CacheResult<()> {
            Ok(())
        }
    }

    fn test_calendar() -> Calendar {
        Calendar::new(CalendarOwner::User(Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let calendar = test_calendar();
        let repo = Arc::new(MockCalendarRepository::new());
        repo.insert(calendar.clone()).await;
        let cache = Arc::new(MockCache::new());
        let cached =
            CachedCalendarRepository::new(repo.clone(), cache.clone(), Duration::from_secs(300));

        let _ = cached.get_calendar(calendar.id).await.unwrap();
        let again = cached.get_calendar(calendar.id).await.unwrap();

        assert_eq!(again.map(|c| c.id), Some(calendar.id));
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 1);
        assert!(cache
            .store
            .read()
            .await
            .contains_key(&calendar_key(calendar.id)));
    }

    #[tokio::test]
    async fn test_update_invalidates_before_returning() {
        let calendar = test_calendar();
        let repo = Arc::new(MockCalendarRepository::new());
        repo.insert(calendar.clone()).await;
        let cache = Arc::new(MockCache::new());
        let cached =
            CachedCalendarRepository::new(repo, cache.clone(), Duration::from_secs(300));

        cache
            .set(&calendar_key(calendar.id), b"pre-change snapshot", None)
            .await
            .unwrap();
        cached.update_calendar(&calendar).await.unwrap();

        assert!(!cache
            .store
            .read()
            .await
            .contains_key(&calendar_key(calendar.id)));
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let calendar = test_calendar();
        let repo = Arc::new(MockCalendarRepository::new());
        repo.insert(calendar.clone()).await;
        let cache = Arc::new(MockCache::new());
        let cached =
            CachedCalendarRepository::new(repo, cache.clone(), Duration::from_secs(300));

        cache
            .set(&calendar_key(calendar.id), b"snapshot", None)
            .await
            .unwrap();
        cached.delete_calendar(calendar.id).await.unwrap();

        assert!(!cache
            .store
            .read()
            .await
            .contains_key(&calendar_key(calendar.id)));
    }
}
