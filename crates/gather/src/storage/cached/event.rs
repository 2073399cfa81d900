//! Cached event repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use gather_core::cache::{deserialize_event, event_key, serialize_event, Cache};
use gather_core::event::{Event, Visibility};
use gather_core::storage::{EventRepository, Page, Result};

/// Read-through decorator for [`EventRepository`].
///
/// Single-event reads are served from `event:{id}`; list queries pass
/// through untouched because their caching (per page, under the
/// `events:*` keys) is owned by the service layer, which also knows when
/// to invalidate them.
pub struct CachedEventRepository<R, C>
where
    R: EventRepository,
    C: Cache,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R, C> CachedEventRepository<R, C>
where
    R: EventRepository,
    C: Cache,
{
    /// Creates a new cached event repository.
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }
}

#[async_trait]
impl<R, C> EventRepository for CachedEventRepository<R, C>
where
    R: EventRepository + 'static,
    C: Cache + 'static,
{
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let cache_key = event_key(id);

        if let Ok(Some(bytes)) = self.cache.get(&cache_key).await {
            match deserialize_event(&bytes) {
                Ok(event) => {
                    tracing::trace!(event_id = %id, "Cache hit for event");
                    return Ok(Some(event));
                }
                // Undecodable value: treat as a miss and fall through.
                Err(err) => {
                    tracing::warn!(event_id = %id, error = %err, "Cached event undecodable");
                }
            }
        }

        tracing::trace!(event_id = %id, "Cache miss for event");
        let event = self.repository.get_event(id).await?;

        if let Some(ref found) = event {
            if let Ok(bytes) = serialize_event(found) {
                if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                    tracing::warn!(event_id = %id, error = %err, "Failed to cache event");
                }
            }
        }

        Ok(event)
    }

    async fn list_events(&self, visibility: Option<Visibility>, page: Page) -> Result<Vec<Event>> {
        self.repository.list_events(visibility, page).await
    }

    async fn list_featured(&self, page: Page) -> Result<Vec<Event>> {
        self.repository.list_featured(page).await
    }

    async fn create_event(&self, event: &Event) -> Result<()> {
        self.repository.create_event(event).await?;

        // Populate straight away: the snapshot is fresh by construction.
        let cache_key = event_key(event.id);
        if let Ok(bytes) = serialize_event(event) {
            if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                tracing::warn!(event_id = %event.id, error = %err, "Failed to cache new event");
            }
        }

        tracing::debug!(event_id = %event.id, title = %event.title, "Event created");
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        self.repository.update_event(event).await?;

        // Invalidate before returning; the next read repopulates.
        if let Err(err) = self.cache.delete(&event_key(event.id)).await {
            tracing::warn!(event_id = %event.id, error = %err, "Failed to invalidate event cache");
        }

        tracing::debug!(event_id = %event.id, "Event updated");
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        self.repository.delete_event(id).await?;

        if let Err(err) = self.cache.delete(&event_key(id)).await {
            tracing::warn!(event_id = %id, error = %err, "Failed to invalidate event cache");
        }

        tracing::debug!(event_id = %id, "Event deleted");
        Ok(())
    }
}
