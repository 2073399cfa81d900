//! Event-side engine operations.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use gather_core::cache::{
    attendees_pattern, average_rating_key, deserialize_events, deserialize_rating,
    featured_events_key, featured_events_pattern, filtered_events_key, filtered_events_pattern,
    serialize_events, serialize_rating, Cache,
};
use gather_core::event::{validate_event, Event, EventError, Visibility, MAX_RATING};
use gather_core::notify::{ChangeNotification, Channel, Fanout};
use gather_core::storage::{EventRepository, Page};

use crate::error::{EngineError, Result};

use super::publish_degraded;

/// Event CRUD plus attendance, RSVPs, ratings, and cached listings.
///
/// The event repository is expected to be the cached decorator, which
/// keeps `event:{id}` coherent. List pages and the rating aggregate are
/// cached here, because only this service knows which mutations stale
/// them: every event mutation drops the `events:featured:*` and
/// `events:filter:*` pages, attendance changes additionally drop the
/// event's attendee pages, and ratings drop `average_rating:{id}`.
pub struct EventService {
    events: Arc<dyn EventRepository>,
    cache: Arc<dyn Cache>,
    fanout: Arc<dyn Fanout>,
    cache_ttl: Duration,
}

impl EventService {
    /// Creates a new event service.
    pub fn new(
        events: Arc<dyn EventRepository>,
        cache: Arc<dyn Cache>,
        fanout: Arc<dyn Fanout>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            events,
            cache,
            fanout,
            cache_ttl,
        }
    }

    /// Gets an event, read-through.
    pub async fn get_event(&self, event_id: Uuid) -> Result<Event> {
        self.require_event(event_id).await
    }

    /// Validates and stores a new event.
    ///
    /// A recurrence rule ending before the event start is rejected here,
    /// at creation time, never at expansion time.
    pub async fn create_event(&self, event: Event) -> Result<Event> {
        validate_event(&event)?;

        self.events.create_event(&event).await?;
        self.invalidate_list_pages().await;

        let notification = ChangeNotification::EventCreated {
            event: event.clone(),
            at: Utc::now(),
        };
        publish_degraded(self.fanout.as_ref(), &event_channels(&event), &notification).await;

        Ok(event)
    }

    /// Validates and stores an updated event snapshot.
    pub async fn update_event(&self, event: Event) -> Result<Event> {
        validate_event(&event)?;

        self.events.update_event(&event).await?;
        self.invalidate_list_pages().await;

        let notification = ChangeNotification::EventUpdated {
            event: event.clone(),
            at: Utc::now(),
        };
        publish_degraded(self.fanout.as_ref(), &event_channels(&event), &notification).await;

        Ok(event)
    }

    /// Deletes an event and every cache entry derived from it.
    pub async fn delete_event(&self, event_id: Uuid) -> Result<()> {
        let event = self.require_event(event_id).await?;

        self.events.delete_event(event_id).await?;
        self.invalidate_list_pages().await;
        self.invalidate_degraded(&attendees_pattern(event_id)).await;
        self.delete_key_degraded(&average_rating_key(event_id)).await;

        let notification = ChangeNotification::EventDeleted {
            event_id,
            at: Utc::now(),
        };
        publish_degraded(self.fanout.as_ref(), &event_channels(&event), &notification).await;

        Ok(())
    }

    /// Adds the user to the event's attendees.
    pub async fn join_event(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let mut event = self.require_event(event_id).await?;
        if !event.add_attendee(user_id) {
            return Err(EventError::AlreadyAttending.into());
        }
        self.store_attendance_change(event).await
    }

    /// Removes the user from the event's attendees.
    pub async fn leave_event(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let mut event = self.require_event(event_id).await?;
        if !event.remove_attendee(user_id) {
            return Err(EventError::NotAttending.into());
        }
        self.store_attendance_change(event).await
    }

    /// Confirms the user's RSVP.
    pub async fn confirm_rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let mut event = self.require_event(event_id).await?;
        if !event.confirm_rsvp(user_id) {
            return Err(EventError::RsvpAlreadyConfirmed.into());
        }
        self.store_attendance_change(event).await
    }

    /// Cancels the user's RSVP.
    pub async fn cancel_rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<Event> {
        let mut event = self.require_event(event_id).await?;
        if !event.cancel_rsvp(user_id) {
            return Err(EventError::RsvpNotFound.into());
        }
        self.store_attendance_change(event).await
    }

    /// Records a user's rating and returns the fresh average.
    pub async fn rate_event(&self, event_id: Uuid, user_id: Uuid, rating: u8) -> Result<f64> {
        if rating > MAX_RATING {
            return Err(EventError::InvalidRating.into());
        }

        let mut event = self.require_event(event_id).await?;
        event.set_rating(user_id, rating);
        self.events.update_event(&event).await?;
        self.delete_key_degraded(&average_rating_key(event_id)).await;

        Ok(event.average_rating())
    }

    /// The event's average rating, read-through under `average_rating:{id}`.
    pub async fn average_rating(&self, event_id: Uuid) -> Result<f64> {
        let cache_key = average_rating_key(event_id);
        if let Ok(Some(bytes)) = self.cache.get(&cache_key).await {
            if let Ok(average) = deserialize_rating(&bytes) {
                tracing::trace!(%event_id, "Cache hit for rating aggregate");
                return Ok(average);
            }
        }

        let event = self.require_event(event_id).await?;
        let average = event.average_rating();

        if let Ok(bytes) = serialize_rating(average) {
            if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.cache_ttl)).await {
                tracing::warn!(%event_id, error = %err, "Failed to cache rating aggregate");
            }
        }
        Ok(average)
    }

    /// Flags or unflags an event as featured.
    pub async fn set_featured(&self, event_id: Uuid, featured: bool) -> Result<Event> {
        let mut event = self.require_event(event_id).await?;
        if event.featured == featured {
            return Ok(event);
        }
        event.featured = featured;
        event.updated_at = Utc::now();

        self.events.update_event(&event).await?;
        self.invalidate_list_pages().await;

        let notification = ChangeNotification::EventUpdated {
            event: event.clone(),
            at: Utc::now(),
        };
        publish_degraded(self.fanout.as_ref(), &event_channels(&event), &notification).await;

        Ok(event)
    }

    /// Lists events with an optional visibility filter, one cached page at
    /// a time under `events:filter:{vis}:page:{n}`.
    pub async fn list_events(
        &self,
        visibility: Option<Visibility>,
        page: Page,
    ) -> Result<Vec<Event>> {
        let cache_key = filtered_events_key(visibility, page.number);
        self.cached_page(&cache_key, self.events.list_events(visibility, page))
            .await
    }

    /// Lists featured events, one cached page at a time under
    /// `events:featured:{n}`.
    pub async fn list_featured(&self, page: Page) -> Result<Vec<Event>> {
        let cache_key = featured_events_key(page.number);
        self.cached_page(&cache_key, self.events.list_featured(page))
            .await
    }

    /// Read-through for one list page. Pages always get a TTL: it is what
    /// bounds the staleness of the wildcard-scan invalidation race.
    async fn cached_page(
        &self,
        cache_key: &str,
        load: impl std::future::Future<Output = gather_core::storage::Result<Vec<Event>>> + Send,
    ) -> Result<Vec<Event>> {
        if let Ok(Some(bytes)) = self.cache.get(cache_key).await {
            match deserialize_events(&bytes) {
                Ok(events) => {
                    tracing::trace!(key = cache_key, "Cache hit for event page");
                    return Ok(events);
                }
                Err(err) => {
                    tracing::warn!(key = cache_key, error = %err, "Cached event page undecodable");
                }
            }
        }

        let events = load.await?;
        if let Ok(bytes) = serialize_events(&events) {
            if let Err(err) = self.cache.set(cache_key, &bytes, Some(self.cache_ttl)).await {
                tracing::warn!(key = cache_key, error = %err, "Failed to cache event page");
            }
        }
        Ok(events)
    }

    /// Persists an attendance/RSVP change and fans it out.
    async fn store_attendance_change(&self, event: Event) -> Result<Event> {
        self.events.update_event(&event).await?;
        self.invalidate_degraded(&attendees_pattern(event.id)).await;

        let notification = ChangeNotification::EventUpdated {
            event: event.clone(),
            at: Utc::now(),
        };
        publish_degraded(self.fanout.as_ref(), &event_channels(&event), &notification).await;

        Ok(event)
    }

    /// Every event mutation stales the featured and filtered list pages.
    async fn invalidate_list_pages(&self) {
        self.invalidate_degraded(&featured_events_pattern()).await;
        self.invalidate_degraded(&filtered_events_pattern()).await;
    }

    async fn invalidate_degraded(&self, pattern: &str) {
        if let Err(err) = self.cache.delete_pattern(pattern).await {
            tracing::warn!(pattern, error = %err, "Failed to invalidate cache pattern");
        }
    }

    async fn delete_key_degraded(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            tracing::warn!(key, error = %err, "Failed to invalidate cache key");
        }
    }

    async fn require_event(&self, event_id: Uuid) -> Result<Event> {
        self.events
            .get_event(event_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Event", event_id))
    }
}

/// The event's attendees plus the community-wide broadcast channel.
fn event_channels(event: &Event) -> Vec<Channel> {
    let mut channels: Vec<Channel> = event.attendees.iter().map(|&u| Channel::User(u)).collect();
    channels.push(Channel::Community(event.community_id));
    channels
}
