//! Calendar aggregation over (recurring) events.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use gather_core::calendar::{validate_calendar, Calendar, CalendarOwner};
use gather_core::event::{expand, occurrence_id, Event};
use gather_core::notify::{ChangeNotification, Channel, Fanout};
use gather_core::storage::{CalendarRepository, EventRepository, RepositoryError};

use crate::error::{EngineError, Result};

use super::{owner_channel, publish_degraded};

/// How far ahead recurring events are materialized when added to a
/// calendar with expansion. Policy constant, not configuration.
pub const EXPANSION_HORIZON_DAYS: i64 = 365;

/// Maintains each calendar's materialized view of its member events.
///
/// Recurring events added with expansion are materialized eagerly: one
/// store record and one membership reference per occurrence, with
/// deterministic occurrence ids so that repeating the add changes nothing.
/// The calendar repository is expected to be the cached decorator, which
/// keeps `calendar:{id}` coherent before any mutation here returns.
pub struct CalendarService {
    calendars: Arc<dyn CalendarRepository>,
    events: Arc<dyn EventRepository>,
    fanout: Arc<dyn Fanout>,
}

impl CalendarService {
    /// Creates a new calendar service.
    pub fn new(
        calendars: Arc<dyn CalendarRepository>,
        events: Arc<dyn EventRepository>,
        fanout: Arc<dyn Fanout>,
    ) -> Self {
        Self {
            calendars,
            events,
            fanout,
        }
    }

    /// Creates a calendar for the given owner.
    pub async fn create_calendar(
        &self,
        owner: CalendarOwner,
        color_scheme: Option<String>,
    ) -> Result<Calendar> {
        let mut calendar = Calendar::new(owner);
        if let Some(scheme) = color_scheme {
            calendar = calendar.with_color_scheme(scheme);
        }
        validate_calendar(&calendar)?;

        self.calendars.create_calendar(&calendar).await?;

        let notification = ChangeNotification::CalendarUpdated {
            calendar_id: calendar.id,
            at: Utc::now(),
        };
        publish_degraded(
            self.fanout.as_ref(),
            &[owner_channel(calendar.owner)],
            &notification,
        )
        .await;

        Ok(calendar)
    }

    /// Gets a calendar, read-through.
    pub async fn get_calendar(&self, calendar_id: Uuid) -> Result<Calendar> {
        self.require_calendar(calendar_id).await
    }

    /// Adds an event to a calendar, optionally expanding its recurrences.
    ///
    /// Without expansion (or for a non-recurring event) exactly one
    /// reference is inserted, idempotently. With expansion every
    /// occurrence within the next [`EXPANSION_HORIZON_DAYS`] gets its own
    /// store record and reference; occurrences already present are
    /// skipped. Returns the newly inserted reference ids and publishes
    /// them as ONE batched `event_added_to_calendar` notification.
    pub async fn add_event(
        &self,
        calendar_id: Uuid,
        event_id: Uuid,
        expand_recurrences: bool,
        actor: Uuid,
    ) -> Result<Vec<Uuid>> {
        let mut calendar = self.require_calendar(calendar_id).await?;
        self.check_owner(&calendar, actor)?;
        let event = self.require_event(event_id).await?;

        let mut added = Vec::new();
        if expand_recurrences && event.is_recurring() {
            let horizon = Utc::now() + Duration::days(EXPANSION_HORIZON_DAYS);
            for at in expand(event.start, event.recurrence.as_ref(), horizon) {
                let reference = if at == event.start {
                    event.id
                } else {
                    self.materialize_occurrence(&event, at).await?
                };
                if calendar.add_event_ref(reference) {
                    added.push(reference);
                }
            }
        } else if calendar.add_event_ref(event.id) {
            added.push(event.id);
        }

        if added.is_empty() {
            tracing::debug!(%calendar_id, %event_id, "Add was a no-op, membership unchanged");
            return Ok(added);
        }

        self.calendars.update_calendar(&calendar).await?;
        tracing::debug!(%calendar_id, %event_id, count = added.len(), "Events added to calendar");

        let notification = ChangeNotification::EventAddedToCalendar {
            calendar_id,
            event_ids: added.clone(),
            at: Utc::now(),
        };
        publish_degraded(
            self.fanout.as_ref(),
            &self.recipients(&calendar, Some(&event)),
            &notification,
        )
        .await;

        Ok(added)
    }

    /// Removes exactly one event reference from a calendar.
    ///
    /// Occurrences are independently removable: removing one never
    /// cascades to its siblings. Returns whether a removal happened.
    pub async fn remove_event(
        &self,
        calendar_id: Uuid,
        event_id: Uuid,
        actor: Uuid,
    ) -> Result<bool> {
        let mut calendar = self.require_calendar(calendar_id).await?;
        self.check_owner(&calendar, actor)?;

        if !calendar.remove_event_ref(event_id) {
            return Ok(false);
        }

        self.calendars.update_calendar(&calendar).await?;
        tracing::debug!(%calendar_id, %event_id, "Event removed from calendar");

        // The event may be gone from the store already; attendees are then
        // unreachable and only the owner and live viewers get notified.
        let event = self.events.get_event(event_id).await?;
        let notification = ChangeNotification::EventRemovedFromCalendar {
            calendar_id,
            event_id,
            at: Utc::now(),
        };
        publish_degraded(
            self.fanout.as_ref(),
            &self.recipients(&calendar, event.as_ref()),
            &notification,
        )
        .await;

        Ok(true)
    }

    /// Atomically swaps a calendar's owner reference and kind tag.
    ///
    /// Notifies the previous owner, the new owner, and live viewers.
    pub async fn change_owner(
        &self,
        calendar_id: Uuid,
        new_owner: CalendarOwner,
        actor: Uuid,
    ) -> Result<Calendar> {
        let mut calendar = self.require_calendar(calendar_id).await?;
        self.check_owner(&calendar, actor)?;

        let previous_owner = calendar.owner;
        calendar.change_owner(new_owner);
        self.calendars.update_calendar(&calendar).await?;
        tracing::debug!(%calendar_id, "Calendar owner changed");

        let mut channels = vec![owner_channel(previous_owner)];
        let new_channel = owner_channel(new_owner);
        if !channels.contains(&new_channel) {
            channels.push(new_channel);
        }
        channels.push(Channel::Calendar(calendar_id));

        let notification = ChangeNotification::CalendarOwnerChanged {
            calendar_id,
            new_owner,
            at: Utc::now(),
        };
        publish_degraded(self.fanout.as_ref(), &channels, &notification).await;

        Ok(calendar)
    }

    /// Projects every member event's occurrences up to `end`.
    ///
    /// Recurring members are re-expanded through their rule; single
    /// members contribute their own start. The result is the sorted,
    /// deduplicated union. Pure projection: membership is never mutated.
    pub async fn get_event_instances(
        &self,
        calendar_id: Uuid,
        end: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        let calendar = self.require_calendar(calendar_id).await?;

        let mut instances = Vec::new();
        for &member in &calendar.events {
            match self.events.get_event(member).await? {
                Some(event) => {
                    instances.extend(expand(event.start, event.recurrence.as_ref(), end));
                }
                None => {
                    tracing::debug!(%calendar_id, event_id = %member, "Skipping dangling event reference");
                }
            }
        }
        instances.sort_unstable();
        instances.dedup();
        Ok(instances)
    }

    /// Materializes one occurrence of a recurring event as its own record.
    ///
    /// The id is deterministic, so a concurrent or repeated expansion
    /// converges on the same record instead of duplicating it.
    async fn materialize_occurrence(&self, base: &Event, at: DateTime<Utc>) -> Result<Uuid> {
        let id = occurrence_id(base.id, at);
        if self.events.get_event(id).await?.is_some() {
            return Ok(id);
        }

        let now = Utc::now();
        let occurrence = Event {
            id,
            start: at,
            recurrence: None,
            created_at: now,
            updated_at: now,
            ..base.clone()
        };
        match self.events.create_event(&occurrence).await {
            Ok(()) => Ok(id),
            // Lost a race against another expansion of the same event.
            Err(RepositoryError::AlreadyExists { .. }) => Ok(id),
            Err(err) => Err(err.into()),
        }
    }

    async fn require_calendar(&self, calendar_id: Uuid) -> Result<Calendar> {
        self.calendars
            .get_calendar(calendar_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Calendar", calendar_id))
    }

    async fn require_event(&self, event_id: Uuid) -> Result<Event> {
        self.events
            .get_event(event_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Event", event_id))
    }

    /// The actor must own a user calendar. Community calendars arrive with
    /// a moderator-validated actor from the authorization layer upstream.
    fn check_owner(&self, calendar: &Calendar, actor: Uuid) -> Result<()> {
        match calendar.owner {
            CalendarOwner::User(owner) if owner != actor => Err(EngineError::Permission(format!(
                "user {actor} does not own calendar {}",
                calendar.id
            ))),
            _ => Ok(()),
        }
    }

    /// Owner first, then the event's attendees, then the public broadcast
    /// group for live viewers of this calendar.
    fn recipients(&self, calendar: &Calendar, event: Option<&Event>) -> Vec<Channel> {
        let mut channels = vec![owner_channel(calendar.owner)];
        if let Some(event) = event {
            for &user in &event.attendees {
                let channel = Channel::User(user);
                if !channels.contains(&channel) {
                    channels.push(channel);
                }
            }
        }
        channels.push(Channel::Calendar(calendar.id));
        channels
    }
}
