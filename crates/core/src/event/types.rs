use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recurrence::RecurrenceRule;

/// Highest rating a user can give an event.
pub const MAX_RATING: u8 = 5;

/// Who can see an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// A community event, possibly recurring.
///
/// A single event record describes exactly one occurrence unless it carries
/// a [`RecurrenceRule`]; expansion into concrete occurrences is done by
/// [`super::expand`], never by the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    /// The community this event belongs to.
    pub community_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Start of the (first) occurrence.
    pub start: DateTime<Utc>,
    pub location: Option<String>,
    /// `None` means the event has exactly one occurrence: its own start.
    pub recurrence: Option<RecurrenceRule>,
    /// Users attending the event.
    pub attendees: BTreeSet<Uuid>,
    /// Users who confirmed attendance ahead of time.
    pub rsvps: BTreeSet<Uuid>,
    pub visibility: Visibility,
    pub featured: bool,
    /// Per-user ratings, 0 to [`MAX_RATING`].
    pub ratings: BTreeMap<Uuid, u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new private, non-recurring event.
    pub fn new(community_id: Uuid, title: impl Into<String>, start: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            community_id,
            title: title.into(),
            description: None,
            start,
            location: None,
            recurrence: None,
            attendees: BTreeSet::new(),
            rsvps: BTreeSet::new(),
            visibility: Visibility::Private,
            featured: false,
            ratings: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description for this event.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the location for this event.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the recurrence rule for this event.
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    /// Sets the visibility for this event.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets a specific ID for this event (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Returns true if this event carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Adds a user to the attendee set. Returns false if already present.
    pub fn add_attendee(&mut self, user_id: Uuid) -> bool {
        let inserted = self.attendees.insert(user_id);
        if inserted {
            self.updated_at = Utc::now();
        }
        inserted
    }

    /// Removes a user from the attendee set. Returns false if absent.
    pub fn remove_attendee(&mut self, user_id: Uuid) -> bool {
        let removed = self.attendees.remove(&user_id);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Confirms a user's RSVP. Returns false if already confirmed.
    pub fn confirm_rsvp(&mut self, user_id: Uuid) -> bool {
        let inserted = self.rsvps.insert(user_id);
        if inserted {
            self.updated_at = Utc::now();
        }
        inserted
    }

    /// Cancels a user's RSVP. Returns false if no RSVP was confirmed.
    pub fn cancel_rsvp(&mut self, user_id: Uuid) -> bool {
        let removed = self.rsvps.remove(&user_id);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Records a user's rating, replacing any previous one.
    pub fn set_rating(&mut self, user_id: Uuid, rating: u8) {
        self.ratings.insert(user_id, rating);
        self.updated_at = Utc::now();
    }

    /// Average of all recorded ratings, 0.0 when nobody has rated yet.
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.ratings.values().map(|&r| u32::from(r)).sum();
        f64::from(sum) / self.ratings.len() as f64
    }
}
