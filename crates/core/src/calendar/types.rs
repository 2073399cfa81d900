use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who owns a calendar: a single user or a whole community.
///
/// The two cases carry different authorization semantics (a user-owned
/// calendar is mutable only by that user), so they are a tagged union
/// rather than an id with a boolean next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CalendarOwner {
    User(Uuid),
    Community(Uuid),
}

impl CalendarOwner {
    /// The bare owner id, whichever kind it is.
    pub fn id(&self) -> Uuid {
        match self {
            CalendarOwner::User(id) | CalendarOwner::Community(id) => *id,
        }
    }

    /// Returns true for user-owned calendars.
    pub fn is_user(&self) -> bool {
        matches!(self, CalendarOwner::User(_))
    }
}

/// A calendar: an owned, ordered set of event references.
///
/// References are unique; insertion order is preserved but carries no
/// meaning. For recurring events added with expansion, membership holds
/// one reference per materialized occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: Uuid,
    pub owner: CalendarOwner,
    /// Event references, unique, in insertion order.
    pub events: Vec<Uuid>,
    pub color_scheme: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Calendar {
    /// Creates a new empty calendar for the given owner.
    pub fn new(owner: CalendarOwner) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            events: Vec::new(),
            color_scheme: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the color scheme for this calendar.
    pub fn with_color_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.color_scheme = Some(scheme.into());
        self
    }

    /// Sets a specific ID for this calendar (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Returns true if the calendar references the given event.
    pub fn contains_event(&self, event_id: Uuid) -> bool {
        self.events.contains(&event_id)
    }

    /// Inserts an event reference. Returns false if it was already present;
    /// inserting twice leaves the membership unchanged.
    pub fn add_event_ref(&mut self, event_id: Uuid) -> bool {
        if self.contains_event(event_id) {
            return false;
        }
        self.events.push(event_id);
        self.updated_at = Utc::now();
        true
    }

    /// Removes exactly the reference matching `event_id`. Sibling occurrence
    /// references are untouched. Returns false if the reference was absent.
    pub fn remove_event_ref(&mut self, event_id: Uuid) -> bool {
        let before = self.events.len();
        self.events.retain(|&id| id != event_id);
        let removed = self.events.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Swaps the owner reference and kind tag in one step.
    pub fn change_owner(&mut self, new_owner: CalendarOwner) {
        self.owner = new_owner;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_tagged_union() {
        let id = Uuid::new_v4();
        let user = CalendarOwner::User(id);
        let community = CalendarOwner::Community(id);

        assert_eq!(user.id(), id);
        assert_eq!(community.id(), id);
        assert!(user.is_user());
        assert!(!community.is_user());
        assert_ne!(user, community);
    }

    #[test]
    fn test_owner_serde_is_tagged() {
        let owner = CalendarOwner::User(Uuid::nil());
        let json = serde_json::to_string(&owner).unwrap();
        assert!(json.contains("\"kind\":\"user\""), "got {json}");

        let back: CalendarOwner = serde_json::from_str(&json).unwrap();
        assert_eq!(owner, back);
    }

    #[test]
    fn test_add_event_ref_is_idempotent() {
        let mut calendar = Calendar::new(CalendarOwner::User(Uuid::new_v4()));
        let event_id = Uuid::new_v4();

        assert!(calendar.add_event_ref(event_id));
        assert!(!calendar.add_event_ref(event_id));
        assert_eq!(calendar.events, vec![event_id]);
    }

    #[test]
    fn test_remove_event_ref() {
        let mut calendar = Calendar::new(CalendarOwner::User(Uuid::new_v4()));
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        calendar.add_event_ref(keep);
        calendar.add_event_ref(drop);

        assert!(calendar.remove_event_ref(drop));
        assert!(!calendar.remove_event_ref(drop));
        assert_eq!(calendar.events, vec![keep]);
    }

    #[test]
    fn test_change_owner_swaps_kind() {
        let mut calendar = Calendar::new(CalendarOwner::Community(Uuid::new_v4()));
        let new_owner = Uuid::new_v4();

        calendar.change_owner(CalendarOwner::User(new_owner));

        assert_eq!(calendar.owner, CalendarOwner::User(new_owner));
        assert!(calendar.owner.is_user());
    }
}
