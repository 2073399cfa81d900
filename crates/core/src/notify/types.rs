use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarOwner;
use crate::event::Event;

/// A routing key for live notification delivery.
///
/// `User` channels reach one signed-in recipient, `Community` channels
/// reach everyone watching a community's events, and `Calendar` channels
/// are the public broadcast group for live viewers of one calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Channel {
    User(Uuid),
    Community(Uuid),
    Calendar(Uuid),
}

/// A change published to live subscribers after a mutation.
///
/// One variant per mutation kind; the serialized tag doubles as the
/// real-time channel event name. Notifications are delivered at least once
/// to currently connected subscribers and then discarded - durable
/// notification records live in the separate notification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeNotification {
    /// A new event exists; carries a full snapshot.
    EventCreated { event: Event, at: DateTime<Utc> },
    /// An event changed; carries the post-change snapshot.
    EventUpdated { event: Event, at: DateTime<Utc> },
    /// An event is gone.
    EventDeleted { event_id: Uuid, at: DateTime<Utc> },
    /// Calendar metadata changed.
    CalendarUpdated {
        calendar_id: Uuid,
        at: DateTime<Utc>,
    },
    /// One batched message per add operation, listing every newly inserted
    /// reference, so expanding a recurrence does not flood subscribers.
    EventAddedToCalendar {
        calendar_id: Uuid,
        event_ids: Vec<Uuid>,
        at: DateTime<Utc>,
    },
    /// Exactly one reference was removed.
    EventRemovedFromCalendar {
        calendar_id: Uuid,
        event_id: Uuid,
        at: DateTime<Utc>,
    },
    /// The calendar changed hands.
    CalendarOwnerChanged {
        calendar_id: Uuid,
        new_owner: CalendarOwner,
        at: DateTime<Utc>,
    },
}

impl ChangeNotification {
    /// The wire name of this notification kind (the serde tag).
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeNotification::EventCreated { .. } => "event_created",
            ChangeNotification::EventUpdated { .. } => "event_updated",
            ChangeNotification::EventDeleted { .. } => "event_deleted",
            ChangeNotification::CalendarUpdated { .. } => "calendar_updated",
            ChangeNotification::EventAddedToCalendar { .. } => "event_added_to_calendar",
            ChangeNotification::EventRemovedFromCalendar { .. } => "event_removed_from_calendar",
            ChangeNotification::CalendarOwnerChanged { .. } => "calendar_owner_changed",
        }
    }

    /// The calendar this change belongs to, if any.
    pub fn calendar_id(&self) -> Option<Uuid> {
        match self {
            ChangeNotification::CalendarUpdated { calendar_id, .. }
            | ChangeNotification::EventAddedToCalendar { calendar_id, .. }
            | ChangeNotification::EventRemovedFromCalendar { calendar_id, .. }
            | ChangeNotification::CalendarOwnerChanged { calendar_id, .. } => Some(*calendar_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_wire_name() {
        let notification = ChangeNotification::EventAddedToCalendar {
            calendar_id: Uuid::nil(),
            event_ids: vec![Uuid::nil()],
            at: Utc::now(),
        };

        let json = serde_json::to_string(&notification).unwrap();
        assert!(
            json.contains("\"type\":\"event_added_to_calendar\""),
            "got {json}"
        );
        assert_eq!(notification.kind(), "event_added_to_calendar");
    }

    #[test]
    fn test_notification_roundtrip() {
        let notification = ChangeNotification::CalendarOwnerChanged {
            calendar_id: Uuid::new_v4(),
            new_owner: CalendarOwner::User(Uuid::new_v4()),
            at: Utc::now(),
        };

        let json = serde_json::to_vec(&notification).unwrap();
        let back: ChangeNotification = serde_json::from_slice(&json).unwrap();
        assert_eq!(notification, back);
    }

    #[test]
    fn test_calendar_id_accessor() {
        let calendar_id = Uuid::new_v4();
        let removed = ChangeNotification::EventRemovedFromCalendar {
            calendar_id,
            event_id: Uuid::new_v4(),
            at: Utc::now(),
        };
        assert_eq!(removed.calendar_id(), Some(calendar_id));

        let deleted = ChangeNotification::EventDeleted {
            event_id: Uuid::new_v4(),
            at: Utc::now(),
        };
        assert_eq!(deleted.calendar_id(), None);
    }
}
