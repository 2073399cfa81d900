//! The cache key and channel name schema.
//!
//! Keys are plain strings with ids rendered as UUIDs; list caches carry a
//! page suffix so that one mutation can invalidate every page of the list
//! with a single prefix pattern.

use uuid::Uuid;

use crate::event::Visibility;
use crate::notify::Channel;

/// Returns the cache key for a single event snapshot.
pub fn event_key(event_id: Uuid) -> String {
    format!("event:{event_id}")
}

/// Returns the cache key for a calendar snapshot.
pub fn calendar_key(calendar_id: Uuid) -> String {
    format!("calendar:{calendar_id}")
}

/// Returns the cache key for one page of the featured-events list.
pub fn featured_events_key(page: u32) -> String {
    format!("events:featured:{page}")
}

/// Returns the pattern matching every featured-events page.
pub fn featured_events_pattern() -> String {
    "events:featured:*".to_string()
}

/// Returns the cache key for one page of a visibility-filtered event list.
pub fn filtered_events_key(visibility: Option<Visibility>, page: u32) -> String {
    let filter = match visibility {
        Some(Visibility::Public) => "public",
        Some(Visibility::Private) => "private",
        None => "all",
    };
    format!("events:filter:{filter}:page:{page}")
}

/// Returns the pattern matching every filtered event-list page.
pub fn filtered_events_pattern() -> String {
    "events:filter:*".to_string()
}

/// Returns the cache key for one page of an event's attendee list.
pub fn attendees_page_key(event_id: Uuid, page: u32) -> String {
    format!("attendees:{event_id}:page:{page}")
}

/// Returns the pattern matching every attendee page of one event.
pub fn attendees_pattern(event_id: Uuid) -> String {
    format!("attendees:{event_id}:page:*")
}

/// Returns the cache key for an event's rating aggregate.
pub fn average_rating_key(event_id: Uuid) -> String {
    format!("average_rating:{event_id}")
}

/// Returns the pub/sub channel name for one user's notifications.
pub fn user_channel(user_id: Uuid) -> String {
    format!("channel:user:{user_id}")
}

/// Returns the pub/sub channel name for a community's notifications.
pub fn community_channel(community_id: Uuid) -> String {
    format!("channel:community:{community_id}")
}

/// Returns the pub/sub channel name for a calendar's public broadcast group.
pub fn calendar_channel(calendar_id: Uuid) -> String {
    format!("channel:calendar:{calendar_id}")
}

impl Channel {
    /// The pub/sub channel name this routing key maps to.
    pub fn name(&self) -> String {
        match self {
            Channel::User(id) => user_channel(*id),
            Channel::Community(id) => community_channel(*id),
            Channel::Calendar(id) => calendar_channel(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_uuid() -> Uuid {
        Uuid::nil()
    }

    #[test]
    fn test_event_key() {
        assert_eq!(
            event_key(test_uuid()),
            "event:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_calendar_key() {
        assert_eq!(
            calendar_key(test_uuid()),
            "calendar:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_featured_events_keys_share_prefix() {
        let key = featured_events_key(3);
        assert_eq!(key, "events:featured:3");
        assert!(pattern_prefix_matches(&featured_events_pattern(), &key));
    }

    #[test]
    fn test_filtered_events_key_per_visibility() {
        assert_eq!(
            filtered_events_key(Some(Visibility::Public), 1),
            "events:filter:public:page:1"
        );
        assert_eq!(
            filtered_events_key(Some(Visibility::Private), 2),
            "events:filter:private:page:2"
        );
        assert_eq!(filtered_events_key(None, 1), "events:filter:all:page:1");
        assert!(pattern_prefix_matches(
            &filtered_events_pattern(),
            &filtered_events_key(Some(Visibility::Public), 7)
        ));
    }

    #[test]
    fn test_attendees_keys() {
        assert_eq!(
            attendees_page_key(test_uuid(), 2),
            "attendees:00000000-0000-0000-0000-000000000000:page:2"
        );
        assert!(pattern_prefix_matches(
            &attendees_pattern(test_uuid()),
            &attendees_page_key(test_uuid(), 2)
        ));
    }

    #[test]
    fn test_average_rating_key() {
        assert_eq!(
            average_rating_key(test_uuid()),
            "average_rating:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_channel_names() {
        let id = test_uuid();
        assert_eq!(
            Channel::User(id).name(),
            "channel:user:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            Channel::Community(id).name(),
            "channel:community:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            Channel::Calendar(id).name(),
            "channel:calendar:00000000-0000-0000-0000-000000000000"
        );
    }

    fn pattern_prefix_matches(pattern: &str, key: &str) -> bool {
        crate::cache::pattern_matches(pattern, key)
    }
}
