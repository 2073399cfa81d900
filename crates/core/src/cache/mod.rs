mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    attendees_page_key, attendees_pattern, average_rating_key, calendar_channel, calendar_key,
    community_channel, event_key, featured_events_key, featured_events_pattern,
    filtered_events_key, filtered_events_pattern, user_channel,
};
pub use patterns::pattern_matches;
pub use serialization::{
    deserialize_calendar, deserialize_event, deserialize_events, deserialize_rating,
    serialize_calendar, serialize_event, serialize_events, serialize_rating, SerializationError,
};
pub use traits::Cache;
