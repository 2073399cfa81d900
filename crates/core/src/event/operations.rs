use super::error::EventError;
use super::types::{Event, MAX_RATING};

/// Validates an event before creation or update.
///
/// The recurrence bound is checked here, at creation time, so that a rule
/// with `until` before the event start never reaches expansion.
pub fn validate_event(event: &Event) -> Result<(), EventError> {
    if event.title.trim().is_empty() {
        return Err(EventError::EmptyTitle);
    }
    if event.title.len() > 150 {
        return Err(EventError::TitleTooLong);
    }
    if let Some(rule) = &event.recurrence {
        if let Some(until) = rule.until {
            if until < event.start {
                return Err(EventError::InvalidRecurrence);
            }
        }
    }
    if event.ratings.values().any(|&r| r > MAX_RATING) {
        return Err(EventError::InvalidRating);
    }
    Ok(())
}
