use thiserror::Error;

/// Errors that can occur when validating or manipulating events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Event title cannot be empty")]
    EmptyTitle,
    #[error("Event title too long (max 150 characters)")]
    TitleTooLong,
    #[error("Recurrence end must be on or after the event start")]
    InvalidRecurrence,
    #[error("Rating must be between 0 and 5")]
    InvalidRating,
    #[error("User is already attending this event")]
    AlreadyAttending,
    #[error("User is not attending this event")]
    NotAttending,
    #[error("RSVP already confirmed for this event")]
    RsvpAlreadyConfirmed,
    #[error("No confirmed RSVP found for this event")]
    RsvpNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_error_display() {
        assert_eq!(
            EventError::EmptyTitle.to_string(),
            "Event title cannot be empty"
        );
        assert_eq!(
            EventError::InvalidRecurrence.to_string(),
            "Recurrence end must be on or after the event start"
        );
        assert_eq!(
            EventError::InvalidRating.to_string(),
            "Rating must be between 0 and 5"
        );
    }
}
