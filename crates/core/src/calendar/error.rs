use thiserror::Error;

/// Errors that can occur when validating or manipulating calendars.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Color scheme cannot be empty when set")]
    EmptyColorScheme,
}
