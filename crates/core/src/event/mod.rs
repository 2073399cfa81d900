mod error;
mod operations;
mod recurrence;
mod types;

pub use error::EventError;
pub use operations::validate_event;
pub use recurrence::{expand, occurrence_id, Frequency, RecurrenceRule};
pub use types::{Event, Visibility, MAX_RATING};
