use async_trait::async_trait;
use uuid::Uuid;

use crate::calendar::Calendar;
use crate::event::{Event, Visibility};

use super::{Page, Result};

/// Repository for event records.
///
/// This is the persistence boundary: the engine owns no storage of its own
/// and reaches the canonical records only through this trait.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Gets an event by its ID.
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>>;

    /// Lists events, optionally filtered by visibility, ordered by start.
    async fn list_events(&self, visibility: Option<Visibility>, page: Page) -> Result<Vec<Event>>;

    /// Lists featured events, ordered by start.
    async fn list_featured(&self, page: Page) -> Result<Vec<Event>>;

    /// Creates a new event. Fails with `AlreadyExists` for a known ID.
    async fn create_event(&self, event: &Event) -> Result<()>;

    /// Updates an existing event.
    async fn update_event(&self, event: &Event) -> Result<()>;

    /// Deletes an event by its ID.
    async fn delete_event(&self, id: Uuid) -> Result<()>;
}

/// Repository for calendar records.
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// Gets a calendar by its ID.
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>>;

    /// Creates a new calendar.
    async fn create_calendar(&self, calendar: &Calendar) -> Result<()>;

    /// Updates an existing calendar.
    async fn update_calendar(&self, calendar: &Calendar) -> Result<()>;

    /// Deletes a calendar by its ID.
    async fn delete_calendar(&self, id: Uuid) -> Result<()>;
}
