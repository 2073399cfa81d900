use thiserror::Error;
use uuid::Uuid;

use gather_core::calendar::CalendarError;
use gather_core::event::EventError;
use gather_core::storage::RepositoryError;

/// Caller-facing errors of the engine's operations.
///
/// Everything recoverable is translated here at the operation boundary;
/// store errors surface untouched rather than being masked with partial
/// data. Cache and fan-out failures never appear in this enum - the engine
/// degrades around them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    /// Invalid input, including a recurrence end before the event start.
    #[error(transparent)]
    Validation(#[from] EventError),
    #[error(transparent)]
    InvalidCalendar(#[from] CalendarError),
    #[error("Permission denied: {0}")]
    Permission(String),
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),
}

impl EngineError {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
