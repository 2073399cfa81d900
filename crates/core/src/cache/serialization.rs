//! JSON (de)serialization of domain snapshots for cache storage.
//!
//! Cache values are human-readable JSON documents with ids rendered as
//! plain strings, so they can be inspected with any Redis client.

use thiserror::Error;

use crate::calendar::Calendar;
use crate::event::Event;

/// Errors that can occur while (de)serializing cache values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes an event snapshot to JSON bytes.
pub fn serialize_event(event: &Event) -> Result<Vec<u8>> {
    serde_json::to_vec(event).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to an event snapshot.
pub fn deserialize_event(bytes: &[u8]) -> Result<Event> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a page of events to JSON bytes.
pub fn serialize_events(events: &[Event]) -> Result<Vec<u8>> {
    serde_json::to_vec(events).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a page of events.
pub fn deserialize_events(bytes: &[u8]) -> Result<Vec<Event>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a calendar snapshot to JSON bytes.
pub fn serialize_calendar(calendar: &Calendar) -> Result<Vec<u8>> {
    serde_json::to_vec(calendar).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a calendar snapshot.
pub fn deserialize_calendar(bytes: &[u8]) -> Result<Calendar> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a rating aggregate to JSON bytes.
pub fn serialize_rating(rating: f64) -> Result<Vec<u8>> {
    serde_json::to_vec(&rating).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a rating aggregate.
pub fn deserialize_rating(bytes: &[u8]) -> Result<f64> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}
