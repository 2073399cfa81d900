//! The gather engine: recurrence-aware calendars kept consistent across a
//! read-through cache and a live notification fan-out.
//!
//! Every mutation follows the same strict per-request sequence: apply the
//! change at the store, invalidate the affected cache keys, then publish a
//! change notification. Reads go through the cache and fall back to the
//! store on a miss. The host server provides concurrency and request
//! deadlines; the engine holds no locks across await points and no
//! background schedulers of its own.

pub mod cache;
pub mod config;
pub mod error;
pub mod fanout;
pub mod services;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{EngineError, Result};
pub use services::{CalendarService, EventService};
pub use state::Engine;
