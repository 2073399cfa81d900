//! Read-through cache decorators over the repository traits.
//!
//! Reads check the cache and fall back to the store on a miss; writes go
//! to the store first and then populate or invalidate the entity's cache
//! key before returning, so a read arriving after a mutation's response
//! can never observe the pre-mutation snapshot. Cache failures degrade to
//! direct store access.

mod calendar;
mod event;

pub use calendar::CachedCalendarRepository;
pub use event::CachedEventRepository;
