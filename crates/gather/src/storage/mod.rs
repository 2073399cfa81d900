//! Storage backends and the read-through cache decorators.

pub mod cached;

#[cfg(feature = "inmemory")]
mod inmemory;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryRepository;
