//! Notification fan-out backends implementing [`gather_core::notify::Fanout`].

mod memory;

#[cfg(feature = "redis")]
mod redis_impl;

pub use memory::MemoryFanout;

#[cfg(feature = "redis")]
pub use redis_impl::RedisFanout;
