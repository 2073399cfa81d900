//! Cache backends implementing [`gather_core::cache::Cache`].

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;
