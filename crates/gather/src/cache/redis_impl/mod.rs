//! Redis cache backend.

mod cache;
mod error;

pub use cache::RedisCache;
pub(crate) use error::map_redis_error;
