//! Engine wiring: composes repositories, cache, and fan-out into services.
//!
//! Backend selection is a compile-time choice via cargo features, mirrored
//! by the factory functions below. Every dependency is owned here and
//! injected by reference into the services - there is no ambient or global
//! client state anywhere in the engine.

use std::sync::Arc;

use gather_core::cache::Cache;
use gather_core::notify::Fanout;
use gather_core::storage::{CalendarRepository, EventRepository};

use crate::config::Config;
use crate::services::{CalendarService, EventService};

// Cache features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' cache features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Must enable exactly one cache feature: 'memory' or 'redis'");

/// The assembled engine: one service per aggregate, sharing the cache and
/// fan-out hub behind `Arc`s.
pub struct Engine {
    pub events: EventService,
    pub calendars: CalendarService,
}

impl Engine {
    /// Wires services from already-constructed backends.
    ///
    /// The repositories handed in here should be the cached decorators;
    /// the factories below take care of that.
    pub fn build(
        event_repo: Arc<dyn EventRepository>,
        calendar_repo: Arc<dyn CalendarRepository>,
        cache: Arc<dyn Cache>,
        fanout: Arc<dyn Fanout>,
        config: &Config,
    ) -> Self {
        let events = EventService::new(
            event_repo.clone(),
            cache,
            fanout.clone(),
            config.cache_ttl(),
        );
        let calendars = CalendarService::new(calendar_repo, event_repo, fanout);
        Self { events, calendars }
    }
}

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::fanout::MemoryFanout;
    use crate::storage::cached::{CachedCalendarRepository, CachedEventRepository};
    use crate::storage::InMemoryRepository;

    impl Engine {
        /// Creates an engine with in-memory storage, cache, and fan-out.
        /// No external dependencies; this is also the test configuration.
        pub fn new(config: &Config) -> Self {
            let repo = Arc::new(InMemoryRepository::new());
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let fanout = Arc::new(MemoryFanout::new());

            let event_repo = Arc::new(CachedEventRepository::new(
                repo.clone(),
                cache.clone(),
                config.cache_ttl(),
            ));
            let calendar_repo = Arc::new(CachedCalendarRepository::new(
                repo,
                cache.clone(),
                config.cache_ttl(),
            ));

            Self::build(event_repo, calendar_repo, cache, fanout, config)
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::redis_impl::RedisCache;
    use crate::fanout::RedisFanout;
    use crate::storage::cached::{CachedCalendarRepository, CachedEventRepository};
    use crate::storage::InMemoryRepository;

    impl Engine {
        /// Creates an engine with in-memory storage and Redis cache and
        /// fan-out, for multi-instance deployments.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repo = Arc::new(InMemoryRepository::new());
            let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let fanout = Arc::new(RedisFanout::new(&config.redis_url).await?);

            let event_repo = Arc::new(CachedEventRepository::new(
                repo.clone(),
                cache.clone(),
                config.cache_ttl(),
            ));
            let calendar_repo = Arc::new(CachedCalendarRepository::new(
                repo,
                cache.clone(),
                config.cache_ttl(),
            ));

            Ok(Self::build(event_repo, calendar_repo, cache, fanout, config))
        }
    }
}

#[cfg(all(test, feature = "inmemory", feature = "memory"))]
mod tests {
    use super::*;
    use chrono::Utc;
    use gather_core::calendar::CalendarOwner;
    use gather_core::event::Event;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config {
            cache_ttl_seconds: 300,
            cache_max_entries: 1000,
            redis_url: "redis://localhost:6379".to_string(),
        }
    }

    #[tokio::test]
    async fn test_engine_end_to_end() {
        let engine = Engine::new(&test_config());
        let owner = Uuid::new_v4();

        let event = engine
            .events
            .create_event(Event::new(Uuid::new_v4(), "Kickoff", Utc::now()))
            .await
            .unwrap();
        let calendar = engine
            .calendars
            .create_calendar(CalendarOwner::User(owner), Some("forest".to_string()))
            .await
            .unwrap();

        let added = engine
            .calendars
            .add_event(calendar.id, event.id, false, owner)
            .await
            .unwrap();
        assert_eq!(added, vec![event.id]);

        let read = engine.calendars.get_calendar(calendar.id).await.unwrap();
        assert_eq!(read.events, vec![event.id]);
    }
}
