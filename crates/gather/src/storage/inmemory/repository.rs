//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use gather_core::calendar::Calendar;
use gather_core::event::{Event, Visibility};
use gather_core::storage::{
    CalendarRepository, EventRepository, Page, RepositoryError, Result,
};

/// In-memory storage backend.
///
/// HashMaps behind `Arc<RwLock<_>>`; nothing is persisted. List queries
/// order by start time (id as tie-breaker) so pagination is deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
    calendars: Arc<RwLock<HashMap<Uuid, Calendar>>>,
}

impl InMemoryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate(mut events: Vec<Event>, page: Page) -> Vec<Event> {
    events.sort_by_key(|e| (e.start, e.id));
    events
        .into_iter()
        .skip(page.offset())
        .take(page.per_page as usize)
        .collect()
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(&id).cloned())
    }

    async fn list_events(&self, visibility: Option<Visibility>, page: Page) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let matching: Vec<Event> = events
            .values()
            .filter(|e| visibility.is_none_or(|v| e.visibility == v))
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }

    async fn list_featured(&self, page: Page) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let featured: Vec<Event> = events.values().filter(|e| e.featured).cloned().collect();
        Ok(paginate(featured, page))
    }

    async fn create_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Event",
                id: event.id.to_string(),
            });
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.write().await;
        if !events.contains_key(&event.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Event",
                id: event.id.to_string(),
            });
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let mut events = self.events.write().await;
        if events.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "Event",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CalendarRepository for InMemoryRepository {
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
        let calendars = self.calendars.read().await;
        Ok(calendars.get(&id).cloned())
    }

    async fn create_calendar(&self, calendar: &Calendar) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        if calendars.contains_key(&calendar.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Calendar",
                id: calendar.id.to_string(),
            });
        }
        calendars.insert(calendar.id, calendar.clone());
        Ok(())
    }

    async fn update_calendar(&self, calendar: &Calendar) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        if !calendars.contains_key(&calendar.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Calendar",
                id: calendar.id.to_string(),
            });
        }
        calendars.insert(calendar.id, calendar.clone());
        Ok(())
    }

    async fn delete_calendar(&self, id: Uuid) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        if calendars.remove(&id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: "Calendar",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use gather_core::calendar::CalendarOwner;

    fn event_starting_in(days: i64) -> Event {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Event::new(Uuid::new_v4(), "Event", base + Duration::days(days))
    }

    #[tokio::test]
    async fn test_event_crud() {
        let repo = InMemoryRepository::new();
        let event = event_starting_in(0);

        repo.create_event(&event).await.unwrap();
        assert_eq!(repo.get_event(event.id).await.unwrap(), Some(event.clone()));

        let mut updated = event.clone();
        updated.title = "Renamed".to_string();
        repo.update_event(&updated).await.unwrap();
        assert_eq!(
            repo.get_event(event.id).await.unwrap().unwrap().title,
            "Renamed"
        );

        repo.delete_event(event.id).await.unwrap();
        assert_eq!(repo.get_event(event.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_duplicate_event_fails() {
        let repo = InMemoryRepository::new();
        let event = event_starting_in(0);

        repo.create_event(&event).await.unwrap();
        assert!(matches!(
            repo.create_event(&event).await,
            Err(RepositoryError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_event_fails() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.update_event(&event_starting_in(0)).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_events_filters_by_visibility() {
        let repo = InMemoryRepository::new();
        let public = event_starting_in(0).with_visibility(Visibility::Public);
        let private = event_starting_in(1);
        repo.create_event(&public).await.unwrap();
        repo.create_event(&private).await.unwrap();

        let all = repo.list_events(None, Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_public = repo
            .list_events(Some(Visibility::Public), Page::default())
            .await
            .unwrap();
        assert_eq!(only_public.len(), 1);
        assert_eq!(only_public[0].id, public.id);
    }

    #[tokio::test]
    async fn test_list_events_paginates_in_start_order() {
        let repo = InMemoryRepository::new();
        for day in 0..5 {
            repo.create_event(&event_starting_in(day)).await.unwrap();
        }

        let first = repo.list_events(None, Page::new(1, 2)).await.unwrap();
        let second = repo.list_events(None, Page::new(2, 2)).await.unwrap();
        let third = repo.list_events(None, Page::new(3, 2)).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 1);
        assert!(first[0].start <= first[1].start);
        assert!(first[1].start <= second[0].start);
    }

    #[tokio::test]
    async fn test_list_featured() {
        let repo = InMemoryRepository::new();
        let mut featured = event_starting_in(0);
        featured.featured = true;
        repo.create_event(&featured).await.unwrap();
        repo.create_event(&event_starting_in(1)).await.unwrap();

        let listed = repo.list_featured(Page::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, featured.id);
    }

    #[tokio::test]
    async fn test_calendar_crud() {
        let repo = InMemoryRepository::new();
        let calendar = Calendar::new(CalendarOwner::User(Uuid::new_v4()));

        repo.create_calendar(&calendar).await.unwrap();
        assert!(repo.get_calendar(calendar.id).await.unwrap().is_some());

        repo.delete_calendar(calendar.id).await.unwrap();
        assert!(repo.get_calendar(calendar.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_calendar(calendar.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
