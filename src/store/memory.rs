use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::event::Event;
use crate::store::{EventFilter, EventPatch, EventStore, StoreError};

/// Map-backed adapter used in tests and when no database is configured.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<Uuid, Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get(&self, id: Uuid) -> Result<Event, StoreError> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().await;
        let mut matched: Vec<Event> = events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn insert(&self, event: Event) -> Result<Event, StoreError> {
        let mut events = self.events.write().await;
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        expected_version: i64,
    ) -> Result<Event, StoreError> {
        let mut events = self.events.write().await;
        let event = events.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if event.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                found: event.version,
            });
        }

        patch.apply(event);
        event.version += 1;
        event.updated_at = Utc::now();

        Ok(event.clone())
    }
}
