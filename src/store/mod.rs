use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::event::{Event, EventStatus};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event {0} not found")]
    NotFound(Uuid),

    #[error("stale write on event {id}: expected version {expected}, found {found}")]
    VersionConflict { id: Uuid, expected: i64, found: i64 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Inclusive start-date range.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub status: Option<EventStatus>,
}

/// Field-level partial update. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub status: Option<EventStatus>,
    pub is_public: Option<bool>,
    pub awaiting_mod: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl EventPatch {
    pub fn apply(&self, event: &mut Event) {
        if let Some(status) = self.status {
            event.status = status;
        }
        if let Some(is_public) = self.is_public {
            event.is_public = is_public;
        }
        if let Some(awaiting_mod) = self.awaiting_mod {
            event.awaiting_mod = awaiting_mod;
        }
        if let Some(lat) = self.lat {
            event.lat = Some(lat);
        }
        if let Some(lng) = self.lng {
            event.lng = Some(lng);
        }
    }
}

/// Event Record Store contract. Adapters persist one record per call; there
/// is no cross-record transaction. Writes are guarded by a version check so
/// a stale update fails with `VersionConflict` instead of silently winning.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Event, StoreError>;

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError>;

    async fn insert(&self, event: Event) -> Result<Event, StoreError>;

    /// Applies `patch` if the stored version still equals `expected_version`,
    /// bumping the version and `updated_at`. Returns the stored record.
    async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        expected_version: i64,
    ) -> Result<Event, StoreError>;
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some((from, to)) = self.date_range {
            if event.start_date < from || event.start_date > to {
                return false;
            }
        }
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        true
    }
}
