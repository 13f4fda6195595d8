use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPool;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::event::{Event, EventStatus};
use crate::store::{EventFilter, EventPatch, EventStore, StoreError};

const EVENT_COLUMNS: &str = "id, title, venue, start_date, start_time, status, \
     is_public, awaiting_mod, author_id, lat, lng, version, created_at, updated_at";

/// sqlx-backed adapter. Status is persisted as text and parsed on read; a row
/// carrying an unknown status is treated as a store failure, not a panic.
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid) -> Result<Event, StoreError> {
        let sql = format!("SELECT {} FROM apollo_events WHERE id = $1", EVENT_COLUMNS);
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(StoreError::NotFound(id))?.try_into()
    }
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    venue: String,
    start_date: NaiveDate,
    start_time: Option<String>,
    status: String,
    is_public: bool,
    awaiting_mod: bool,
    author_id: Uuid,
    lat: Option<f64>,
    lng: Option<f64>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status: EventStatus = row
            .status
            .parse()
            .map_err(|e: String| StoreError::Unavailable(format!("corrupt event row: {}", e)))?;
        Ok(Event {
            id: row.id,
            title: row.title,
            venue: row.venue,
            start_date: row.start_date,
            start_time: row.start_time,
            status,
            is_public: row.is_public,
            awaiting_mod: row.awaiting_mod,
            author_id: row.author_id,
            lat: row.lat,
            lng: row.lng,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn get(&self, id: Uuid) -> Result<Event, StoreError> {
        self.fetch(id).await
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM apollo_events", EVENT_COLUMNS));

        let mut prefix = " WHERE ";
        if let Some((from, to)) = filter.date_range {
            qb.push(prefix).push("start_date >= ").push_bind(from);
            qb.push(" AND start_date <= ").push_bind(to);
            prefix = " AND ";
        }
        if let Some(status) = filter.status {
            qb.push(prefix).push("status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY start_date ASC, id ASC");

        let rows: Vec<EventRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Event::try_from).collect()
    }

    async fn insert(&self, event: Event) -> Result<Event, StoreError> {
        sqlx::query(
            "INSERT INTO apollo_events \
             (id, title, venue, start_date, start_time, status, is_public, \
              awaiting_mod, author_id, lat, lng, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.venue)
        .bind(event.start_date)
        .bind(&event.start_time)
        .bind(event.status.as_str())
        .bind(event.is_public)
        .bind(event.awaiting_mod)
        .bind(event.author_id)
        .bind(event.lat)
        .bind(event.lng)
        .bind(event.version)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: EventPatch,
        expected_version: i64,
    ) -> Result<Event, StoreError> {
        let mut event = self.fetch(id).await?;
        if event.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                found: event.version,
            });
        }

        patch.apply(&mut event);
        event.version = expected_version + 1;
        event.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE apollo_events \
             SET status = $1, is_public = $2, awaiting_mod = $3, lat = $4, lng = $5, \
                 version = $6, updated_at = $7 \
             WHERE id = $8 AND version = $9",
        )
        .bind(event.status.as_str())
        .bind(event.is_public)
        .bind(event.awaiting_mod)
        .bind(event.lat)
        .bind(event.lng)
        .bind(event.version)
        .bind(event.updated_at)
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Lost the race between our read and write; report the winner's version.
            let current = self.fetch(id).await?;
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
                found: current.version,
            });
        }

        Ok(event)
    }
}
