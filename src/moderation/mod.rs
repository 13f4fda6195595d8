use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::actor::Actor;
use crate::models::event::{CreateEventRequest, Event, EventStatus};
use crate::store::{EventPatch, EventStore, StoreError};

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("event is {actual}, expected {expected}")]
    PreconditionFailed {
        expected: EventStatus,
        actual: EventStatus,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("event {0} not found")]
    NotFound(Uuid),

    #[error("event was modified concurrently, reload and retry")]
    Conflict,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for ModerationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ModerationError::NotFound(id),
            StoreError::VersionConflict { .. } => ModerationError::Conflict,
            StoreError::Unavailable(msg) => ModerationError::StoreUnavailable(msg),
        }
    }
}

/// Applies the expected -> confirmed -> published workflow. Every transition
/// reads the event, checks authorization and the status precondition, then
/// writes through a versioned update so concurrent transitions on the same
/// event cannot both win.
#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn EventStore>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// New events always enter the workflow as Expected, owned by the actor.
    pub async fn create(
        &self,
        request: CreateEventRequest,
        actor: Actor,
    ) -> Result<Event, ModerationError> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: request.title,
            venue: request.venue,
            start_date: request.start_date,
            start_time: request.start_time,
            status: EventStatus::Expected,
            is_public: false,
            awaiting_mod: false,
            author_id: actor.id,
            lat: request.lat,
            lng: request.lng,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert(event).await?;
        info!(event_id = %stored.id, author_id = %actor.id, "Event created");
        Ok(stored)
    }

    /// Author (or a moderator) vouches for the event: Expected -> Confirmed,
    /// entering the moderation queue.
    pub async fn confirm(&self, id: Uuid, actor: Actor) -> Result<Event, ModerationError> {
        let event = self.store.get(id).await?;
        require_author_or_moderator(&event, actor)?;
        require_status(&event, EventStatus::Expected)?;

        let patch = EventPatch {
            status: Some(EventStatus::Confirmed),
            awaiting_mod: Some(true),
            ..Default::default()
        };
        let updated = self.store.update(id, patch, event.version).await?;
        info!(event_id = %id, actor_id = %actor.id, "Event confirmed");
        Ok(updated)
    }

    /// Single-step regression Confirmed -> Expected, only while the event has
    /// not gone public. The status precondition is reported before ownership
    /// so a public event fails the same way for every actor.
    pub async fn unconfirm(&self, id: Uuid, actor: Actor) -> Result<Event, ModerationError> {
        let event = self.store.get(id).await?;
        if event.is_public {
            return Err(ModerationError::PreconditionFailed {
                expected: EventStatus::Confirmed,
                actual: event.status,
            });
        }
        require_status(&event, EventStatus::Confirmed)?;
        require_author_or_moderator(&event, actor)?;

        let patch = EventPatch {
            status: Some(EventStatus::Expected),
            awaiting_mod: Some(false),
            ..Default::default()
        };
        let updated = self.store.update(id, patch, event.version).await?;
        info!(event_id = %id, actor_id = %actor.id, "Event unconfirmed");
        Ok(updated)
    }

    /// Moderator publishes a confirmed event: Confirmed -> Published.
    pub async fn approve(&self, id: Uuid, actor: Actor) -> Result<Event, ModerationError> {
        let event = self.store.get(id).await?;
        require_moderator(actor)?;
        require_status(&event, EventStatus::Confirmed)?;

        let patch = EventPatch {
            status: Some(EventStatus::Published),
            is_public: Some(true),
            awaiting_mod: Some(false),
            ..Default::default()
        };
        let updated = self.store.update(id, patch, event.version).await?;
        info!(event_id = %id, moderator_id = %actor.id, "Event approved");
        Ok(updated)
    }

    /// Moderator sends a confirmed event back to its author: Confirmed ->
    /// Expected. Rejection clears the queue flag rather than leaving the
    /// event confirmed-but-flagged, keeping the awaiting_mod invariant.
    pub async fn reject(&self, id: Uuid, actor: Actor) -> Result<Event, ModerationError> {
        let event = self.store.get(id).await?;
        require_moderator(actor)?;
        require_status(&event, EventStatus::Confirmed)?;

        let patch = EventPatch {
            status: Some(EventStatus::Expected),
            awaiting_mod: Some(false),
            ..Default::default()
        };
        let updated = self.store.update(id, patch, event.version).await?;
        info!(event_id = %id, moderator_id = %actor.id, "Event rejected");
        Ok(updated)
    }
}

fn require_status(event: &Event, expected: EventStatus) -> Result<(), ModerationError> {
    if event.status != expected {
        return Err(ModerationError::PreconditionFailed {
            expected,
            actual: event.status,
        });
    }
    Ok(())
}

fn require_author_or_moderator(event: &Event, actor: Actor) -> Result<(), ModerationError> {
    if actor.id != event.author_id && !actor.is_moderator {
        return Err(ModerationError::Forbidden(
            "only the event author or a moderator may do this".to_string(),
        ));
    }
    Ok(())
}

fn require_moderator(actor: Actor) -> Result<(), ModerationError> {
    if !actor.is_moderator {
        return Err(ModerationError::Forbidden(
            "only a moderator may do this".to_string(),
        ));
    }
    Ok(())
}
