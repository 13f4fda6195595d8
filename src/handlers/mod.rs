use axum::async_trait;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::actor::Actor;
use crate::models::event::{CreateEventRequest, Event};
use crate::projection::project;
use crate::routes::AppState;
use crate::store::{EventFilter, EventStore};
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_MODERATOR_HEADER: &str = "x-actor-moderator";
const ANTI_FORGERY_HEADER: &str = "x-apollo-token";

/// Actor context resolved by the upstream auth collaborator and forwarded as
/// headers. The core never derives authorization itself.
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("missing actor context".to_string()))?;
        let id = Uuid::parse_str(raw_id)
            .map_err(|_| AppError::AuthError("malformed actor id".to_string()))?;

        let is_moderator = parts
            .headers
            .get(ACTOR_MODERATOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Actor { id, is_moderator })
    }
}

/// Anti-forgery token carried on every mutating request. Opaque to the core;
/// issuance and validation belong to the external auth collaborator, only
/// presence is enforced here.
pub struct AntiForgeryToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AntiForgeryToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(ANTI_FORGERY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::AuthError("missing anti-forgery token".to_string()))?;
        Ok(AntiForgeryToken(token))
    }
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "apollo-events-api",
    };

    success(payload, "Health check successful").into_response()
}

#[derive(Serialize)]
struct EventsPayload {
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let filter = EventFilter {
        date_range: match (query.from, query.to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        },
        status: None,
    };
    let events = state.store.list(&filter).await?;
    Ok(success(EventsPayload { events }, "Events fetched").into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    _token: AntiForgeryToken,
    actor: Actor,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::ValidationError("title must not be empty".to_string()));
    }
    if request.venue.trim().is_empty() {
        return Err(AppError::ValidationError("venue must not be empty".to_string()));
    }
    if let Some(time) = &request.start_time {
        NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
            AppError::ValidationError(format!("startTime '{}' is not HH:MM", time))
        })?;
    }

    state.moderation.create(request, actor).await?;
    Ok(empty_success("Event created").into_response())
}

pub async fn confirm_event(
    State(state): State<AppState>,
    _token: AntiForgeryToken,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.moderation.confirm(id, actor).await?;
    Ok(empty_success("Event confirmed").into_response())
}

pub async fn unconfirm_event(
    State(state): State<AppState>,
    _token: AntiForgeryToken,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.moderation.unconfirm(id, actor).await?;
    Ok(empty_success("Event returned to expected").into_response())
}

pub async fn approve_event(
    State(state): State<AppState>,
    _token: AntiForgeryToken,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.moderation.approve(id, actor).await?;
    Ok(empty_success("Event approved and published").into_response())
}

pub async fn reject_event(
    State(state): State<AppState>,
    _token: AntiForgeryToken,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.moderation.reject(id, actor).await?;
    Ok(empty_success("Event rejected").into_response())
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    date: Option<NaiveDate>,
}

pub async fn calendar_view(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, AppError> {
    let events = state.store.list(&EventFilter::default()).await?;
    let projection = project(&events, query.date);
    Ok(success(projection, "Calendar projection").into_response())
}
