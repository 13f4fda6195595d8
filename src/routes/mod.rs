use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    approve_event, calendar_view, confirm_event, create_event, health_check, list_events,
    reject_event, unconfirm_event,
};
use crate::moderation::ModerationService;
use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub moderation: ModerationService,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            moderation: ModerationService::new(store.clone()),
            store,
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id/confirm", post(confirm_event))
        .route("/events/:id/unconfirm", post(unconfirm_event))
        .route("/events/:id/mod/approve", post(approve_event))
        .route("/events/:id/mod/reject", post(reject_event))
        .route("/calendar", get(calendar_view))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
