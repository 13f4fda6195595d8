//! Integration tests for the moderation API endpoints.
//!
//! Runs the full router against the in-memory event store: creation,
//! the confirm/unconfirm/approve/reject transitions, the calendar
//! projection endpoint, and the auth-context failure paths.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use apollo_events_server::routes::{create_routes, AppState};
use apollo_events_server::store::InMemoryEventStore;

fn setup_app() -> axum::Router {
    let store = Arc::new(InMemoryEventStore::new());
    create_routes(AppState::new(store))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, actor_id: Uuid, moderator: bool, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Apollo-Token", "test-token")
        .header("X-Actor-Id", actor_id.to_string())
        .header("X-Actor-Moderator", if moderator { "1" } else { "0" });

    match body {
        Some(value) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn create_body() -> Value {
    json!({
        "title": "Roda de Samba",
        "startDate": "2026-09-12",
        "startTime": "20:00",
        "venue": "Pedra do Sal",
        "lat": -22.8968,
        "lng": -43.1829
    })
}

/// Creates an event through the API and returns its id.
async fn create_event(app: &axum::Router, author: Uuid) -> Uuid {
    let response = app
        .clone()
        .oneshot(post("/events", author, false, Some(create_body())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/events")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let id = body["data"]["events"][0]["id"].as_str().unwrap().to_string();
    id.parse().unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["service"], "apollo-events-api");
}

#[tokio::test]
async fn full_moderation_lifecycle_over_http() {
    let app = setup_app();
    let author = Uuid::new_v4();
    let moderator = Uuid::new_v4();

    let id = create_event(&app, author).await;

    let response = app
        .clone()
        .oneshot(post(&format!("/events/{}/confirm", id), author, false, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({ "success": true, "message": "Event confirmed" }));

    let response = app
        .clone()
        .oneshot(post(
            &format!("/events/{}/mod/approve", id),
            moderator,
            true,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/events")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let event = &body["data"]["events"][0];
    assert_eq!(event["status"], "published");
    assert_eq!(event["isPublic"], true);
    assert_eq!(event["awaitingMod"], false);
}

#[tokio::test]
async fn reject_returns_event_to_expected() {
    let app = setup_app();
    let author = Uuid::new_v4();
    let moderator = Uuid::new_v4();

    let id = create_event(&app, author).await;
    app.clone()
        .oneshot(post(&format!("/events/{}/confirm", id), author, false, None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post(
            &format!("/events/{}/mod/reject", id),
            moderator,
            true,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/events")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    let event = &body["data"]["events"][0];
    assert_eq!(event["status"], "expected");
    assert_eq!(event["awaitingMod"], false);
}

#[tokio::test]
async fn approve_by_non_moderator_is_forbidden() {
    let app = setup_app();
    let author = Uuid::new_v4();

    let id = create_event(&app, author).await;
    app.clone()
        .oneshot(post(&format!("/events/{}/confirm", id), author, false, None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post(
            &format!("/events/{}/mod/approve", id),
            author,
            false,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn unconfirm_published_event_is_a_precondition_failure() {
    let app = setup_app();
    let author = Uuid::new_v4();
    let moderator = Uuid::new_v4();

    let id = create_event(&app, author).await;
    app.clone()
        .oneshot(post(&format!("/events/{}/confirm", id), author, false, None))
        .await
        .unwrap();
    app.clone()
        .oneshot(post(
            &format!("/events/{}/mod/approve", id),
            moderator,
            true,
            None,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post(
            &format!("/events/{}/unconfirm", id),
            moderator,
            true,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "PRECONDITION_FAILED");
}

#[tokio::test]
async fn transition_on_unknown_event_is_not_found() {
    let app = setup_app();

    let response = app
        .oneshot(post(
            &format!("/events/{}/confirm", Uuid::new_v4()),
            Uuid::new_v4(),
            true,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutating_request_without_token_is_rejected() {
    let app = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/events/{}/confirm", Uuid::new_v4()))
        .header("X-Actor-Id", Uuid::new_v4().to_string())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_without_actor_context_is_rejected() {
    let app = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/events")
        .header("X-Apollo-Token", "test-token")
        .header("Content-Type", "application/json")
        .body(Body::from(create_body().to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_rejects_malformed_start_time() {
    let app = setup_app();
    let mut body = create_body();
    body["startTime"] = json!("late evening");

    let response = app
        .oneshot(post("/events", Uuid::new_v4(), false, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn calendar_endpoint_projects_markers_and_ordering() {
    let app = setup_app();
    let author = Uuid::new_v4();
    let moderator = Uuid::new_v4();

    // One published event with coordinates, one expected without.
    let id = create_event(&app, author).await;
    app.clone()
        .oneshot(post(&format!("/events/{}/confirm", id), author, false, None))
        .await
        .unwrap();
    app.clone()
        .oneshot(post(
            &format!("/events/{}/mod/approve", id),
            moderator,
            true,
            None,
        ))
        .await
        .unwrap();

    let mut second = create_body();
    second["title"] = json!("Feira do Lavradio");
    second["startDate"] = json!("2026-09-20");
    second.as_object_mut().unwrap().remove("lat");
    second.as_object_mut().unwrap().remove("lng");
    app.clone()
        .oneshot(post("/events", author, false, Some(second)))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/calendar")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let data = &body["data"];

    let markers = data["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["color"], "blue");
    assert_eq!(markers[0]["radius"], 8);

    let ordered = data["ordered"].as_array().unwrap();
    assert_eq!(ordered.len(), 2);
    assert_eq!(ordered[0]["status"], "published");
    assert_eq!(ordered[1]["status"], "expected");

    assert_eq!(data["byDate"].as_object().unwrap().len(), 2);

    // Filtering to one day narrows the list but not the markers.
    let response = app.oneshot(get("/calendar?date=2026-09-20")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["ordered"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["markers"].as_array().unwrap().len(), 1);
}
