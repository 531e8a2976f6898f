//! Router-level checks: auth middleware, JSON bodies, and status codes,
//! driven through `tower::ServiceExt::oneshot` without a live socket.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use activityhub::web;
use common::*;

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json body")
}

fn json_request(method: &str, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("cookie", cookie)
        .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
        .expect("request")
}

#[tokio::test]
async fn health_needs_no_auth() {
    let pool = test_pool().await;
    let router = web::router(pool);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("status").and_then(Value::as_str), Some("ok"));
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let pool = test_pool().await;
    let router = web::router(pool);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/participations/mine")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_flow_over_http() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let activity_id = seed_published_activity(&pool, "org-1", "volunteer", Some(5)).await;
    let router = web::router(pool);
    let student = access_token_cookie("stu-1", "student");
    let organizer = access_token_cookie("org-1", "organizer");

    // Student registers: 201 with a draft row.
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/participations",
            &student,
            serde_json::json!({ "activity_id": activity_id, "note": "via app" }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json(response).await;
    let participation_id = payload["participation"]["participation_id"]
        .as_str()
        .expect("participation id")
        .to_string();
    assert_eq!(payload["participation"]["status"], "draft");

    // Student submits.
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/participations/{participation_id}/submit"),
            &student,
            serde_json::json!({}),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["participation"]["status"], "pending");

    // Organizer approves in bulk and gets the precise count.
    let response = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/activities/{activity_id}/registrations"),
            &organizer,
            serde_json::json!({
                "participation_ids": [participation_id, "no-such-row"],
                "action": "approve",
            }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.get("updated_count").and_then(Value::as_u64), Some(1));
}

#[tokio::test]
async fn ineligible_registration_maps_to_forbidden() {
    let pool = test_pool().await;
    seed_user(&pool, "stu-1", "student").await;
    let router = web::router(pool);
    let student = access_token_cookie("stu-1", "student");

    let response = router
        .oneshot(json_request(
            "POST",
            "/participations",
            &student,
            serde_json::json!({ "activity_id": "ghost-activity" }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("ineligible")
    );
    assert!(payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("not open for registration"));
}

#[tokio::test]
async fn bad_bulk_action_maps_to_validation_error() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    let activity_id = seed_published_activity(&pool, "org-1", "sports", None).await;
    let router = web::router(pool);
    let organizer = access_token_cookie("org-1", "organizer");

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/activities/{activity_id}/registrations"),
            &organizer,
            serde_json::json!({ "participation_ids": [], "action": "promote" }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("validation")
    );
}

#[tokio::test]
async fn attendance_before_completion_is_a_bad_request() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let activity_id = seed_published_activity(&pool, "org-1", "culture", None).await;
    let p = register_pending(&pool, "stu-1", &activity_id).await;
    let router = web::router(pool);
    let organizer = access_token_cookie("org-1", "organizer");

    let response = router
        .oneshot(json_request(
            "PATCH",
            &format!("/activities/{activity_id}/attendance"),
            &organizer,
            serde_json::json!({ "participation_ids": [p], "status": "present" }),
        ))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("invalid_state")
    );
}

#[tokio::test]
async fn duplicate_complaint_maps_to_conflict() {
    let pool = test_pool().await;
    seed_user(&pool, "org-1", "organizer").await;
    seed_user(&pool, "stu-1", "student").await;
    let activity_id = seed_published_activity(&pool, "org-1", "volunteer", None).await;
    let p = register_pending(&pool, "stu-1", &activity_id).await;
    let router = web::router(pool);
    let student = access_token_cookie("stu-1", "student");

    let body = serde_json::json!({
        "participation_id": p,
        "description": "missing half my points",
    });
    let response = router
        .clone()
        .oneshot(json_request("POST", "/complaints", &student, body.clone()))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(json_request("POST", "/complaints", &student, body))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json(response).await;
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some("duplicate")
    );
}
