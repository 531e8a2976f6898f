use axum::{
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

pub mod middleware;
pub mod routes;

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The full application router. Split out of main so router tests can drive
/// it with `tower::ServiceExt::oneshot`.
pub fn router(pool: SqlitePool) -> Router {
    let protected_routes = Router::new()
        .route(
            "/activities",
            get(routes::activities::list_activities_handler)
                .post(routes::activities::create_activity_handler),
        )
        .route(
            "/activities/:activity_id/publish",
            post(routes::activities::publish_activity_handler),
        )
        .route(
            "/activities/:activity_id/complete",
            post(routes::activities::complete_activity_handler),
        )
        .route(
            "/activities/:activity_id/alternatives",
            get(routes::activities::alternatives_handler),
        )
        .route(
            "/activities/:activity_id/registrations",
            get(routes::activities::list_registrations_handler)
                .patch(routes::activities::review_registrations_handler),
        )
        .route(
            "/activities/:activity_id/attendance",
            patch(routes::activities::confirm_attendance_handler),
        )
        .route(
            "/activities/:activity_id/complaints",
            get(routes::activities::list_activity_complaints_handler),
        )
        .route(
            "/participations",
            post(routes::participations::create_participation_handler),
        )
        .route(
            "/participations/mine",
            get(routes::participations::my_participations_handler),
        )
        .route(
            "/participations/:participation_id/submit",
            post(routes::participations::submit_participation_handler),
        )
        .route(
            "/participations/:participation_id",
            delete(routes::participations::cancel_participation_handler),
        )
        .route(
            "/complaints",
            post(routes::complaints::create_complaint_handler),
        )
        .route(
            "/complaints/mine",
            get(routes::complaints::my_complaints_handler),
        )
        .route(
            "/complaints/:complaint_id",
            patch(routes::complaints::resolve_complaint_handler),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected_routes)
        .with_state(pool)
}
