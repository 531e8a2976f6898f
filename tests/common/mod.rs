#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use activityhub::database::{schema, user_repo};
use activityhub::models::UserRole;
use activityhub::services::{activity_service, participation_service};

/// In-memory database per test. A single connection keeps every statement
/// on the same database handle.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    schema::ensure_schema(&pool).await.expect("schema");
    pool
}

pub fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub async fn seed_user(pool: &SqlitePool, user_id: &str, role: &str) {
    user_repo::insert_user(
        pool,
        user_repo::NewUser {
            user_id,
            name: user_id,
            role,
        },
    )
    .await
    .expect("seed user");
}

pub async fn seed_published_activity(
    pool: &SqlitePool,
    organizer: &str,
    category: &str,
    capacity: Option<i64>,
) -> String {
    let activity = activity_service::create_activity(
        pool,
        organizer,
        UserRole::Organizer,
        activity_service::NewActivityInput {
            title: "Campus cleanup",
            description: Some("Bring gloves"),
            category,
            capacity,
            registration_starts_at: &days_from_now(-1),
            registration_ends_at: &days_from_now(14),
            starts_at: &days_from_now(21),
            ends_at: &days_from_now(21),
        },
    )
    .await
    .expect("create activity");
    activity_service::publish_activity(pool, organizer, &activity.activity_id)
        .await
        .expect("publish activity");
    activity.activity_id
}

/// Registers and submits, leaving the participation Pending.
pub async fn register_pending(pool: &SqlitePool, student: &str, activity_id: &str) -> String {
    let participation =
        participation_service::register(pool, student, UserRole::Student, activity_id, None)
            .await
            .expect("register");
    participation_service::submit(pool, student, UserRole::Student, &participation.participation_id)
        .await
        .expect("submit");
    participation.participation_id
}

/// Unsigned token in the same shape the identity provider issues; the
/// middleware only reads the payload segment.
pub fn access_token_cookie(user_id: &str, role: &str) -> String {
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "sub": user_id, "role": role }).to_string(),
    );
    format!("access_token=eyJhbGciOiJIUzI1NiJ9.{payload}.c2ln")
}
