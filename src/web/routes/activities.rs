use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::services::error::ServiceError;
use crate::services::{
    activity_service, complaint_service, eligibility_service, participation_service,
};
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CreateActivityBody {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub capacity: Option<i64>,
    pub registration_starts_at: String,
    pub registration_ends_at: String,
    pub starts_at: String,
    pub ends_at: String,
}

pub async fn create_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateActivityBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let activity = activity_service::create_activity(
        &pool,
        &auth_user.id,
        auth_user.role,
        activity_service::NewActivityInput {
            title: &body.title,
            description: body.description.as_deref(),
            category: &body.category,
            capacity: body.capacity,
            registration_starts_at: &body.registration_starts_at,
            registration_ends_at: &body.registration_ends_at,
            starts_at: &body.starts_at,
            ends_at: &body.ends_at,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(json!({ "activity": activity }))))
}

pub async fn publish_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let activity = activity_service::publish_activity(&pool, &auth_user.id, &activity_id).await?;
    Ok(Json(json!({ "activity": activity })))
}

pub async fn complete_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let activity = activity_service::complete_activity(&pool, &auth_user.id, &activity_id).await?;
    Ok(Json(json!({ "activity": activity })))
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub async fn list_activities_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let activities =
        activity_service::list_published(&pool, query.limit.unwrap_or(50)).await?;
    Ok(Json(json!({ "activities": activities })))
}

pub async fn alternatives_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    Query(query): Query<ListQuery>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let activities =
        eligibility_service::list_alternatives(&pool, &activity_id, query.limit.unwrap_or(10))
            .await?;
    Ok(Json(json!({ "activities": activities })))
}

pub async fn list_registrations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let registrations =
        participation_service::list_registrations(&pool, &auth_user.id, &activity_id).await?;
    Ok(Json(json!({ "registrations": registrations })))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRegistrationsBody {
    pub participation_ids: Vec<String>,
    pub action: String, // approve|reject
}

pub async fn review_registrations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<ReviewRegistrationsBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated_count = participation_service::bulk_review(
        &pool,
        &auth_user.id,
        auth_user.role,
        &activity_id,
        &body.participation_ids,
        &body.action,
    )
    .await?;
    Ok(Json(json!({ "updated_count": updated_count })))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmAttendanceBody {
    pub participation_ids: Vec<String>,
    pub status: String, // present|absent
}

pub async fn confirm_attendance_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<ConfirmAttendanceBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let outcome = participation_service::confirm_attendance(
        &pool,
        &auth_user.id,
        auth_user.role,
        &activity_id,
        &body.participation_ids,
        &body.status,
    )
    .await?;
    Ok(Json(json!({
        "updated_count": outcome.updated_count,
        "point_awarded": outcome.point_awarded,
    })))
}

pub async fn list_activity_complaints_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let complaints =
        complaint_service::list_for_activity(&pool, &auth_user.id, &activity_id).await?;
    Ok(Json(json!({ "complaints": complaints })))
}
