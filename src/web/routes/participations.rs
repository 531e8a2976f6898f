use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::services::error::ServiceError;
use crate::services::participation_service;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CreateParticipationBody {
    pub activity_id: String,
    pub note: Option<String>,
}

pub async fn create_participation_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateParticipationBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let participation = participation_service::register(
        &pool,
        &auth_user.id,
        auth_user.role,
        &body.activity_id,
        body.note.as_deref(),
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "participation": participation })),
    ))
}

pub async fn submit_participation_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(participation_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let participation =
        participation_service::submit(&pool, &auth_user.id, auth_user.role, &participation_id)
            .await?;
    Ok(Json(json!({ "participation": participation })))
}

pub async fn cancel_participation_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(participation_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let participation =
        participation_service::cancel(&pool, &auth_user.id, auth_user.role, &participation_id)
            .await?;
    Ok(Json(json!({ "participation": participation })))
}

pub async fn my_participations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let ledger = participation_service::student_ledger(&pool, &auth_user.id).await?;
    Ok(Json(json!({
        "participations": ledger.participations,
        "total_points": ledger.total_points,
    })))
}
