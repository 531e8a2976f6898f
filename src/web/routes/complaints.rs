use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::services::complaint_service;
use crate::services::error::ServiceError;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct CreateComplaintBody {
    pub participation_id: String,
    pub description: String,
}

pub async fn create_complaint_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateComplaintBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let complaint = complaint_service::submit_complaint(
        &pool,
        &auth_user.id,
        auth_user.role,
        &body.participation_id,
        &body.description,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(json!({ "complaint": complaint }))))
}

#[derive(Debug, Deserialize)]
pub struct ResolveComplaintBody {
    pub status: String, // approved|rejected
    pub response: String,
    pub new_point: Option<i64>,
}

pub async fn resolve_complaint_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(complaint_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<ResolveComplaintBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let complaint = complaint_service::resolve_complaint(
        &pool,
        &auth_user.id,
        auth_user.role,
        &complaint_id,
        &body.status,
        &body.response,
        body.new_point,
    )
    .await?;
    Ok(Json(json!({ "complaint": complaint })))
}

pub async fn my_complaints_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, ServiceError> {
    let complaints = complaint_service::list_mine(&pool, &auth_user.id).await?;
    Ok(Json(json!({ "complaints": complaints })))
}
