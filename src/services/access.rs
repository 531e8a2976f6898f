use sqlx::SqlitePool;

use crate::database::ownership_repo;
use crate::services::error::ServiceError;

// Centralized ownership predicates. Organizer ids always come from the
// authenticated session, never from the request body.

pub async fn ensure_activity_owner(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> Result<(), ServiceError> {
    let owner = ownership_repo::organizer_of_activity(pool, activity_id)
        .await?
        .ok_or(ServiceError::NotFound("activity"))?;
    ensure_is(owner, user_id, "activity")
}

pub async fn ensure_participation_activity_owner(
    pool: &SqlitePool,
    participation_id: &str,
    user_id: &str,
) -> Result<(), ServiceError> {
    let owner = ownership_repo::organizer_of_participation(pool, participation_id)
        .await?
        .ok_or(ServiceError::NotFound("participation"))?;
    ensure_is(owner, user_id, "participation")
}

pub async fn ensure_complaint_activity_owner(
    pool: &SqlitePool,
    complaint_id: &str,
    user_id: &str,
) -> Result<(), ServiceError> {
    let owner = ownership_repo::organizer_of_complaint(pool, complaint_id)
        .await?
        .ok_or(ServiceError::NotFound("complaint"))?;
    ensure_is(owner, user_id, "complaint")
}

fn ensure_is(owner: String, user_id: &str, resource: &str) -> Result<(), ServiceError> {
    if owner == user_id {
        Ok(())
    } else {
        Err(ServiceError::Authorization(format!(
            "you do not organize the activity behind this {resource}"
        )))
    }
}
