use chrono::DateTime;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::activity_repo;
use crate::models::{ActivityCategory, ActivityRow, ActivityStatus, UserRole};
use crate::services::error::ServiceError;
use crate::services::{access, now_rfc3339};

const CATEGORY_CHOICES: &str = "volunteer, academic, career, sports, culture, other";

pub struct NewActivityInput<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub capacity: Option<i64>,
    pub registration_starts_at: &'a str,
    pub registration_ends_at: &'a str,
    pub starts_at: &'a str,
    pub ends_at: &'a str,
}

pub async fn create_activity(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    input: NewActivityInput<'_>,
) -> Result<ActivityRow, ServiceError> {
    if role != UserRole::Organizer {
        return Err(ServiceError::wrong_role(UserRole::Organizer));
    }
    let title = input.title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    if ActivityCategory::parse(input.category) == ActivityCategory::Other
        && input.category != "other"
    {
        return Err(ServiceError::Validation(format!(
            "category must be one of: {CATEGORY_CHOICES}"
        )));
    }
    if let Some(capacity) = input.capacity {
        if capacity < 1 {
            return Err(ServiceError::Validation(
                "capacity must be at least 1 when set".to_string(),
            ));
        }
    }
    parse_window(
        input.registration_starts_at,
        input.registration_ends_at,
        "registration",
    )?;
    parse_window(input.starts_at, input.ends_at, "event")?;

    let activity_id = Uuid::new_v4().to_string();
    let now = now_rfc3339();
    activity_repo::insert_activity(
        pool,
        activity_repo::NewActivity {
            activity_id: &activity_id,
            organizer_user_id: user_id,
            title,
            description: input.description,
            category: input.category,
            capacity: input.capacity,
            registration_starts_at: input.registration_starts_at,
            registration_ends_at: input.registration_ends_at,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            now: &now,
        },
    )
    .await?;

    activity_repo::load_activity_by_id(pool, &activity_id)
        .await?
        .ok_or(ServiceError::NotFound("activity"))
}

pub async fn publish_activity(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> Result<ActivityRow, ServiceError> {
    transition_activity(
        pool,
        user_id,
        activity_id,
        ActivityStatus::Draft,
        ActivityStatus::Published,
        "only a draft activity can be published",
    )
    .await
}

pub async fn complete_activity(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> Result<ActivityRow, ServiceError> {
    transition_activity(
        pool,
        user_id,
        activity_id,
        ActivityStatus::Published,
        ActivityStatus::Completed,
        "only a published activity can be completed",
    )
    .await
}

async fn transition_activity(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
    from: ActivityStatus,
    to: ActivityStatus,
    refusal: &str,
) -> Result<ActivityRow, ServiceError> {
    access::ensure_activity_owner(pool, activity_id, user_id).await?;
    let now = now_rfc3339();
    let updated =
        activity_repo::set_activity_status(pool, activity_id, from.as_str(), to.as_str(), &now)
            .await?;
    if updated == 0 {
        return Err(ServiceError::InvalidState(refusal.to_string()));
    }
    activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ServiceError::NotFound("activity"))
}

pub async fn list_published(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<ActivityRow>, ServiceError> {
    Ok(activity_repo::list_published(pool, limit).await?)
}

fn parse_window(
    starts_at: &str,
    ends_at: &str,
    label: &str,
) -> Result<(), ServiceError> {
    let start = DateTime::parse_from_rfc3339(starts_at).map_err(|_| {
        ServiceError::Validation(format!("{label} window start must be an RFC 3339 timestamp"))
    })?;
    let end = DateTime::parse_from_rfc3339(ends_at).map_err(|_| {
        ServiceError::Validation(format!("{label} window end must be an RFC 3339 timestamp"))
    })?;
    if start > end {
        return Err(ServiceError::Validation(format!(
            "{label} window start must not be after its end"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_validation_checks_order_and_format() {
        assert!(parse_window("2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z", "x").is_ok());
        assert!(parse_window("2026-02-01T00:00:00Z", "2026-01-01T00:00:00Z", "x").is_err());
        assert!(parse_window("yesterday", "2026-01-01T00:00:00Z", "x").is_err());
    }
}
