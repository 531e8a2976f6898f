use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::{activity_repo, participation_repo};
use crate::models::{ActivityRow, ActivityStatus};
use crate::services::error::ServiceError;

/// Why a registration attempt is refused. `CapacityFull` is only produced
/// by [`explain_refused_insert`]: the capacity count is not re-checked here
/// because only the guarded insert can do that race-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationBlock {
    ActivityUnavailable,
    RegistrationClosed,
    AlreadyRegistered,
    CapacityFull,
}

impl RegistrationBlock {
    pub fn message(self) -> &'static str {
        match self {
            RegistrationBlock::ActivityUnavailable => {
                "activity does not exist or is not open for registration"
            }
            RegistrationBlock::RegistrationClosed => "the registration window has closed",
            RegistrationBlock::AlreadyRegistered => {
                "you already hold a registration for this activity"
            }
            RegistrationBlock::CapacityFull => "the activity is at capacity",
        }
    }
}

/// Read-only registration check, evaluated in the documented order:
/// published activity, open window, no live registration for the pair.
/// Returns `None` when the student may register.
pub async fn check_registration(
    pool: &SqlitePool,
    student_user_id: &str,
    activity_id: &str,
) -> Result<Option<RegistrationBlock>, ServiceError> {
    let Some(activity) = activity_repo::load_activity_by_id(pool, activity_id).await? else {
        return Ok(Some(RegistrationBlock::ActivityUnavailable));
    };
    if activity.status_parsed() != Some(ActivityStatus::Published) {
        return Ok(Some(RegistrationBlock::ActivityUnavailable));
    }
    if !registration_window_open(&activity, Utc::now()) {
        return Ok(Some(RegistrationBlock::RegistrationClosed));
    }
    if participation_repo::has_active_for_pair(pool, activity_id, student_user_id).await? {
        return Ok(Some(RegistrationBlock::AlreadyRegistered));
    }
    Ok(None)
}

/// The guarded insert reported 0 rows: re-run the readable checks to name
/// the reason. If they all pass, the seat count was the blocker.
pub async fn explain_refused_insert(
    pool: &SqlitePool,
    student_user_id: &str,
    activity_id: &str,
) -> Result<RegistrationBlock, ServiceError> {
    Ok(check_registration(pool, student_user_id, activity_id)
        .await?
        .unwrap_or(RegistrationBlock::CapacityFull))
}

pub fn registration_window_open(activity: &ActivityRow, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(&activity.registration_ends_at) {
        Ok(ends_at) => now <= ends_at.with_timezone(&Utc),
        // An unparseable deadline never admits anyone.
        Err(_) => false,
    }
}

/// Same-category suggestions offered to a student whose registration was
/// refused. Purely advisory; not part of the lifecycle contract.
pub async fn list_alternatives(
    pool: &SqlitePool,
    activity_id: &str,
    limit: i64,
) -> Result<Vec<ActivityRow>, ServiceError> {
    Ok(activity_repo::list_same_category_alternatives(pool, activity_id, limit).await?)
}
