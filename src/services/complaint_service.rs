use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{complaint_repo, participation_repo};
use crate::models::{ComplaintRow, ComplaintStatus, UserRole};
use crate::services::error::ServiceError;
use crate::services::{access, notify_service, now_rfc3339, points};

/// Student files a dispute over an awarded point. One pending complaint per
/// (participation, description); the duplicate guard is in the insert.
pub async fn submit_complaint(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    participation_id: &str,
    description: &str,
) -> Result<ComplaintRow, ServiceError> {
    if role != UserRole::Student {
        return Err(ServiceError::wrong_role(UserRole::Student));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(ServiceError::Validation(
            "description must not be empty".to_string(),
        ));
    }

    let participation = participation_repo::load_participation_by_id(pool, participation_id)
        .await?
        .ok_or(ServiceError::NotFound("participation"))?;
    if participation.student_user_id != user_id {
        return Err(ServiceError::Authorization(
            "this registration belongs to another student".to_string(),
        ));
    }

    let complaint_id = Uuid::new_v4().to_string();
    let now = now_rfc3339();
    let inserted = complaint_repo::insert_complaint(
        pool,
        complaint_repo::NewComplaint {
            complaint_id: &complaint_id,
            participation_id,
            description,
            now: &now,
        },
    )
    .await?;
    if inserted == 0 {
        return Err(ServiceError::Duplicate(
            "an identical complaint is already pending for this participation".to_string(),
        ));
    }

    complaint_repo::load_complaint_by_id(pool, &complaint_id)
        .await?
        .ok_or(ServiceError::NotFound("complaint"))
}

/// Organizer resolves a pending complaint. Approving requires a bounded
/// replacement point and rewrites the participation's training point in the
/// same transaction; rejecting leaves the point untouched. The response
/// text is the audit trail.
pub async fn resolve_complaint(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    complaint_id: &str,
    status: &str,
    response: &str,
    new_point: Option<i64>,
) -> Result<ComplaintRow, ServiceError> {
    if role != UserRole::Organizer {
        return Err(ServiceError::wrong_role(UserRole::Organizer));
    }
    let verdict = match ComplaintStatus::parse(status) {
        Some(v) if v.is_terminal() => v,
        _ => {
            return Err(ServiceError::Validation(
                "status must be approved or rejected".to_string(),
            ))
        }
    };
    let response = response.trim();
    if response.is_empty() {
        return Err(ServiceError::Validation(
            "response must not be empty".to_string(),
        ));
    }
    let point_override = match verdict {
        ComplaintStatus::Approved => {
            let point = new_point.ok_or_else(|| {
                ServiceError::Validation("new_point is required when approving".to_string())
            })?;
            if !(points::MIN_TRAINING_POINT..=points::MAX_TRAINING_POINT).contains(&point) {
                return Err(ServiceError::Validation(format!(
                    "new_point must be between {} and {}",
                    points::MIN_TRAINING_POINT,
                    points::MAX_TRAINING_POINT
                )));
            }
            Some(point)
        }
        _ => None,
    };

    // Ownership is re-derived server-side from the complaint itself.
    access::ensure_complaint_activity_owner(pool, complaint_id, user_id).await?;

    let complaint = complaint_repo::load_complaint_by_id(pool, complaint_id)
        .await?
        .ok_or(ServiceError::NotFound("complaint"))?;
    let current = complaint.status_parsed().ok_or_else(|| {
        ServiceError::InvalidState(format!("complaint has unknown status {}", complaint.status))
    })?;
    current
        .resolve(verdict)
        .map_err(|err| ServiceError::InvalidState(err.to_string()))?;

    let now = now_rfc3339();
    let updated = complaint_repo::resolve_complaint(
        pool,
        complaint_id,
        &complaint.participation_id,
        verdict.as_str(),
        response,
        point_override,
        &now,
    )
    .await?;
    if updated == 0 {
        return Err(ServiceError::InvalidState(
            "complaint was already resolved".to_string(),
        ));
    }

    if let Ok(Some(participation)) =
        participation_repo::load_participation_by_id(pool, &complaint.participation_id).await
    {
        notify_service::dispatch(vec![notify_service::Notification {
            to_user_id: participation.student_user_id.clone(),
            title: format!("Complaint {verdict}"),
            message: format!("Your complaint was {verdict}: {response}"),
        }]);
    }

    complaint_repo::load_complaint_by_id(pool, complaint_id)
        .await?
        .ok_or(ServiceError::NotFound("complaint"))
}

pub async fn list_for_activity(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> Result<Vec<ComplaintRow>, ServiceError> {
    access::ensure_activity_owner(pool, activity_id, user_id).await?;
    Ok(complaint_repo::list_for_activity(pool, activity_id).await?)
}

pub async fn list_mine(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ComplaintRow>, ServiceError> {
    Ok(complaint_repo::list_for_student(pool, user_id).await?)
}
