use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{activity_repo, participation_repo};
use crate::models::{
    ActivityRow, ActivityStatus, ParticipationAction, ParticipationRow, ParticipationStatus,
    RegistrationRow, UserRole,
};
use crate::services::error::ServiceError;
use crate::services::{access, eligibility_service, notify_service, now_rfc3339, points};

/// Starts a registration as a Draft row. The admission itself happens in
/// one conditional insert; on refusal the eligibility evaluator is
/// consulted for the human-readable reason.
pub async fn register(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    activity_id: &str,
    note: Option<&str>,
) -> Result<ParticipationRow, ServiceError> {
    if role != UserRole::Student {
        return Err(ServiceError::wrong_role(UserRole::Student));
    }

    let participation_id = Uuid::new_v4().to_string();
    let now = now_rfc3339();
    let inserted = participation_repo::insert_registration(
        pool,
        participation_repo::NewParticipation {
            participation_id: &participation_id,
            activity_id,
            student_user_id: user_id,
            note,
            now: &now,
        },
    )
    .await?;

    if inserted == 0 {
        let block = eligibility_service::explain_refused_insert(pool, user_id, activity_id).await?;
        return Err(ServiceError::Ineligible(block.message().to_string()));
    }

    participation_repo::load_participation_by_id(pool, &participation_id)
        .await?
        .ok_or(ServiceError::NotFound("participation"))
}

pub async fn submit(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    participation_id: &str,
) -> Result<ParticipationRow, ServiceError> {
    let row = load_owned_by_student(pool, user_id, participation_id).await?;
    apply_guard(pool, &row, ParticipationAction::Submit, role).await?;

    let now = now_rfc3339();
    let updated = participation_repo::submit_draft(pool, participation_id, user_id, &now).await?;
    if updated == 0 {
        return Err(ServiceError::InvalidState(
            "participation is no longer a draft".to_string(),
        ));
    }

    participation_repo::load_participation_by_id(pool, participation_id)
        .await?
        .ok_or(ServiceError::NotFound("participation"))
}

pub async fn cancel(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    participation_id: &str,
) -> Result<ParticipationRow, ServiceError> {
    let row = load_owned_by_student(pool, user_id, participation_id).await?;
    apply_guard(pool, &row, ParticipationAction::Cancel, role).await?;

    let now = now_rfc3339();
    let updated = participation_repo::cancel(pool, participation_id, user_id, &now).await?;
    if updated == 0 {
        return Err(ServiceError::InvalidState(
            "only a draft or pending registration can be cancelled".to_string(),
        ));
    }

    participation_repo::load_participation_by_id(pool, participation_id)
        .await?
        .ok_or(ServiceError::NotFound("participation"))
}

/// Bulk approve/reject. Requested ids that are not pending rows of this
/// activity simply drop out of the batch; the returned count is the number
/// of rows actually written.
pub async fn bulk_review(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    activity_id: &str,
    participation_ids: &[String],
    action: &str,
) -> Result<u64, ServiceError> {
    if role != UserRole::Organizer {
        return Err(ServiceError::wrong_role(UserRole::Organizer));
    }
    let action = match action {
        "approve" => ParticipationAction::Approve,
        "reject" => ParticipationAction::Reject,
        _ => {
            return Err(ServiceError::Validation(
                "action must be approve or reject".to_string(),
            ))
        }
    };
    access::ensure_activity_owner(pool, activity_id, user_id).await?;
    let activity = activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ServiceError::NotFound("activity"))?;

    let now = now_rfc3339();
    let affected = participation_repo::bulk_set_status(
        pool,
        activity_id,
        participation_ids,
        &source_status_strs(action),
        action.target_state().as_str(),
        None,
        false,
        &now,
    )
    .await?;

    let verdict = match action {
        ParticipationAction::Approve => "approved",
        _ => "rejected",
    };
    notify_service::dispatch(
        affected
            .iter()
            .map(|row| notify_service::Notification {
                to_user_id: row.student_user_id.clone(),
                title: format!("Registration {verdict}"),
                message: format!("Your registration for \"{}\" was {verdict}.", activity.title),
            })
            .collect(),
    );

    Ok(affected.len() as u64)
}

/// Bulk attendance confirmation. Only legal once the activity is completed;
/// Present stores the category default point with the status in one write,
/// Absent resets the point to 0.
pub async fn confirm_attendance(
    pool: &SqlitePool,
    user_id: &str,
    role: UserRole,
    activity_id: &str,
    participation_ids: &[String],
    status: &str,
) -> Result<AttendanceOutcome, ServiceError> {
    if role != UserRole::Organizer {
        return Err(ServiceError::wrong_role(UserRole::Organizer));
    }
    let action = match status {
        "present" => ParticipationAction::MarkPresent,
        "absent" => ParticipationAction::MarkAbsent,
        _ => {
            return Err(ServiceError::Validation(
                "status must be present or absent".to_string(),
            ))
        }
    };
    access::ensure_activity_owner(pool, activity_id, user_id).await?;
    let activity = activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ServiceError::NotFound("activity"))?;
    if activity.status_parsed() != Some(ActivityStatus::Completed) {
        return Err(ServiceError::InvalidState(format!(
            "attendance can only be confirmed for a completed activity (currently {})",
            activity.status
        )));
    }

    let point_awarded = match action {
        ParticipationAction::MarkPresent => points::default_points(activity.category_parsed()),
        _ => 0,
    };

    let now = now_rfc3339();
    // The completed gate is repeated inside the statement so the check and
    // the write cannot straddle a concurrent status change.
    let affected = participation_repo::bulk_set_status(
        pool,
        activity_id,
        participation_ids,
        &source_status_strs(action),
        action.target_state().as_str(),
        Some(point_awarded),
        true,
        &now,
    )
    .await?;

    let label = match action {
        ParticipationAction::MarkPresent => "present",
        _ => "absent",
    };
    notify_service::dispatch(
        affected
            .iter()
            .map(|row| notify_service::Notification {
                to_user_id: row.student_user_id.clone(),
                title: "Attendance recorded".to_string(),
                message: format!(
                    "You were marked {label} for \"{}\" ({point_awarded} training points).",
                    activity.title
                ),
            })
            .collect(),
    );

    Ok(AttendanceOutcome {
        updated_count: affected.len() as u64,
        point_awarded,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct AttendanceOutcome {
    pub updated_count: u64,
    pub point_awarded: i64,
}

pub async fn list_registrations(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> Result<Vec<RegistrationRow>, ServiceError> {
    access::ensure_activity_owner(pool, activity_id, user_id).await?;
    Ok(participation_repo::list_submitted_for_activity(pool, activity_id).await?)
}

pub struct StudentLedger {
    pub participations: Vec<ParticipationRow>,
    pub total_points: i64,
}

pub async fn student_ledger(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<StudentLedger, ServiceError> {
    let participations = participation_repo::list_for_student(pool, user_id).await?;
    let total_points = participation_repo::sum_points_for_student(pool, user_id).await?;
    Ok(StudentLedger {
        participations,
        total_points,
    })
}

fn source_status_strs(action: ParticipationAction) -> Vec<&'static str> {
    action
        .source_states()
        .iter()
        .map(|s| s.as_str())
        .collect()
}

async fn load_owned_by_student(
    pool: &SqlitePool,
    user_id: &str,
    participation_id: &str,
) -> Result<ParticipationRow, ServiceError> {
    let row = participation_repo::load_participation_by_id(pool, participation_id)
        .await?
        .ok_or(ServiceError::NotFound("participation"))?;
    if row.student_user_id != user_id {
        return Err(ServiceError::Authorization(
            "this registration belongs to another student".to_string(),
        ));
    }
    Ok(row)
}

/// Runs the typed transition check against the current row before issuing
/// the guarded update, so callers get the precise refusal instead of a
/// bare 0-rows-affected.
async fn apply_guard(
    pool: &SqlitePool,
    row: &ParticipationRow,
    action: ParticipationAction,
    role: UserRole,
) -> Result<ParticipationStatus, ServiceError> {
    let current = row.status_parsed().ok_or_else(|| {
        ServiceError::InvalidState(format!("participation has unknown status {}", row.status))
    })?;
    let activity_status = activity_status_of(pool, &row.activity_id).await?;
    Ok(current.apply(action, role, activity_status)?)
}

async fn activity_status_of(
    pool: &SqlitePool,
    activity_id: &str,
) -> Result<ActivityStatus, ServiceError> {
    let activity: ActivityRow = activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(ServiceError::NotFound("activity"))?;
    activity.status_parsed().ok_or_else(|| {
        ServiceError::InvalidState(format!("activity has unknown status {}", activity.status))
    })
}
