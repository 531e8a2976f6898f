use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{ParticipationRow, RegistrationRow};

pub struct NewParticipation<'a> {
    pub participation_id: &'a str,
    pub activity_id: &'a str,
    pub student_user_id: &'a str,
    pub note: Option<&'a str>,
    pub now: &'a str,
}

// Registration admission in a single conditional statement. The activity
// gate, the one-live-row-per-student rule, and the capacity bound are all
// re-checked inside the INSERT itself, so two concurrent registrations can
// never both slip past a stale count. 0 rows affected means the caller must
// consult the eligibility evaluator for the precise refusal reason.
const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO participations (
  participation_id,
  activity_id,
  student_user_id,
  status,
  training_point,
  note,
  created_at,
  updated_at
)
SELECT ?, ?, ?, 'draft', 0, ?, ?, ?
WHERE EXISTS (
    SELECT 1
    FROM activities a
    WHERE a.activity_id = ?
      AND a.status = 'published'
      AND datetime(a.registration_ends_at) >= datetime('now')
  )
  AND NOT EXISTS (
    SELECT 1
    FROM participations p
    WHERE p.activity_id = ?
      AND p.student_user_id = ?
      AND p.status NOT IN ('rejected', 'cancelled')
  )
  AND (
    (SELECT capacity FROM activities WHERE activity_id = ?) IS NULL
    OR (
      SELECT COUNT(*)
      FROM participations p
      WHERE p.activity_id = ?
        AND p.status NOT IN ('rejected', 'cancelled')
    ) < (SELECT capacity FROM activities WHERE activity_id = ?)
  )
"#;

pub async fn insert_registration(
    pool: &SqlitePool,
    p: NewParticipation<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(p.participation_id)
        .bind(p.activity_id)
        .bind(p.student_user_id)
        .bind(p.note)
        .bind(p.now)
        .bind(p.now)
        .bind(p.activity_id)
        .bind(p.activity_id)
        .bind(p.student_user_id)
        .bind(p.activity_id)
        .bind(p.activity_id)
        .bind(p.activity_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_PARTICIPATION: &str = r#"
SELECT
  participation_id,
  activity_id,
  student_user_id,
  status,
  training_point,
  note,
  created_at,
  updated_at
FROM participations
WHERE participation_id = ?
LIMIT 1
"#;

pub async fn load_participation_by_id(
    pool: &SqlitePool,
    participation_id: &str,
) -> sqlx::Result<Option<ParticipationRow>> {
    sqlx::query_as::<_, ParticipationRow>(SQL_LOAD_PARTICIPATION)
        .bind(participation_id)
        .fetch_optional(pool)
        .await
}

// Single-row transitions keep ownership and the legal source state in the
// WHERE clause; 0 rows affected surfaces as an invalid-state error upstream.
const SQL_SUBMIT_DRAFT: &str = r#"
UPDATE participations
SET status = 'pending', updated_at = ?
WHERE participation_id = ?
  AND student_user_id = ?
  AND status = 'draft'
"#;

pub async fn submit_draft(
    pool: &SqlitePool,
    participation_id: &str,
    student_user_id: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SUBMIT_DRAFT)
        .bind(now)
        .bind(participation_id)
        .bind(student_user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_CANCEL: &str = r#"
UPDATE participations
SET status = 'cancelled', updated_at = ?
WHERE participation_id = ?
  AND student_user_id = ?
  AND status IN ('draft', 'pending')
"#;

pub async fn cancel(
    pool: &SqlitePool,
    participation_id: &str,
    student_user_id: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_CANCEL)
        .bind(now)
        .bind(participation_id)
        .bind(student_user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Row handle returned by the bulk operations: exactly the subset of the
/// requested ids that actually transitioned, with the student ids needed
/// for notification fan-out.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AffectedParticipation {
    pub participation_id: String,
    pub student_user_id: String,
}

/// Applies `to` to every requested row that is scoped to the activity and
/// currently in one of `from`. Select-then-update runs inside one
/// transaction, so the reported subset is exactly the set written.
pub async fn bulk_set_status(
    pool: &SqlitePool,
    activity_id: &str,
    participation_ids: &[String],
    from: &[&str],
    to: &str,
    training_point: Option<i64>,
    require_completed_activity: bool,
    now: &str,
) -> sqlx::Result<Vec<AffectedParticipation>> {
    if participation_ids.is_empty() || from.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await?;

    let mut select: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT participation_id, student_user_id FROM participations WHERE activity_id = ",
    );
    select.push_bind(activity_id);
    select.push(" AND status IN (");
    {
        let mut separated = select.separated(", ");
        for status in from {
            separated.push_bind(*status);
        }
    }
    select.push(") AND participation_id IN (");
    {
        let mut separated = select.separated(", ");
        for id in participation_ids {
            separated.push_bind(id.as_str());
        }
    }
    select.push(")");
    if require_completed_activity {
        select.push(" AND EXISTS (SELECT 1 FROM activities a WHERE a.activity_id = ");
        select.push_bind(activity_id);
        select.push(" AND a.status = 'completed')");
    }

    let affected: Vec<AffectedParticipation> = select
        .build_query_as::<AffectedParticipation>()
        .fetch_all(&mut *tx)
        .await?;

    if affected.is_empty() {
        tx.commit().await?;
        return Ok(affected);
    }

    let mut update: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE participations SET status = ");
    update.push_bind(to);
    if let Some(point) = training_point {
        update.push(", training_point = ");
        update.push_bind(point);
    }
    update.push(", updated_at = ");
    update.push_bind(now);
    update.push(" WHERE participation_id IN (");
    {
        let mut separated = update.separated(", ");
        for row in &affected {
            separated.push_bind(row.participation_id.as_str());
        }
    }
    update.push(")");

    update.build().execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(affected)
}

const SQL_LIST_FOR_ACTIVITY: &str = r#"
SELECT
  p.participation_id,
  p.student_user_id,
  u.name AS student_name,
  p.status,
  p.training_point,
  p.note,
  p.created_at
FROM participations p
LEFT JOIN users u ON u.user_id = p.student_user_id
WHERE p.activity_id = ?
  AND p.status != 'draft'
ORDER BY datetime(p.created_at) ASC
"#;

/// Organizer-facing registration list. Draft rows are the student's own
/// unsent registrations and never show up here.
pub async fn list_submitted_for_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_LIST_FOR_ACTIVITY)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_FOR_STUDENT: &str = r#"
SELECT
  participation_id,
  activity_id,
  student_user_id,
  status,
  training_point,
  note,
  created_at,
  updated_at
FROM participations
WHERE student_user_id = ?
ORDER BY datetime(created_at) DESC
"#;

pub async fn list_for_student(
    pool: &SqlitePool,
    student_user_id: &str,
) -> sqlx::Result<Vec<ParticipationRow>> {
    sqlx::query_as::<_, ParticipationRow>(SQL_LIST_FOR_STUDENT)
        .bind(student_user_id)
        .fetch_all(pool)
        .await
}

const SQL_SUM_POINTS_FOR_STUDENT: &str = r#"
SELECT COALESCE(SUM(training_point), 0)
FROM participations
WHERE student_user_id = ?
"#;

pub async fn sum_points_for_student(
    pool: &SqlitePool,
    student_user_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_SUM_POINTS_FOR_STUDENT)
        .bind(student_user_id)
        .fetch_one(pool)
        .await
}

const SQL_COUNT_ACTIVE: &str = r#"
SELECT COUNT(*)
FROM participations
WHERE activity_id = ?
  AND status NOT IN ('rejected', 'cancelled')
"#;

pub async fn count_active_for_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_ACTIVE)
        .bind(activity_id)
        .fetch_one(pool)
        .await
}

const SQL_HAS_ACTIVE_FOR_PAIR: &str = r#"
SELECT COUNT(*)
FROM participations
WHERE activity_id = ?
  AND student_user_id = ?
  AND status NOT IN ('rejected', 'cancelled')
"#;

pub async fn has_active_for_pair(
    pool: &SqlitePool,
    activity_id: &str,
    student_user_id: &str,
) -> sqlx::Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(SQL_HAS_ACTIVE_FOR_PAIR)
        .bind(activity_id)
        .bind(student_user_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

const SQL_SET_TRAINING_POINT: &str = r#"
UPDATE participations
SET training_point = ?, updated_at = ?
WHERE participation_id = ?
"#;

/// Takes a raw connection so complaint resolution can run it inside its own
/// transaction.
pub async fn set_training_point(
    conn: &mut sqlx::SqliteConnection,
    participation_id: &str,
    training_point: i64,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_TRAINING_POINT)
        .bind(training_point)
        .bind(now)
        .bind(participation_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
