use sqlx::SqlitePool;

use crate::database::participation_repo;
use crate::models::ComplaintRow;

pub struct NewComplaint<'a> {
    pub complaint_id: &'a str,
    pub participation_id: &'a str,
    pub description: &'a str,
    pub now: &'a str,
}

// Duplicate guard lives in the statement: a second identical pending
// complaint on the same participation inserts 0 rows.
const SQL_INSERT_COMPLAINT: &str = r#"
INSERT INTO complaints (
  complaint_id,
  participation_id,
  description,
  status,
  created_at
)
SELECT ?, ?, ?, 'pending', ?
WHERE NOT EXISTS (
  SELECT 1
  FROM complaints c
  WHERE c.participation_id = ?
    AND c.description = ?
    AND c.status = 'pending'
)
"#;

pub async fn insert_complaint(pool: &SqlitePool, c: NewComplaint<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_COMPLAINT)
        .bind(c.complaint_id)
        .bind(c.participation_id)
        .bind(c.description)
        .bind(c.now)
        .bind(c.participation_id)
        .bind(c.description)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_COMPLAINT: &str = r#"
SELECT
  complaint_id,
  participation_id,
  description,
  status,
  response,
  created_at,
  resolved_at
FROM complaints
WHERE complaint_id = ?
LIMIT 1
"#;

pub async fn load_complaint_by_id(
    pool: &SqlitePool,
    complaint_id: &str,
) -> sqlx::Result<Option<ComplaintRow>> {
    sqlx::query_as::<_, ComplaintRow>(SQL_LOAD_COMPLAINT)
        .bind(complaint_id)
        .fetch_optional(pool)
        .await
}

const SQL_RESOLVE_COMPLAINT: &str = r#"
UPDATE complaints
SET status = ?, response = ?, resolved_at = ?
WHERE complaint_id = ?
  AND status = 'pending'
"#;

/// Marks the complaint resolved and, on approval, rewrites the parent
/// participation's training point in the same transaction. Returns the
/// number of complaint rows updated: 0 means it was already resolved (or
/// gone) and nothing was written.
pub async fn resolve_complaint(
    pool: &SqlitePool,
    complaint_id: &str,
    participation_id: &str,
    verdict: &str,
    response: &str,
    new_point: Option<i64>,
    now: &str,
) -> sqlx::Result<u64> {
    let mut tx = pool.begin().await?;

    let res = sqlx::query(SQL_RESOLVE_COMPLAINT)
        .bind(verdict)
        .bind(response)
        .bind(now)
        .bind(complaint_id)
        .execute(&mut *tx)
        .await?;

    let updated = res.rows_affected();
    if updated > 0 {
        if let Some(point) = new_point {
            participation_repo::set_training_point(&mut *tx, participation_id, point, now).await?;
        }
    }

    tx.commit().await?;
    Ok(updated)
}

const SQL_LIST_FOR_ACTIVITY: &str = r#"
SELECT
  c.complaint_id,
  c.participation_id,
  c.description,
  c.status,
  c.response,
  c.created_at,
  c.resolved_at
FROM complaints c
JOIN participations p ON p.participation_id = c.participation_id
WHERE p.activity_id = ?
ORDER BY datetime(c.created_at) ASC
"#;

pub async fn list_for_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<ComplaintRow>> {
    sqlx::query_as::<_, ComplaintRow>(SQL_LIST_FOR_ACTIVITY)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_FOR_STUDENT: &str = r#"
SELECT
  c.complaint_id,
  c.participation_id,
  c.description,
  c.status,
  c.response,
  c.created_at,
  c.resolved_at
FROM complaints c
JOIN participations p ON p.participation_id = c.participation_id
WHERE p.student_user_id = ?
ORDER BY datetime(c.created_at) DESC
"#;

pub async fn list_for_student(
    pool: &SqlitePool,
    student_user_id: &str,
) -> sqlx::Result<Vec<ComplaintRow>> {
    sqlx::query_as::<_, ComplaintRow>(SQL_LIST_FOR_STUDENT)
        .bind(student_user_id)
        .fetch_all(pool)
        .await
}
