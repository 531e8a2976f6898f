use sqlx::SqlitePool;

use crate::models::ActivityRow;

pub struct NewActivity<'a> {
    pub activity_id: &'a str,
    pub organizer_user_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub capacity: Option<i64>,
    pub registration_starts_at: &'a str,
    pub registration_ends_at: &'a str,
    pub starts_at: &'a str,
    pub ends_at: &'a str,
    pub now: &'a str,
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  activity_id,
  organizer_user_id,
  title,
  description,
  category,
  capacity,
  registration_starts_at,
  registration_ends_at,
  starts_at,
  ends_at,
  status,
  created_at,
  updated_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'draft', ?, ?)
"#;

pub async fn insert_activity(pool: &SqlitePool, activity: NewActivity<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.activity_id)
        .bind(activity.organizer_user_id)
        .bind(activity.title)
        .bind(activity.description)
        .bind(activity.category)
        .bind(activity.capacity)
        .bind(activity.registration_starts_at)
        .bind(activity.registration_ends_at)
        .bind(activity.starts_at)
        .bind(activity.ends_at)
        .bind(activity.now)
        .bind(activity.now)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LOAD_ACTIVITY: &str = r#"
SELECT
  activity_id,
  organizer_user_id,
  title,
  description,
  category,
  capacity,
  registration_starts_at,
  registration_ends_at,
  starts_at,
  ends_at,
  status,
  created_at,
  updated_at
FROM activities
WHERE activity_id = ?
LIMIT 1
"#;

pub async fn load_activity_by_id(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Option<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_LOAD_ACTIVITY)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

// Status moves are guarded in the WHERE clause; 0 rows affected means the
// activity was not in the expected source state.
const SQL_SET_ACTIVITY_STATUS: &str = r#"
UPDATE activities
SET status = ?, updated_at = ?
WHERE activity_id = ?
  AND status = ?
"#;

pub async fn set_activity_status(
    pool: &SqlitePool,
    activity_id: &str,
    from: &str,
    to: &str,
    now: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_ACTIVITY_STATUS)
        .bind(to)
        .bind(now)
        .bind(activity_id)
        .bind(from)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_PUBLISHED: &str = r#"
SELECT
  activity_id,
  organizer_user_id,
  title,
  description,
  category,
  capacity,
  registration_starts_at,
  registration_ends_at,
  starts_at,
  ends_at,
  status,
  created_at,
  updated_at
FROM activities
WHERE status = 'published'
ORDER BY datetime(starts_at) ASC
LIMIT ?
"#;

pub async fn list_published(pool: &SqlitePool, limit: i64) -> sqlx::Result<Vec<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_LIST_PUBLISHED)
        .bind(limit)
        .fetch_all(pool)
        .await
}

// Suggestion query for a student who could not register: published
// activities in the same category whose registration window is still open
// and which still have a free seat.
const SQL_LIST_ALTERNATIVES: &str = r#"
SELECT
  a.activity_id,
  a.organizer_user_id,
  a.title,
  a.description,
  a.category,
  a.capacity,
  a.registration_starts_at,
  a.registration_ends_at,
  a.starts_at,
  a.ends_at,
  a.status,
  a.created_at,
  a.updated_at
FROM activities a
WHERE a.status = 'published'
  AND a.category = (SELECT category FROM activities WHERE activity_id = ?)
  AND a.activity_id != ?
  AND datetime(a.registration_ends_at) >= datetime('now')
  AND (
    a.capacity IS NULL
    OR a.capacity > (
      SELECT COUNT(*)
      FROM participations p
      WHERE p.activity_id = a.activity_id
        AND p.status NOT IN ('rejected', 'cancelled')
    )
  )
ORDER BY datetime(a.starts_at) ASC
LIMIT ?
"#;

pub async fn list_same_category_alternatives(
    pool: &SqlitePool,
    activity_id: &str,
    limit: i64,
) -> sqlx::Result<Vec<ActivityRow>> {
    sqlx::query_as::<_, ActivityRow>(SQL_LIST_ALTERNATIVES)
        .bind(activity_id)
        .bind(activity_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}
