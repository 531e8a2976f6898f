use sqlx::SqlitePool;

// The single source of truth for "who owns the activity behind X". Every
// organizer mutation re-derives ownership through these joins instead of
// trusting anything the client sent.

const SQL_ACTIVITY_ORGANIZER: &str = r#"
SELECT organizer_user_id
FROM activities
WHERE activity_id = ?
LIMIT 1
"#;

pub async fn organizer_of_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(SQL_ACTIVITY_ORGANIZER)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

const SQL_PARTICIPATION_ORGANIZER: &str = r#"
SELECT a.organizer_user_id
FROM participations p
JOIN activities a ON a.activity_id = p.activity_id
WHERE p.participation_id = ?
LIMIT 1
"#;

pub async fn organizer_of_participation(
    pool: &SqlitePool,
    participation_id: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(SQL_PARTICIPATION_ORGANIZER)
        .bind(participation_id)
        .fetch_optional(pool)
        .await
}

const SQL_COMPLAINT_ORGANIZER: &str = r#"
SELECT a.organizer_user_id
FROM complaints c
JOIN participations p ON p.participation_id = c.participation_id
JOIN activities a ON a.activity_id = p.activity_id
WHERE c.complaint_id = ?
LIMIT 1
"#;

pub async fn organizer_of_complaint(
    pool: &SqlitePool,
    complaint_id: &str,
) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(SQL_COMPLAINT_ORGANIZER)
        .bind(complaint_id)
        .fetch_optional(pool)
        .await
}
