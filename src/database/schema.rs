use sqlx::SqlitePool;

const SQL_CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  user_id    TEXT PRIMARY KEY,
  name       TEXT NOT NULL,
  role       TEXT NOT NULL CHECK (role IN ('student', 'organizer'))
)
"#;

const SQL_CREATE_ACTIVITIES: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
  activity_id            TEXT PRIMARY KEY,
  organizer_user_id      TEXT NOT NULL REFERENCES users(user_id),
  title                  TEXT NOT NULL,
  description            TEXT,
  category               TEXT NOT NULL,
  capacity               INTEGER,
  registration_starts_at TEXT NOT NULL,
  registration_ends_at   TEXT NOT NULL,
  starts_at              TEXT NOT NULL,
  ends_at                TEXT NOT NULL,
  status                 TEXT NOT NULL DEFAULT 'draft'
                         CHECK (status IN ('draft', 'published', 'completed')),
  created_at             TEXT NOT NULL,
  updated_at             TEXT NOT NULL
)
"#;

const SQL_CREATE_PARTICIPATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS participations (
  participation_id TEXT PRIMARY KEY,
  activity_id      TEXT NOT NULL REFERENCES activities(activity_id),
  student_user_id  TEXT NOT NULL REFERENCES users(user_id),
  status           TEXT NOT NULL DEFAULT 'draft'
                   CHECK (status IN ('draft', 'pending', 'approved', 'rejected',
                                     'present', 'absent', 'cancelled')),
  training_point   INTEGER NOT NULL DEFAULT 0,
  note             TEXT,
  created_at       TEXT NOT NULL,
  updated_at       TEXT NOT NULL
)
"#;

// Partial unique index: one live registration per student per activity.
// Rejected and cancelled rows stay behind as history without blocking a
// fresh registration.
const SQL_CREATE_ACTIVE_PAIR_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_participations_active_pair
ON participations (activity_id, student_user_id)
WHERE status NOT IN ('rejected', 'cancelled')
"#;

const SQL_CREATE_PARTICIPATIONS_ACTIVITY_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_participations_activity
ON participations (activity_id, status)
"#;

const SQL_CREATE_COMPLAINTS: &str = r#"
CREATE TABLE IF NOT EXISTS complaints (
  complaint_id     TEXT PRIMARY KEY,
  participation_id TEXT NOT NULL REFERENCES participations(participation_id),
  description      TEXT NOT NULL,
  status           TEXT NOT NULL DEFAULT 'pending'
                   CHECK (status IN ('pending', 'approved', 'rejected')),
  response         TEXT,
  created_at       TEXT NOT NULL,
  resolved_at      TEXT
)
"#;

const SQL_CREATE_COMPLAINTS_PARTICIPATION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_complaints_participation
ON complaints (participation_id, status)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for statement in [
        SQL_CREATE_USERS,
        SQL_CREATE_ACTIVITIES,
        SQL_CREATE_PARTICIPATIONS,
        SQL_CREATE_ACTIVE_PAIR_INDEX,
        SQL_CREATE_PARTICIPATIONS_ACTIVITY_INDEX,
        SQL_CREATE_COMPLAINTS,
        SQL_CREATE_COMPLAINTS_PARTICIPATION_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
