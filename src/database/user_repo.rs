use sqlx::SqlitePool;

// Accounts are provisioned by the external identity service; this repo only
// mirrors them so foreign keys and notification targets resolve.

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (user_id, name, role)
VALUES (?, ?, ?)
"#;

pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub name: &'a str,
    pub role: &'a str,
}

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_USER)
        .bind(user.user_id)
        .bind(user.name)
        .bind(user.role)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
