use sqlx::SqlitePool;

use crate::db::models::AdminCredentials;

const COLUMNS: &str = "login, password, created";

pub async fn get(pool: &SqlitePool) -> Result<Option<AdminCredentials>, sqlx::Error> {
    sqlx::query_as::<_, AdminCredentials>(&format!(
        "SELECT {COLUMNS} FROM admin_credentials LIMIT 1"
    ))
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &SqlitePool,
    login: &str,
    password: &str,
    created: time::OffsetDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO admin_credentials (login, password, created) VALUES (?1,?2,?3)")
        .bind(login)
        .bind(password)
        .bind(created)
        .execute(pool)
        .await?;
    Ok(())
}
