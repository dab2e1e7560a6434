use sqlx::SqlitePool;

use crate::db::models::AccessCode;

const COLUMNS: &str = "code, created, used, expires_at, used_at";

pub async fn list(pool: &SqlitePool) -> Result<Vec<AccessCode>, sqlx::Error> {
    sqlx::query_as::<_, AccessCode>(&format!("SELECT {COLUMNS} FROM access_codes ORDER BY created"))
        .fetch_all(pool)
        .await
}

pub async fn find_unused(pool: &SqlitePool, code: &str) -> Result<Option<AccessCode>, sqlx::Error> {
    sqlx::query_as::<_, AccessCode>(&format!(
        "SELECT {COLUMNS} FROM access_codes WHERE code = ?1 AND used = 0"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
}

pub struct CreateAccessCode<'a> {
    pub code: &'a str,
    pub created: time::OffsetDateTime,
    pub expires_at: time::OffsetDateTime,
}

pub async fn create(pool: &SqlitePool, params: CreateAccessCode<'_>) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO access_codes (code, created, used, expires_at) VALUES (?1,?2,0,?3)")
        .bind(params.code)
        .bind(params.created)
        .bind(params.expires_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Flip an unused code to used. Returns false when the code was already
/// consumed by the time the update ran.
pub async fn mark_used(
    pool: &SqlitePool,
    code: &str,
    used_at: time::OffsetDateTime,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE access_codes SET used = 1, used_at = ?1 WHERE code = ?2 AND used = 0")
            .bind(used_at)
            .bind(code)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
