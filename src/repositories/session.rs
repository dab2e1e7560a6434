use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::db::models::CurrentSession;
use crate::db::types::UserRole;

const COLUMNS: &str = "user, role, login_time";

pub async fn get(pool: &SqlitePool) -> Result<Option<CurrentSession>, sqlx::Error> {
    sqlx::query_as::<_, CurrentSession>(&format!(
        "SELECT {COLUMNS} FROM current_session WHERE id = 1"
    ))
    .fetch_optional(pool)
    .await
}

/// Replace the single login-session row. Only one user is ever logged in on
/// the device at a time.
pub async fn set(
    pool: &SqlitePool,
    user: &serde_json::Value,
    role: UserRole,
    login_time: time::OffsetDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO current_session (id, user, role, login_time) VALUES (1,?1,?2,?3)
         ON CONFLICT (id) DO UPDATE SET user = ?1, role = ?2, login_time = ?3",
    )
    .bind(Json(user))
    .bind(role)
    .bind(login_time)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn clear(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM current_session").execute(pool).await?;
    Ok(())
}
