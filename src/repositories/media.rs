use sqlx::SqlitePool;

use crate::db::models::MediaFile;

const COLUMNS: &str = "id, name, mime_type, data, uploaded";

pub async fn list(pool: &SqlitePool) -> Result<Vec<MediaFile>, sqlx::Error> {
    sqlx::query_as::<_, MediaFile>(&format!("SELECT {COLUMNS} FROM media_files ORDER BY uploaded"))
        .fetch_all(pool)
        .await
}

pub struct CreateMediaFile<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub mime_type: &'a str,
    pub data: &'a str,
    pub uploaded: time::OffsetDateTime,
}

pub async fn create(
    pool: &SqlitePool,
    params: CreateMediaFile<'_>,
) -> Result<MediaFile, sqlx::Error> {
    sqlx::query_as::<_, MediaFile>(&format!(
        "INSERT INTO media_files (id, name, mime_type, data, uploaded)
         VALUES (?1,?2,?3,?4,?5)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.mime_type)
    .bind(params.data)
    .bind(params.uploaded)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM media_files WHERE id = ?1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn replace_all(
    executor: &mut sqlx::SqliteConnection,
    files: &[MediaFile],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM media_files").execute(&mut *executor).await?;
    for file in files {
        sqlx::query(
            "INSERT INTO media_files (id, name, mime_type, data, uploaded) VALUES (?1,?2,?3,?4,?5)",
        )
        .bind(&file.id)
        .bind(&file.name)
        .bind(&file.mime_type)
        .bind(&file.data)
        .bind(file.uploaded)
        .execute(&mut *executor)
        .await?;
    }
    Ok(())
}
