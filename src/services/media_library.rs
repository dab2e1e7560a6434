use thiserror::Error;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::MediaFile;
use crate::repositories::media;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media file {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Store an uploaded image as a data URL for embedding into questions.
pub async fn upload(
    state: &AppState,
    name: &str,
    mime_type: &str,
    data_url: &str,
) -> Result<MediaFile, MediaError> {
    let file = media::create(
        state.db(),
        media::CreateMediaFile {
            id: &Uuid::new_v4().to_string(),
            name,
            mime_type,
            data: data_url,
            uploaded: now_utc(),
        },
    )
    .await?;
    tracing::info!(name, mime_type, "Media file uploaded");
    Ok(file)
}

pub async fn list(state: &AppState) -> Result<Vec<MediaFile>, MediaError> {
    Ok(media::list(state.db()).await?)
}

pub async fn remove(state: &AppState, id: &str) -> Result<(), MediaError> {
    if !media::delete(state.db(), id).await? {
        return Err(MediaError::NotFound(id.to_string()));
    }
    Ok(())
}
