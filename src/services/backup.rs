use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::state::AppState;
use crate::core::time::{format_timestamp, now_utc};
use crate::db::models::{MediaFile, Question, Student, TestResult};
use crate::repositories::{media, questions, results, students};

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("malformed backup payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Portable snapshot of the store. Collections are optional on import so a
/// partial backup only replaces what it carries.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<Student>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_files: Option<Vec<MediaFile>>,
    pub export_date: String,
}

/// Serialize the full store to pretty-printed JSON.
pub async fn export_data(state: &AppState) -> Result<String, BackupError> {
    let data = BackupData {
        students: Some(students::list(state.db()).await?),
        questions: Some(questions::list_ordered(state.db()).await?),
        test_results: Some(results::list(state.db()).await?),
        media_files: Some(media::list(state.db()).await?),
        export_date: format_timestamp(now_utc()),
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Restore collections from a backup payload.
///
/// The payload is parsed in full before anything is written; a malformed
/// document aborts with no partial mutation. Present collections replace
/// their stored counterparts inside one transaction, absent ones are left
/// untouched.
pub async fn import_data(state: &AppState, payload: &str) -> Result<(), BackupError> {
    let data: BackupData = serde_json::from_str(payload)?;

    let mut tx = state.db().begin().await?;
    if let Some(imported) = &data.students {
        students::replace_all(&mut tx, imported).await?;
    }
    if let Some(imported) = &data.questions {
        questions::replace_all(&mut tx, imported).await?;
    }
    if let Some(imported) = &data.test_results {
        results::replace_all(&mut tx, imported).await?;
    }
    if let Some(imported) = &data.media_files {
        media::replace_all(&mut tx, imported).await?;
    }
    tx.commit().await?;

    tracing::info!(
        students = data.students.as_ref().map(Vec::len),
        questions = data.questions.as_ref().map(Vec::len),
        results = data.test_results.as_ref().map(Vec::len),
        "Backup imported"
    );
    Ok(())
}
