use thiserror::Error;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{Question, QuestionOptions};
use crate::db::types::{AnswerOption, Subject};
use crate::repositories::questions;

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("question {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub struct NewQuestion {
    pub subject: Subject,
    pub text: String,
    pub formula: Option<String>,
    pub options: QuestionOptions,
    pub correct_answer: AnswerOption,
    pub explanation: Option<String>,
    pub image: Option<String>,
}

/// Append a question to the bank at the next free number.
pub async fn add_question(
    state: &AppState,
    params: NewQuestion,
) -> Result<Question, QuestionBankError> {
    let now = now_utc();
    let number = questions::next_number(state.db()).await?;
    let question = questions::create(
        state.db(),
        questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            number,
            subject: params.subject,
            text: &params.text,
            formula: params.formula.as_deref(),
            options: &params.options,
            correct_answer: params.correct_answer,
            explanation: params.explanation.as_deref(),
            image: params.image.as_deref(),
            created: now,
            updated: now,
        },
    )
    .await?;

    tracing::info!(number, subject = question.subject.as_str(), "Question added");
    Ok(question)
}

pub async fn edit_question(
    state: &AppState,
    id: &str,
    params: questions::UpdateQuestion<'_>,
) -> Result<Question, QuestionBankError> {
    questions::update(state.db(), id, params)
        .await?
        .ok_or_else(|| QuestionBankError::NotFound(id.to_string()))
}

pub async fn remove_question(state: &AppState, id: &str) -> Result<(), QuestionBankError> {
    if !questions::delete(state.db(), id).await? {
        return Err(QuestionBankError::NotFound(id.to_string()));
    }
    tracing::info!(id, "Question removed");
    Ok(())
}

pub async fn get_question(state: &AppState, id: &str) -> Result<Question, QuestionBankError> {
    questions::find_by_id(state.db(), id)
        .await?
        .ok_or_else(|| QuestionBankError::NotFound(id.to_string()))
}

pub async fn list_bank(state: &AppState) -> Result<Vec<Question>, QuestionBankError> {
    Ok(questions::list_ordered(state.db()).await?)
}
