use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{AdminCredentials, Student};
use crate::db::types::UserRole;
use crate::repositories::{admin, session, students};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("a student with this email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterStudent {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 20))]
    pub class_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Register a student account. Emails are unique across the store.
pub async fn register_student(
    state: &AppState,
    params: RegisterStudent,
) -> Result<Student, AuthError> {
    params.validate()?;

    if students::find_by_email(state.db(), &params.email).await?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let now = now_utc();
    let id = Uuid::new_v4().to_string();
    let student = students::create(
        state.db(),
        students::CreateStudent {
            id: &id,
            first_name: &params.first_name,
            last_name: &params.last_name,
            class_name: &params.class_name,
            email: &params.email,
            password: &params.password,
            created: now,
            last_login: now,
        },
    )
    .await?;

    tracing::info!(student_id = %student.id, "Student registered");
    Ok(student)
}

/// Authenticate a student and record the device-wide login session.
pub async fn login_student(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<Student, AuthError> {
    let Some(student) = students::find_by_credentials(state.db(), email, password).await? else {
        return Err(AuthError::InvalidCredentials);
    };

    let now = now_utc();
    students::touch_last_login(state.db(), &student.id, now).await?;
    session::set(state.db(), &serde_json::to_value(&student)?, UserRole::Student, now).await?;

    tracing::info!(student_id = %student.id, "Student logged in");
    Ok(student)
}

/// Authenticate against the stored admin credentials.
pub async fn login_admin(
    state: &AppState,
    login: &str,
    password: &str,
) -> Result<AdminCredentials, AuthError> {
    let Some(credentials) = admin::get(state.db()).await? else {
        return Err(AuthError::InvalidCredentials);
    };
    if credentials.login != login || credentials.password != password {
        return Err(AuthError::InvalidCredentials);
    }

    session::set(
        state.db(),
        &serde_json::to_value(&credentials)?,
        UserRole::Admin,
        now_utc(),
    )
    .await?;

    tracing::info!("Administrator logged in");
    Ok(credentials)
}

pub async fn logout(state: &AppState) -> Result<(), AuthError> {
    session::clear(state.db()).await?;
    Ok(())
}

/// Check a code entered at a violation overlay against the admin password.
pub async fn verify_admin_code(state: &AppState, code: &str) -> Result<bool, AuthError> {
    let Some(credentials) = admin::get(state.db()).await? else {
        return Ok(false);
    };
    Ok(credentials.password == code)
}
