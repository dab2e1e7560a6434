pub mod core;
pub mod db;
pub mod exam;
pub mod repositories;
pub mod services;

#[cfg(test)]
mod test_support;

use crate::core::{bootstrap, config::Settings, state::AppState, telemetry};

/// Bring up a ready-to-use application state: settings from the environment,
/// tracing, the SQLite pool with migrations applied, and the seeded store.
pub async fn init() -> anyhow::Result<AppState> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let state = AppState::new(settings, db_pool);
    bootstrap::run(&state).await?;

    tracing::info!(
        environment = state.settings().runtime().environment.as_str(),
        "Exam platform initialized"
    );
    Ok(state)
}
