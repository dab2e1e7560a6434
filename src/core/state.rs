use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::config::Settings;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: SqlitePool,
}

impl AppState {
    pub fn new(settings: Settings, db: SqlitePool) -> Self {
        Self { inner: Arc::new(InnerState { settings, db }) }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }
}
