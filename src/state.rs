use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

/// Process-wide application context: the connection pool and config are
/// created once at startup and handed to handlers through axum state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}
