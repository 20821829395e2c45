use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};

use crate::{
    config::{AppConfig, DatabaseConfig},
    db::connection,
    routes::build_app,
    state::AppState,
};

/// Defaults plus a private in-memory SQLite store.
pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig::in_memory(),
        ..AppConfig::default()
    }
}

/// State backed by a fresh in-memory SQLite database with the schema synced.
pub async fn sqlite_state() -> anyhow::Result<Arc<AppState>> {
    let cfg = test_config();
    let db = connection::connect(&cfg.database).await?;
    Ok(AppState::new(cfg, db))
}

/// State over a prepared mock connection.
pub fn mock_state(db: DatabaseConnection) -> Arc<AppState> {
    AppState::new(test_config(), db)
}

pub fn test_app(state: Arc<AppState>) -> Router {
    build_app(state)
}

/// App whose store rejects the next `failures` queries.
pub fn failing_app(failures: usize) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Sqlite)
        .append_query_errors(
            (0..failures).map(|_| DbErr::Custom("store unavailable".to_string())),
        )
        .into_connection();
    build_app(mock_state(db))
}
