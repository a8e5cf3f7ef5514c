use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::game::GameHub;

/// Shared application state available to all request handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// `None` when the server runs without a stats database.
    pub db: Option<DatabaseConnection>,
    pub config: Config,
    pub hub: GameHub,
}
