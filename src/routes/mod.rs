mod health;
mod rounds;
mod ws;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /ws`: game `WebSocket`
/// - `GET /health`: liveness and session summary
/// - `GET /api/v1/rounds`: completed round history (requires a database)
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new().merge(rounds::router());

    Router::new()
        .merge(health::router())
        .merge(ws::router())
        .nest("/api/v1", api_v1)
}
