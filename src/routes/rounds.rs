use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::entities::game_info;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Build the round history route group: `/rounds`.
pub fn router() -> Router<AppState> {
    Router::new().route("/rounds", get(list_rounds))
}

#[derive(Deserialize)]
struct RoundsQuery {
    limit: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoundResponse {
    maze_no: i32,
    number_of_players: i32,
    time_taken: i64,
    completed_at: String,
}

impl From<game_info::Model> for RoundResponse {
    fn from(row: game_info::Model) -> Self {
        Self {
            maze_no: row.maze_no,
            number_of_players: row.number_of_players,
            time_taken: row.time_taken,
            completed_at: row.completed_at.to_rfc3339(),
        }
    }
}

/// `GET /api/v1/rounds?limit=N`: Most recently completed rounds, newest first.
async fn list_rounds(
    State(state): State<AppState>,
    Query(query): Query<RoundsQuery>,
) -> Result<Json<Vec<RoundResponse>>, AppError> {
    let db = state.db.as_ref().ok_or_else(|| {
        AppError::Unavailable("Round history requires a configured database.".to_string())
    })?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_LIMIT}."
        )));
    }

    let rows = game_info::Entity::find()
        .order_by_desc(game_info::Column::MazeNo)
        .limit(limit)
        .all(db)
        .await?;

    Ok(Json(rows.into_iter().map(RoundResponse::from).collect()))
}
