//! HTTP API endpoints.
//!
//! Read-only game lookups plus state export/import. All game mutations go
//! over the WebSocket.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ErrorKind, GameError};
use crate::state::export::StateSnapshot;
use crate::state::AppState;
use crate::types::{Board, Game, Player, PlayerProgress};

/// JSON body for failed requests
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
        };
        let body = ErrorBody {
            code: self.code().to_string(),
            msg: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Routes under /api. Game routes share one path parameter name: the first
/// segment after /api/games is a code for the bare route and an id otherwise.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/games/{id}", get(get_game_by_code))
        .route("/api/games/{id}/players", get(get_players))
        .route("/api/games/{id}/boards", get(get_boards))
        .route("/api/games/{id}/progress", get(get_progress))
        .route("/api/players/{player_id}/board", get(get_player_board))
        .route("/api/state/export", get(export_state))
        .route("/api/state/import", post(import_state))
}

/// GET /api/games/{code}
pub async fn get_game_by_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Game>, GameError> {
    state.get_game_by_code(&code).await.map(Json)
}

/// GET /api/games/{game_id}/players
pub async fn get_players(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<Player>>, GameError> {
    state.get_players_in_game(&game_id).await.map(Json)
}

/// GET /api/games/{game_id}/boards
pub async fn get_boards(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<Board>>, GameError> {
    state.get_boards_by_game(&game_id).await.map(Json)
}

/// GET /api/games/{game_id}/progress
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<PlayerProgress>>, GameError> {
    state.get_progress(&game_id).await.map(Json)
}

/// GET /api/players/{player_id}/board
///
/// Responds with `null` until the game has started.
pub async fn get_player_board(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<Option<Board>>, GameError> {
    state.get_board_by_player(&player_id).await.map(Json)
}

/// Export the entire store as JSON.
///
/// GET /api/state/export
pub async fn export_state(State(state): State<Arc<AppState>>) -> Json<StateSnapshot> {
    Json(state.export_state().await)
}

/// Import a snapshot.
///
/// POST /api/state/import
///
/// Replaces all current state with the imported data.
pub async fn import_state(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<StateSnapshot>,
) -> Response {
    match state.import_state(snapshot).await {
        Ok(()) => (StatusCode::OK, "State imported successfully").into_response(),
        Err(e) => {
            tracing::error!("State import failed: {}", e);
            (StatusCode::BAD_REQUEST, format!("Import failed: {}", e)).into_response()
        }
    }
}
