//! In-game message handlers: marking squares, acknowledging events and the
//! winner override.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

pub async fn handle_mark_square(
    state: &Arc<AppState>,
    board_id: String,
    square_index: usize,
) -> Option<ServerMessage> {
    match state.mark_square(&board_id, square_index).await {
        Ok(outcome) => Some(ServerMessage::SquareMarked {
            board_id: outcome.board_id,
            won: outcome.won,
            squares: outcome.squares,
        }),
        Err(e) => {
            tracing::info!("Mark on board {} rejected: {}", board_id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_acknowledge_event(
    state: &Arc<AppState>,
    game_id: String,
    event_id: String,
    player_id: String,
) -> Option<ServerMessage> {
    match state
        .acknowledge_event(&game_id, &event_id, &player_id)
        .await
    {
        Ok(_) => None,
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_set_winner(
    state: &Arc<AppState>,
    game_id: String,
    winner_id: String,
) -> Option<ServerMessage> {
    tracing::info!("Winner override for game {}: {}", game_id, winner_id);
    match state.set_winner(&game_id, &winner_id).await {
        Ok(()) => None,
        Err(e) => Some(e.into()),
    }
}
