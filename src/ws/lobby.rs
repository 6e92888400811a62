//! Lobby message handlers
//!
//! Creating, joining, resuming and watching games, and the host's start command.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

pub async fn handle_create_game(
    state: &Arc<AppState>,
    host_name: String,
    session_token: String,
    side_effect_mode: bool,
) -> Option<ServerMessage> {
    tracing::info!("Create game requested by {}", host_name);
    match state
        .create_game(&host_name, &session_token, side_effect_mode)
        .await
    {
        Ok(created) => Some(ServerMessage::GameCreated {
            code: created.game.code,
            game_id: created.game.id,
            player_id: created.player.id,
        }),
        Err(e) => {
            tracing::warn!("Create game failed: {}", e);
            Some(e.into())
        }
    }
}

pub async fn handle_join_game(
    state: &Arc<AppState>,
    code: String,
    player_name: String,
    session_token: String,
) -> Option<ServerMessage> {
    tracing::info!("Join request for {} as {}", code, player_name);
    match state.join_game(&code, &player_name, &session_token).await {
        Ok(joined) => Some(ServerMessage::Joined {
            game_id: joined.game.id,
            player_id: joined.player.id,
        }),
        Err(e) => {
            tracing::info!("Join for {} rejected: {}", code, e);
            Some(e.into())
        }
    }
}

/// Reattach a returning session and send it everything it needs to redraw
pub async fn handle_resume(
    state: &Arc<AppState>,
    code: String,
    session_token: String,
) -> Option<ServerMessage> {
    let (game, player) = match state.get_player_by_session(&code, &session_token).await {
        Ok(found) => found,
        Err(e) => return Some(e.into()),
    };
    tracing::info!("{} resumed game {}", player.name, game.code);

    let players = match state.get_players_in_game(&game.id).await {
        Ok(players) => players,
        Err(e) => return Some(e.into()),
    };
    let board = state.get_board_by_player(&player.id).await.ok().flatten();

    Some(ServerMessage::PlayerState {
        game,
        player,
        players,
        board,
    })
}

pub async fn handle_watch(state: &Arc<AppState>, code: String) -> Option<ServerMessage> {
    let game = match state.get_game_by_code(&code).await {
        Ok(game) => game,
        Err(e) => return Some(e.into()),
    };
    tracing::info!("Watcher attached to game {}", game.code);

    match state.get_players_in_game(&game.id).await {
        Ok(players) => Some(ServerMessage::GameState { game, players }),
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_start_game(
    state: &Arc<AppState>,
    game_id: String,
    player_id: String,
) -> Option<ServerMessage> {
    tracing::info!("Start requested for game {} by {}", game_id, player_id);
    match state.start_game(&game_id, &player_id).await {
        // Everyone following the game receives the new state and boards by broadcast
        Ok(boards) => {
            for board in boards {
                state.broadcast_to_game(&game_id, ServerMessage::BoardUpdated { board });
            }
            None
        }
        Err(e) => Some(e.into()),
    }
}
