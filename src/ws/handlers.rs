//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Each message is routed to the lobby or board handler module.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

use super::{board, lobby};

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        // Lobby messages
        ClientMessage::CreateGame {
            host_name,
            session_token,
            side_effect_mode,
        } => lobby::handle_create_game(state, host_name, session_token, side_effect_mode).await,

        ClientMessage::JoinGame {
            code,
            player_name,
            session_token,
        } => lobby::handle_join_game(state, code, player_name, session_token).await,

        ClientMessage::Resume {
            code,
            session_token,
        } => lobby::handle_resume(state, code, session_token).await,

        ClientMessage::Watch { code } => lobby::handle_watch(state, code).await,

        ClientMessage::StartGame { game_id, player_id } => {
            lobby::handle_start_game(state, game_id, player_id).await
        }

        // In-game messages
        ClientMessage::MarkSquare {
            board_id,
            square_index,
        } => board::handle_mark_square(state, board_id, square_index).await,

        ClientMessage::AcknowledgeEvent {
            game_id,
            event_id,
            player_id,
        } => board::handle_acknowledge_event(state, game_id, event_id, player_id).await,

        ClientMessage::SetWinner { game_id, winner_id } => {
            board::handle_set_winner(state, game_id, winner_id).await
        }
    }
}

/// The game a socket should follow after receiving `response`, if any
pub fn followed_game(response: &ServerMessage) -> Option<&str> {
    match response {
        ServerMessage::GameCreated { game_id, .. } | ServerMessage::Joined { game_id, .. } => {
            Some(game_id)
        }
        ServerMessage::PlayerState { game, .. } | ServerMessage::GameState { game, .. } => {
            Some(&game.id)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_watch_follow_same_game() {
        let state = Arc::new(AppState::with_seed(40));

        let created = handle_message(
            ClientMessage::CreateGame {
                host_name: "Alice".to_string(),
                session_token: "s1".to_string(),
                side_effect_mode: false,
            },
            &state,
        )
        .await
        .unwrap();
        let (code, game_id) = match &created {
            ServerMessage::GameCreated { code, game_id, .. } => (code.clone(), game_id.clone()),
            other => panic!("Expected GameCreated, got {:?}", other),
        };
        assert_eq!(followed_game(&created), Some(game_id.as_str()));

        let watched = handle_message(ClientMessage::Watch { code }, &state)
            .await
            .unwrap();
        assert_eq!(followed_game(&watched), Some(game_id.as_str()));
    }

    #[tokio::test]
    async fn test_errors_become_error_messages() {
        let state = Arc::new(AppState::with_seed(41));
        let response = handle_message(
            ClientMessage::JoinGame {
                code: "ZZZZZZ".to_string(),
                player_name: "Bob".to_string(),
                session_token: "s2".to_string(),
            },
            &state,
        )
        .await;

        match response {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "GAME_NOT_FOUND"),
            other => panic!("Expected error, got {:?}", other),
        }
        assert!(followed_game(&ServerMessage::from(crate::error::GameError::GameFull)).is_none());
    }
}
