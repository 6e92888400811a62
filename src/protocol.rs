use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateGame {
        host_name: String,
        session_token: String,
        #[serde(default)]
        side_effect_mode: bool,
    },
    JoinGame {
        code: String,
        player_name: String,
        session_token: String,
    },
    /// Reattach a session to the player it created earlier
    Resume {
        code: String,
        session_token: String,
    },
    /// Follow a game's updates without playing
    Watch {
        code: String,
    },
    StartGame {
        game_id: GameId,
        player_id: PlayerId,
    },
    /// Toggle one square; marking may produce events and finish the game
    MarkSquare {
        board_id: BoardId,
        square_index: usize,
    },
    AcknowledgeEvent {
        game_id: GameId,
        event_id: EventId,
        player_id: PlayerId,
    },
    /// Administrative override of the winner
    SetWinner {
        game_id: GameId,
        winner_id: PlayerId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        server_now: String,
    },
    GameCreated {
        code: String,
        game_id: GameId,
        player_id: PlayerId,
    },
    Joined {
        game_id: GameId,
        player_id: PlayerId,
    },
    /// Sent on resume with everything needed to redraw the client
    PlayerState {
        game: Game,
        player: Player,
        players: Vec<Player>,
        board: Option<Board>,
    },
    GameState {
        game: Game,
        players: Vec<Player>,
    },
    SquareMarked {
        board_id: BoardId,
        won: bool,
        squares: Vec<Square>,
    },
    /// Broadcast whenever a board changes
    BoardUpdated {
        board: Board,
    },
    /// Broadcast with events newly appended to the game's log
    Events {
        game_id: GameId,
        events: Vec<GameEvent>,
    },
    Progress {
        game_id: GameId,
        players: Vec<PlayerProgress>,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(e: GameError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}

/// A server message scoped to one game, as carried on the broadcast channel
#[derive(Debug, Clone)]
pub struct GameBroadcast {
    pub game_id: GameId,
    pub msg: ServerMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_tagging() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"create_game","host_name":"Alice","session_token":"s1"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::CreateGame {
                host_name,
                side_effect_mode,
                ..
            } => {
                assert_eq!(host_name, "Alice");
                assert!(!side_effect_mode);
            }
            other => panic!("unexpected {:?}", other),
        }

        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"mark_square","board_id":"b1","square_index":4}"#)
                .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::MarkSquare {
                square_index: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_error_message_from_game_error() {
        let msg = ServerMessage::from(GameError::GameFull);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["t"], "error");
        assert_eq!(json["code"], "GAME_FULL");
        assert_eq!(json["msg"], "Game is full");
    }
}
