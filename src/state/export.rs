//! Whole-store snapshots for backup and restoration.
//!
//! A snapshot holds every game, player and board. Broadcast channels and the
//! RNG are runtime-only and are not included.

use super::AppState;
use crate::store::Tables;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Schema version for snapshot format compatibility
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// A serializable copy of the entire store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub schema_version: u32,
    /// Export timestamp (RFC 3339)
    pub exported_at: String,
    /// Ordered by creation time
    pub games: Vec<Game>,
    /// Grouped by game, in join order
    pub players: Vec<Player>,
    #[serde(default)]
    pub boards: Vec<Board>,
}

impl StateSnapshot {
    pub fn new(games: Vec<Game>, players: Vec<Player>, boards: Vec<Board>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            games,
            players,
            boards,
        }
    }

    /// Check references and shapes before anything is replaced
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > SNAPSHOT_SCHEMA_VERSION {
            return Err(format!(
                "Snapshot schema version {} is newer than supported version {}. \
                 Please update the server.",
                self.schema_version, SNAPSHOT_SCHEMA_VERSION
            ));
        }

        let mut game_ids = HashSet::new();
        let mut codes = HashSet::new();
        for game in &self.games {
            if !game_ids.insert(game.id.as_str()) {
                return Err(format!("Duplicate game id '{}'", game.id));
            }
            if !codes.insert(game.code.as_str()) {
                return Err(format!("Duplicate game code '{}'", game.code));
            }
        }

        let mut player_games: HashMap<&str, &str> = HashMap::new();
        for player in &self.players {
            if !game_ids.contains(player.game_id.as_str()) {
                return Err(format!(
                    "Player '{}' references game '{}' which doesn't exist",
                    player.id, player.game_id
                ));
            }
            if player_games
                .insert(player.id.as_str(), player.game_id.as_str())
                .is_some()
            {
                return Err(format!("Duplicate player id '{}'", player.id));
            }
        }

        for game in &self.games {
            if player_games.get(game.host_player_id.as_str()) != Some(&game.id.as_str()) {
                return Err(format!(
                    "Game '{}' has host '{}' who is not one of its players",
                    game.id, game.host_player_id
                ));
            }
            if let Some(winner_id) = &game.winner_id {
                if game.status != GameStatus::Finished {
                    return Err(format!(
                        "Game '{}' has a winner but is not finished",
                        game.id
                    ));
                }
                if player_games.get(winner_id.as_str()) != Some(&game.id.as_str()) {
                    return Err(format!(
                        "Game '{}' has winner '{}' who is not one of its players",
                        game.id, winner_id
                    ));
                }
            }
        }

        let lobbies: HashSet<&str> = self
            .games
            .iter()
            .filter(|g| g.status == GameStatus::Lobby)
            .map(|g| g.id.as_str())
            .collect();
        let mut owners = HashSet::new();
        for board in &self.boards {
            if !game_ids.contains(board.game_id.as_str()) {
                return Err(format!(
                    "Board '{}' references game '{}' which doesn't exist",
                    board.id, board.game_id
                ));
            }
            match player_games.get(board.player_id.as_str()) {
                None => {
                    return Err(format!(
                        "Board '{}' references player '{}' which doesn't exist",
                        board.id, board.player_id
                    ))
                }
                Some(&owner_game) if owner_game != board.game_id => {
                    return Err(format!(
                        "Board '{}' is in game '{}' but its player is in game '{}'",
                        board.id, board.game_id, owner_game
                    ))
                }
                Some(_) => {}
            }
            if lobbies.contains(board.game_id.as_str()) {
                return Err(format!(
                    "Board '{}' belongs to game '{}' which is still in the lobby",
                    board.id, board.game_id
                ));
            }
            if !owners.insert(board.player_id.as_str()) {
                return Err(format!("Player '{}' has more than one board", board.player_id));
            }
            if board.squares.len() != BOARD_SIZE {
                return Err(format!(
                    "Board '{}' has {} squares, expected {}",
                    board.id,
                    board.squares.len(),
                    BOARD_SIZE
                ));
            }
        }

        Ok(())
    }
}

impl AppState {
    pub async fn export_state(&self) -> StateSnapshot {
        let (games, players, boards) = self.store.read(|t| t.records()).await;
        StateSnapshot::new(games, players, boards)
    }

    /// Replace the whole store with `snapshot`. Nothing changes if it is invalid.
    pub async fn import_state(&self, snapshot: StateSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate().map_err(SnapshotError::Invalid)?;

        let games = snapshot.games.len();
        let tables = Tables::from_records(snapshot.games, snapshot.players, snapshot.boards);
        self.store.replace(tables).await;

        tracing::info!(
            "Imported snapshot from {} with {} games",
            snapshot.exported_at,
            games
        );
        Ok(())
    }

    /// Write the current store to `path` as pretty JSON
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = self.export_state().await;
        let json = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(path, json).await?;
        tracing::info!(
            "Saved {} games to {}",
            snapshot.games.len(),
            path.display()
        );
        Ok(())
    }

    /// Restore the store from a snapshot file written by [`AppState::save_snapshot`]
    pub async fn load_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = tokio::fs::read_to_string(path).await?;
        let snapshot: StateSnapshot = serde_json::from_str(&json)?;
        self.import_state(snapshot).await
    }
}
