mod board;
pub mod export;
mod game;
mod player;

pub use board::MarkOutcome;
pub use game::{normalize_code, CreatedGame, CODE_CHARS, CODE_LENGTH, MAX_CODE_ATTEMPTS};
pub use player::{normalize_name, JoinedGame, MAX_NAME_CHARS};

use crate::config::ServerConfig;
use crate::protocol::{GameBroadcast, ServerMessage};
use crate::store::Store;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// Single random source for codes and boards; seedable for reproducible games
    rng: Arc<Mutex<StdRng>>,
    /// Game-scoped messages for every connected socket
    pub broadcast: broadcast::Sender<GameBroadcast>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        match config.rng_seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    fn with_rng(rng: StdRng) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            store: Arc::new(Store::new()),
            rng: Arc::new(Mutex::new(rng)),
            broadcast: tx,
        }
    }

    /// Run `f` with exclusive access to the shared RNG
    pub(crate) fn with_random<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// Send a message to every socket following `game_id`
    pub fn broadcast_to_game(&self, game_id: &str, msg: ServerMessage) {
        // No subscribers is fine
        let _ = self.broadcast.send(GameBroadcast {
            game_id: game_id.to_string(),
            msg,
        });
    }

    /// Broadcast the current game record and roster
    pub async fn broadcast_game_state(&self, game_id: &str) {
        let snapshot = self
            .store
            .read(|t| {
                t.game(game_id).cloned().map(|game| {
                    let players = t.players_in_game(game_id).into_iter().cloned().collect();
                    (game, players)
                })
            })
            .await;

        if let Some((game, players)) = snapshot {
            self.broadcast_to_game(game_id, ServerMessage::GameState { game, players });
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let state = AppState::with_seed(1);
        let mut rx = state.broadcast.subscribe();

        let created = state.create_game("Alice", "s1", false).await.unwrap();
        state.broadcast_game_state(&created.game.id).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.game_id, created.game.id);
        match received.msg {
            ServerMessage::GameState { game, players } => {
                assert_eq!(game.code, created.game.code);
                assert_eq!(players.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_without_game_is_silent() {
        let state = AppState::with_seed(1);
        let mut rx = state.broadcast.subscribe();
        state.broadcast_game_state("missing").await;
        assert!(rx.try_recv().is_err());
    }
}
