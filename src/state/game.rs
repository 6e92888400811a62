use super::player::normalize_name;
use super::AppState;
use crate::engine::{assemble_boards, Catalog};
use crate::error::{GameError, GameResult};
use crate::store::Tables;
use crate::types::*;
use rand::Rng;

/// Code alphabet without look-alike characters (no 0/O, 1/I/L)
pub const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 6;
/// Fresh codes tried per create before giving up
pub const MAX_CODE_ATTEMPTS: usize = 16;

fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Trim and upper-case a user-typed code, rejecting anything that cannot be a game code
pub fn normalize_code(raw: &str) -> GameResult<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() != CODE_LENGTH || !code.bytes().all(|b| CODE_CHARS.contains(&b)) {
        return Err(GameError::InvalidCode(raw.trim().to_string()));
    }
    Ok(code)
}

/// Result of creating a game: the lobby and its host
#[derive(Debug, Clone)]
pub struct CreatedGame {
    pub game: Game,
    pub player: Player,
}

impl AppState {
    /// Pick a code no existing game uses. Must run inside the inserting transaction.
    fn allocate_code(&self, tables: &Tables) -> GameResult<String> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.with_random(|rng| generate_code(rng));
            if tables.game_by_code(&code).is_none() {
                return Ok(code);
            }
            tracing::warn!("Game code {} already in use (attempt {})", code, attempt);
        }
        Err(GameError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    /// Create a lobby with its host player
    pub async fn create_game(
        &self,
        host_name: &str,
        session_token: &str,
        side_effect_mode: bool,
    ) -> GameResult<CreatedGame> {
        let name = normalize_name(host_name)?;

        let created = self
            .store
            .transact(|tx| {
                let code = self.allocate_code(tx)?;
                let now = chrono::Utc::now().to_rfc3339();
                let game_id = ulid::Ulid::new().to_string();
                let player_id = ulid::Ulid::new().to_string();

                let game = Game {
                    id: game_id.clone(),
                    code,
                    host_player_id: player_id.clone(),
                    status: GameStatus::Lobby,
                    winner_id: None,
                    side_effect_mode,
                    events: Vec::new(),
                    created_at: now.clone(),
                    version: 1,
                };
                let player = Player {
                    id: player_id,
                    game_id,
                    name,
                    session_token: session_token.to_string(),
                    is_host: true,
                    joined_at: now,
                };

                tx.insert_game(game.clone());
                tx.insert_player(player.clone());
                Ok(CreatedGame { game, player })
            })
            .await?;

        tracing::info!(
            "Game {} created by {} (side effects: {})",
            created.game.code,
            created.player.name,
            side_effect_mode
        );
        Ok(created)
    }

    pub async fn get_game(&self, game_id: &str) -> GameResult<Game> {
        self.store
            .read(|t| t.game(game_id).cloned())
            .await
            .ok_or(GameError::GameNotFound)
    }

    /// Look up a game by its shareable code (case-insensitive)
    pub async fn get_game_by_code(&self, code: &str) -> GameResult<Game> {
        let code = normalize_code(code)?;
        self.store
            .read(|t| t.game_by_code(&code).cloned())
            .await
            .ok_or(GameError::GameNotFound)
    }

    /// Deal boards to every player and move the lobby into play. Host only.
    pub async fn start_game(&self, game_id: &str, caller_id: &str) -> GameResult<Vec<Board>> {
        let boards = self
            .store
            .transact(|tx| {
                let game = tx.game(game_id).ok_or(GameError::GameNotFound)?;
                if game.host_player_id != caller_id {
                    return Err(GameError::NotHost);
                }
                if game.status != GameStatus::Lobby {
                    return Err(GameError::NotInLobby);
                }
                let side_effect_mode = game.side_effect_mode;

                let players: Vec<(PlayerId, String)> = tx
                    .players_in_game(game_id)
                    .into_iter()
                    .map(|p| (p.id.clone(), p.name.clone()))
                    .collect();
                if players.len() < MIN_PLAYERS {
                    return Err(GameError::NotEnoughPlayers { min: MIN_PLAYERS });
                }
                if players.len() > MAX_PLAYERS {
                    return Err(GameError::TooManyPlayers { max: MAX_PLAYERS });
                }
                if players
                    .iter()
                    .any(|(id, _)| tx.board_by_player(id).is_some())
                {
                    return Err(GameError::NotInLobby);
                }

                let names: Vec<String> = players.iter().map(|(_, name)| name.clone()).collect();
                let dealt = self.with_random(|rng| {
                    assemble_boards(rng, &Catalog::STANDARD, &names, side_effect_mode)
                });

                let mut boards = Vec::with_capacity(players.len());
                for ((player_id, _), squares) in players.into_iter().zip(dealt) {
                    let board = Board {
                        id: ulid::Ulid::new().to_string(),
                        player_id,
                        game_id: game_id.to_string(),
                        squares,
                    };
                    tx.insert_board(board.clone());
                    boards.push(board);
                }

                tx.patch_game(game_id, |g| g.status = GameStatus::Playing)?;
                Ok(boards)
            })
            .await?;

        tracing::info!("Game {} started with {} boards", game_id, boards.len());
        self.broadcast_game_state(game_id).await;
        Ok(boards)
    }

    /// Administrative override: finish a game in play with the given winner
    pub async fn set_winner(&self, game_id: &str, winner_id: &str) -> GameResult<()> {
        self.store
            .transact(|tx| {
                let game = tx.game(game_id).ok_or(GameError::GameNotFound)?;
                if game.status != GameStatus::Playing {
                    return Err(GameError::GameNotPlaying);
                }
                match tx.player(winner_id) {
                    Some(p) if p.game_id == game_id => {}
                    _ => return Err(GameError::PlayerNotFound),
                }
                tx.patch_game(game_id, |g| {
                    g.status = GameStatus::Finished;
                    g.winner_id = Some(winner_id.to_string());
                })
            })
            .await?;

        tracing::info!("Winner of game {} set to {}", game_id, winner_id);
        self.broadcast_game_state(game_id).await;
        Ok(())
    }

    /// Record that a player has seen an event. Returns whether anything changed;
    /// unknown event ids and repeat acknowledgements are no-ops.
    pub async fn acknowledge_event(
        &self,
        game_id: &str,
        event_id: &str,
        player_id: &str,
    ) -> GameResult<bool> {
        let changed = self
            .store
            .transact(|tx| {
                let game = tx.game(game_id).ok_or(GameError::GameNotFound)?;
                match tx.player(player_id) {
                    Some(p) if p.game_id == game_id => {}
                    _ => return Err(GameError::PlayerNotFound),
                }

                let pending = game
                    .events
                    .iter()
                    .any(|e| e.id == event_id && !e.acknowledged_by.contains(player_id));
                if !pending {
                    return Ok(false);
                }

                tx.patch_game(game_id, |g| {
                    if let Some(event) = g.events.iter_mut().find(|e| e.id == event_id) {
                        event.acknowledged_by.insert(player_id.to_string());
                    }
                })?;
                Ok(true)
            })
            .await?;

        if changed {
            tracing::debug!("Player {} acknowledged event {}", player_id, event_id);
            self.broadcast_game_state(game_id).await;
        }
        Ok(changed)
    }
}
