use super::AppState;
use crate::engine::{best_line_progress, derive_events, MarkContext};
use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::types::*;

/// Result of toggling one square
#[derive(Debug, Clone)]
pub struct MarkOutcome {
    pub board_id: BoardId,
    pub game_id: GameId,
    pub won: bool,
    pub squares: Vec<Square>,
    /// Events appended to the game's log by this mark
    pub events: Vec<GameEvent>,
}

impl AppState {
    /// Toggle a square. Marking may append events and finish the game;
    /// unmarking never does.
    pub async fn mark_square(&self, board_id: &str, index: usize) -> GameResult<MarkOutcome> {
        let outcome = self
            .store
            .transact(|tx| {
                let board = tx.board(board_id).ok_or(GameError::BoardNotFound)?;
                let game_id = board.game_id.clone();
                let player_id = board.player_id.clone();
                let mut squares = board.squares.clone();

                let game = tx.game(&game_id).ok_or(GameError::GameNotFound)?;
                if game.status != GameStatus::Playing {
                    return Err(GameError::GameNotPlaying);
                }
                let side_effect_mode = game.side_effect_mode;
                if index >= squares.len() {
                    return Err(GameError::InvalidIndex {
                        index,
                        len: squares.len(),
                    });
                }
                let player_name = tx
                    .player(&player_id)
                    .map(|p| p.name.clone())
                    .ok_or(GameError::PlayerNotFound)?;

                squares[index].marked = !squares[index].marked;

                let derived = derive_events(MarkContext {
                    squares: &squares,
                    index,
                    player_name: &player_name,
                    side_effect_mode,
                    existing: &game.events,
                });

                tx.patch_board(board_id, |b| b.squares = squares.clone())?;

                if !derived.events.is_empty() {
                    let events = derived.events.clone();
                    let won = derived.won;
                    tx.patch_game(&game_id, |g| {
                        g.events.extend(events);
                        if won {
                            g.status = GameStatus::Finished;
                            g.winner_id = Some(player_id.clone());
                        }
                    })?;
                }

                Ok(MarkOutcome {
                    board_id: board_id.to_string(),
                    game_id,
                    won: derived.won,
                    squares,
                    events: derived.events,
                })
            })
            .await?;

        if outcome.won {
            tracing::info!("Board {} completed a line, game {} finished", board_id, outcome.game_id);
        } else {
            tracing::debug!(
                "Board {} square {} toggled ({} events)",
                board_id,
                index,
                outcome.events.len()
            );
        }

        if let Ok(board) = self.get_board(board_id).await {
            self.broadcast_to_game(&outcome.game_id, ServerMessage::BoardUpdated { board });
        }
        if !outcome.events.is_empty() {
            self.broadcast_to_game(
                &outcome.game_id,
                ServerMessage::Events {
                    game_id: outcome.game_id.clone(),
                    events: outcome.events.clone(),
                },
            );
        }
        if let Ok(players) = self.get_progress(&outcome.game_id).await {
            self.broadcast_to_game(
                &outcome.game_id,
                ServerMessage::Progress {
                    game_id: outcome.game_id.clone(),
                    players,
                },
            );
        }
        if outcome.won {
            self.broadcast_game_state(&outcome.game_id).await;
        }

        Ok(outcome)
    }

    pub async fn get_board(&self, board_id: &str) -> GameResult<Board> {
        self.store
            .read(|t| t.board(board_id).cloned())
            .await
            .ok_or(GameError::BoardNotFound)
    }

    /// A player's board, or None before the game starts
    pub async fn get_board_by_player(&self, player_id: &str) -> GameResult<Option<Board>> {
        self.store
            .read(|t| {
                t.player(player_id)
                    .map(|_| t.board_by_player(player_id).cloned())
            })
            .await
            .ok_or(GameError::PlayerNotFound)
    }

    pub async fn get_boards_by_game(&self, game_id: &str) -> GameResult<Vec<Board>> {
        self.store
            .read(|t| {
                t.game(game_id)
                    .map(|_| t.boards_in_game(game_id).into_iter().cloned().collect())
            })
            .await
            .ok_or(GameError::GameNotFound)
    }

    /// Marked count and best line for every player with a board, in join order
    pub async fn get_progress(&self, game_id: &str) -> GameResult<Vec<PlayerProgress>> {
        self.store
            .read(|t| {
                t.game(game_id)?;
                let progress = t
                    .players_in_game(game_id)
                    .into_iter()
                    .filter_map(|player| {
                        t.board_by_player(&player.id).map(|board| PlayerProgress {
                            player_id: player.id.clone(),
                            player_name: player.name.clone(),
                            marked_count: board.squares.iter().filter(|s| s.marked).count(),
                            best_line: best_line_progress(&board.squares),
                        })
                    })
                    .collect();
                Some(progress)
            })
            .await
            .ok_or(GameError::GameNotFound)
    }
}
