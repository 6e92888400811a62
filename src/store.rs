//! In-memory document store for games, players and boards.
//!
//! Reads go through [`Store::read`]. Every write happens inside
//! [`Store::transact`], which holds the write lock for the whole closure and
//! undoes all of the closure's writes if it returns an error.

use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::HashMap;
use std::ops::Deref;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Indexes {
    game_by_code: HashMap<String, GameId>,
    /// Join order
    players_by_game: HashMap<GameId, Vec<PlayerId>>,
    player_by_session: HashMap<(String, GameId), PlayerId>,
    board_by_player: HashMap<PlayerId, BoardId>,
    boards_by_game: HashMap<GameId, Vec<BoardId>>,
}

#[derive(Debug, Default)]
pub struct Tables {
    games: HashMap<GameId, Game>,
    players: HashMap<PlayerId, Player>,
    boards: HashMap<BoardId, Board>,
    indexes: Indexes,
}

impl Tables {
    /// Rebuild tables and indexes from plain records. Players and boards keep
    /// the relative order they are given in.
    pub fn from_records(games: Vec<Game>, players: Vec<Player>, boards: Vec<Board>) -> Self {
        let mut tables = Tables::default();
        for game in games {
            tables.put_game(game);
        }
        for player in players {
            tables.put_player(player);
        }
        for board in boards {
            tables.put_board(board);
        }
        tables
    }

    /// All records: games by creation time, players and boards in game order
    pub fn records(&self) -> (Vec<Game>, Vec<Player>, Vec<Board>) {
        let mut games: Vec<Game> = self.games.values().cloned().collect();
        games.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let players = games
            .iter()
            .flat_map(|g| self.players_in_game(&g.id))
            .cloned()
            .collect();
        let boards = games
            .iter()
            .flat_map(|g| self.boards_in_game(&g.id))
            .cloned()
            .collect();
        (games, players, boards)
    }

    pub fn game(&self, id: &str) -> Option<&Game> {
        self.games.get(id)
    }

    pub fn game_by_code(&self, code: &str) -> Option<&Game> {
        self.indexes
            .game_by_code
            .get(code)
            .and_then(|id| self.games.get(id))
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// Players of a game in join order
    pub fn players_in_game(&self, game_id: &str) -> Vec<&Player> {
        self.indexes
            .players_by_game
            .get(game_id)
            .map(|ids| ids.iter().filter_map(|id| self.players.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn player_by_session(&self, session_token: &str, game_id: &str) -> Option<&Player> {
        self.indexes
            .player_by_session
            .get(&(session_token.to_string(), game_id.to_string()))
            .and_then(|id| self.players.get(id))
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.get(id)
    }

    pub fn board_by_player(&self, player_id: &str) -> Option<&Board> {
        self.indexes
            .board_by_player
            .get(player_id)
            .and_then(|id| self.boards.get(id))
    }

    /// Boards of a game in creation order
    pub fn boards_in_game(&self, game_id: &str) -> Vec<&Board> {
        self.indexes
            .boards_by_game
            .get(game_id)
            .map(|ids| ids.iter().filter_map(|id| self.boards.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn put_game(&mut self, game: Game) {
        self.indexes
            .game_by_code
            .insert(game.code.clone(), game.id.clone());
        self.games.insert(game.id.clone(), game);
    }

    fn put_player(&mut self, player: Player) {
        self.indexes
            .players_by_game
            .entry(player.game_id.clone())
            .or_default()
            .push(player.id.clone());
        self.indexes.player_by_session.insert(
            (player.session_token.clone(), player.game_id.clone()),
            player.id.clone(),
        );
        self.players.insert(player.id.clone(), player);
    }

    fn put_board(&mut self, board: Board) {
        self.indexes
            .board_by_player
            .insert(board.player_id.clone(), board.id.clone());
        self.indexes
            .boards_by_game
            .entry(board.game_id.clone())
            .or_default()
            .push(board.id.clone());
        self.boards.insert(board.id.clone(), board);
    }

    fn remove_game(&mut self, id: &str) {
        if let Some(game) = self.games.remove(id) {
            self.indexes.game_by_code.remove(&game.code);
        }
    }

    fn remove_player(&mut self, id: &str) {
        if let Some(player) = self.players.remove(id) {
            if let Some(ids) = self.indexes.players_by_game.get_mut(&player.game_id) {
                ids.retain(|p| p != id);
            }
            self.indexes
                .player_by_session
                .remove(&(player.session_token, player.game_id));
        }
    }

    fn remove_board(&mut self, id: &str) {
        if let Some(board) = self.boards.remove(id) {
            self.indexes.board_by_player.remove(&board.player_id);
            if let Some(ids) = self.indexes.boards_by_game.get_mut(&board.game_id) {
                ids.retain(|b| b != id);
            }
        }
    }
}

enum Undo {
    InsertedGame(GameId),
    InsertedPlayer(PlayerId),
    InsertedBoard(BoardId),
    PatchedGame(Box<Game>),
    PatchedBoard(Box<Board>),
}

/// Write access to the tables for the duration of one transaction
pub struct Tx<'a> {
    tables: &'a mut Tables,
    undo: Vec<Undo>,
}

impl Deref for Tx<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &*self.tables
    }
}

impl Tx<'_> {
    pub fn insert_game(&mut self, game: Game) {
        self.undo.push(Undo::InsertedGame(game.id.clone()));
        self.tables.put_game(game);
    }

    pub fn insert_player(&mut self, player: Player) {
        self.undo.push(Undo::InsertedPlayer(player.id.clone()));
        self.tables.put_player(player);
    }

    pub fn insert_board(&mut self, board: Board) {
        self.undo.push(Undo::InsertedBoard(board.id.clone()));
        self.tables.put_board(board);
    }

    /// Apply `f` to a stored game and bump its version. The code must not change.
    pub fn patch_game<R>(&mut self, id: &str, f: impl FnOnce(&mut Game) -> R) -> GameResult<R> {
        let game = self.tables.games.get_mut(id).ok_or(GameError::GameNotFound)?;
        self.undo.push(Undo::PatchedGame(Box::new(game.clone())));
        let out = f(game);
        game.version += 1;
        Ok(out)
    }

    pub fn patch_board<R>(&mut self, id: &str, f: impl FnOnce(&mut Board) -> R) -> GameResult<R> {
        let board = self
            .tables
            .boards
            .get_mut(id)
            .ok_or(GameError::BoardNotFound)?;
        self.undo.push(Undo::PatchedBoard(Box::new(board.clone())));
        Ok(f(board))
    }

    fn rollback(mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::InsertedGame(id) => self.tables.remove_game(&id),
                Undo::InsertedPlayer(id) => self.tables.remove_player(&id),
                Undo::InsertedBoard(id) => self.tables.remove_board(&id),
                Undo::PatchedGame(game) => {
                    self.tables.games.insert(game.id.clone(), *game);
                }
                Undo::PatchedBoard(board) => {
                    self.tables.boards.insert(board.id.clone(), *board);
                }
            }
        }
    }
}

/// Shared handle to the tables
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.tables.read().await;
        f(&tables)
    }

    /// Run `f` as one atomic unit: either all of its writes land or none do.
    pub async fn transact<R>(
        &self,
        f: impl FnOnce(&mut Tx<'_>) -> GameResult<R>,
    ) -> GameResult<R> {
        let mut tables = self.tables.write().await;
        let mut tx = Tx {
            tables: &mut *tables,
            undo: Vec::new(),
        };
        match f(&mut tx) {
            Ok(out) => Ok(out),
            Err(e) => {
                tracing::debug!("Rolling back {} writes: {}", tx.undo.len(), e);
                tx.rollback();
                Err(e)
            }
        }
    }

    /// Swap in a whole new set of tables
    pub async fn replace(&self, tables: Tables) {
        *self.tables.write().await = tables;
    }
}
