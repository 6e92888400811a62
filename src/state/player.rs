use super::game::normalize_code;
use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;

/// Longest display name accepted, in characters
pub const MAX_NAME_CHARS: usize = 24;

/// Trim a display name and check it is usable
pub fn normalize_name(raw: &str) -> GameResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(GameError::InvalidName("name is empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(GameError::InvalidName(format!(
            "name is longer than {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

/// Result of joining a lobby
#[derive(Debug, Clone)]
pub struct JoinedGame {
    pub game: Game,
    pub player: Player,
}

impl AppState {
    /// Add a player to a game that is still in its lobby
    pub async fn join_game(
        &self,
        code: &str,
        player_name: &str,
        session_token: &str,
    ) -> GameResult<JoinedGame> {
        let code = normalize_code(code)?;
        let name = normalize_name(player_name)?;

        let joined = self
            .store
            .transact(|tx| {
                let game = tx.game_by_code(&code).cloned().ok_or(GameError::GameNotFound)?;
                if game.status != GameStatus::Lobby {
                    return Err(GameError::GameAlreadyStarted);
                }

                let players = tx.players_in_game(&game.id);
                if players.len() >= MAX_PLAYERS {
                    return Err(GameError::GameFull);
                }
                if players.iter().any(|p| p.session_token == session_token) {
                    return Err(GameError::AlreadyJoined);
                }
                let lowered = name.to_lowercase();
                if players.iter().any(|p| p.name.to_lowercase() == lowered) {
                    return Err(GameError::NameTaken);
                }

                let player = Player {
                    id: ulid::Ulid::new().to_string(),
                    game_id: game.id.clone(),
                    name: name.clone(),
                    session_token: session_token.to_string(),
                    is_host: false,
                    joined_at: chrono::Utc::now().to_rfc3339(),
                };
                tx.insert_player(player.clone());
                Ok(JoinedGame { game, player })
            })
            .await?;

        tracing::info!("{} joined game {}", joined.player.name, joined.game.code);
        self.broadcast_game_state(&joined.game.id).await;
        Ok(joined)
    }

    pub async fn get_player(&self, player_id: &str) -> GameResult<Player> {
        self.store
            .read(|t| t.player(player_id).cloned())
            .await
            .ok_or(GameError::PlayerNotFound)
    }

    /// Players in join order. The game must exist.
    pub async fn get_players_in_game(&self, game_id: &str) -> GameResult<Vec<Player>> {
        self.store
            .read(|t| {
                t.game(game_id)
                    .map(|_| t.players_in_game(game_id).into_iter().cloned().collect())
            })
            .await
            .ok_or(GameError::GameNotFound)
    }

    /// Find the player a session created in the game with this code
    pub async fn get_player_by_session(
        &self,
        code: &str,
        session_token: &str,
    ) -> GameResult<(Game, Player)> {
        let code = normalize_code(code)?;
        self.store
            .read(|t| {
                let game = t.game_by_code(&code).ok_or(GameError::GameNotFound)?;
                let player = t
                    .player_by_session(session_token, &game.id)
                    .ok_or(GameError::PlayerNotFound)?;
                Ok((game.clone(), player.clone()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Bob  ").unwrap(), "Bob");
        assert!(matches!(normalize_name(""), Err(GameError::InvalidName(_))));
        assert!(matches!(normalize_name(" \t "), Err(GameError::InvalidName(_))));

        let exactly = "é".repeat(MAX_NAME_CHARS);
        assert_eq!(normalize_name(&exactly).unwrap(), exactly);
        let too_long = "x".repeat(MAX_NAME_CHARS + 1);
        assert!(matches!(normalize_name(&too_long), Err(GameError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_join_game() {
        let state = AppState::with_seed(10);
        let created = state.create_game("Alice", "s1", false).await.unwrap();

        let joined = state
            .join_game(&created.game.code.to_lowercase(), " Bob ", "s2")
            .await
            .unwrap();
        assert_eq!(joined.player.name, "Bob");
        assert!(!joined.player.is_host);
        assert_eq!(joined.game.id, created.game.id);

        let players = state.get_players_in_game(&created.game.id).await.unwrap();
        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_join_unknown_code() {
        let state = AppState::with_seed(10);
        let result = state.join_game("ZZZZZZ", "Bob", "s2").await;
        assert_eq!(result.unwrap_err(), GameError::GameNotFound);
    }

    #[tokio::test]
    async fn test_join_rejects_duplicate_name_case_insensitive() {
        let state = AppState::with_seed(10);
        let created = state.create_game("Alice", "s1", false).await.unwrap();

        let result = state.join_game(&created.game.code, "ALICE", "s2").await;
        assert_eq!(result.unwrap_err(), GameError::NameTaken);
        assert_eq!(
            state.get_players_in_game(&created.game.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_join_same_session_twice() {
        let state = AppState::with_seed(10);
        let created = state.create_game("Alice", "s1", false).await.unwrap();
        state.join_game(&created.game.code, "Bob", "s2").await.unwrap();

        let result = state.join_game(&created.game.code, "Robert", "s2").await;
        assert_eq!(result.unwrap_err(), GameError::AlreadyJoined);
    }

    #[tokio::test]
    async fn test_lobby_is_capped_at_four() {
        let state = AppState::with_seed(10);
        let created = state.create_game("Alice", "s1", false).await.unwrap();
        for (i, name) in ["Bob", "Carol", "Dave"].iter().enumerate() {
            state
                .join_game(&created.game.code, name, &format!("s{}", i + 2))
                .await
                .unwrap();
        }

        let fifth = state.join_game(&created.game.code, "Eve", "s5").await;
        assert_eq!(fifth.unwrap_err(), GameError::GameFull);
        assert_eq!(
            state.get_players_in_game(&created.game.id).await.unwrap().len(),
            MAX_PLAYERS
        );
    }

    #[tokio::test]
    async fn test_join_after_start() {
        let state = AppState::with_seed(10);
        let created = state.create_game("Alice", "s1", false).await.unwrap();
        state.join_game(&created.game.code, "Bob", "s2").await.unwrap();
        state
            .start_game(&created.game.id, &created.player.id)
            .await
            .unwrap();

        let late = state.join_game(&created.game.code, "Carol", "s3").await;
        assert_eq!(late.unwrap_err(), GameError::GameAlreadyStarted);
    }

    #[tokio::test]
    async fn test_player_lookup_by_session() {
        let state = AppState::with_seed(10);
        let created = state.create_game("Alice", "s1", false).await.unwrap();
        let joined = state.join_game(&created.game.code, "Bob", "s2").await.unwrap();

        let (game, player) = state
            .get_player_by_session(&created.game.code, "s2")
            .await
            .unwrap();
        assert_eq!(game.id, created.game.id);
        assert_eq!(player.id, joined.player.id);

        assert_eq!(
            state
                .get_player_by_session(&created.game.code, "unknown")
                .await
                .unwrap_err(),
            GameError::PlayerNotFound
        );
        assert_eq!(
            state.get_player("missing").await.unwrap_err(),
            GameError::PlayerNotFound
        );
    }
}
