//! Caller-visible failures of game operations.

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// How a failure should be presented to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; nothing was looked up or changed
    Validation,
    /// A precondition on the current state was violated
    Conflict,
    /// A referenced game, player or board does not exist
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Game not found")]
    GameNotFound,

    #[error("Player not found")]
    PlayerNotFound,

    #[error("Board not found")]
    BoardNotFound,

    #[error("Invalid game code: {0}")]
    InvalidCode(String),

    #[error("Invalid player name: {0}")]
    InvalidName(String),

    #[error("Invalid square index {index} (board has {len} squares)")]
    InvalidIndex { index: usize, len: usize },

    #[error("Name already taken")]
    NameTaken,

    #[error("Game is full")]
    GameFull,

    #[error("This session already has a player in the game")]
    AlreadyJoined,

    #[error("Game has already started")]
    GameAlreadyStarted,

    #[error("Only the host can start the game")]
    NotHost,

    #[error("Game is not in the lobby")]
    NotInLobby,

    #[error("Need at least {min} players to start")]
    NotEnoughPlayers { min: usize },

    #[error("Maximum {max} players allowed")]
    TooManyPlayers { max: usize },

    #[error("Game is not in progress")]
    GameNotPlaying,

    #[error("No free game code found after {0} attempts")]
    CodeSpaceExhausted(usize),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;

        match self {
            GameNotFound | PlayerNotFound | BoardNotFound => ErrorKind::NotFound,
            InvalidCode(_) | InvalidName(_) | InvalidIndex { .. } => ErrorKind::Validation,
            NameTaken
            | GameFull
            | AlreadyJoined
            | GameAlreadyStarted
            | NotHost
            | NotInLobby
            | NotEnoughPlayers { .. }
            | TooManyPlayers { .. }
            | GameNotPlaying
            | CodeSpaceExhausted(_) => ErrorKind::Conflict,
        }
    }

    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        use GameError::*;

        match self {
            GameNotFound => "GAME_NOT_FOUND",
            PlayerNotFound => "PLAYER_NOT_FOUND",
            BoardNotFound => "BOARD_NOT_FOUND",
            InvalidCode(_) => "INVALID_CODE",
            InvalidName(_) => "INVALID_NAME",
            InvalidIndex { .. } => "INVALID_INDEX",
            NameTaken => "NAME_TAKEN",
            GameFull => "GAME_FULL",
            AlreadyJoined => "ALREADY_JOINED",
            GameAlreadyStarted => "GAME_ALREADY_STARTED",
            NotHost => "NOT_HOST",
            NotInLobby => "NOT_IN_LOBBY",
            NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            TooManyPlayers { .. } => "TOO_MANY_PLAYERS",
            GameNotPlaying => "GAME_NOT_PLAYING",
            CodeSpaceExhausted(_) => "CODE_SPACE_EXHAUSTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GameError::GameNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            GameError::InvalidIndex { index: 30, len: 25 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(GameError::NameTaken.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_messages_name_the_precondition() {
        assert_eq!(GameError::NameTaken.to_string(), "Name already taken");
        assert_eq!(
            GameError::NotEnoughPlayers { min: 2 }.to_string(),
            "Need at least 2 players to start"
        );
        assert_eq!(GameError::GameFull.code(), "GAME_FULL");
    }
}
