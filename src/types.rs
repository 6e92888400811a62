use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = String;
pub type BoardId = String;
pub type EventId = String;

pub const BOARD_SIZE: usize = 25;
pub const GRID_WIDTH: usize = 5;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Lobby,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub code: String,
    pub host_player_id: PlayerId,
    pub status: GameStatus,
    pub winner_id: Option<PlayerId>,
    /// Side-effect ("drinking") mode, fixed at creation
    pub side_effect_mode: bool,
    /// Append-only; entries only ever gain acknowledgers
    pub events: Vec<GameEvent>,
    pub created_at: String,
    /// Bumped on every patch so clients can discard stale snapshots
    pub version: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub game_id: GameId,
    pub name: String,
    pub session_token: String,
    pub is_host: bool,
    pub joined_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub squares: Vec<Square>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// Who has to perform a challenge.
///
/// Serialized as `you`, `anyone`, `anyOpponent`, `opponent1`..`opponent3`.
/// Opponent slots are 1-based positions in the board owner's opponent list
/// (all other players in join order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Actor {
    You,
    Anyone,
    AnyOpponent,
    Opponent(u8),
}

/// Highest opponent slot a challenge can name (four players at most)
pub const MAX_OPPONENT_SLOTS: u8 = (MAX_PLAYERS - 1) as u8;

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::You => f.write_str("you"),
            Actor::Anyone => f.write_str("anyone"),
            Actor::AnyOpponent => f.write_str("anyOpponent"),
            Actor::Opponent(slot) => write!(f, "opponent{}", slot),
        }
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> Self {
        actor.to_string()
    }
}

impl TryFrom<String> for Actor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "you" => Ok(Actor::You),
            "anyone" => Ok(Actor::Anyone),
            "anyOpponent" => Ok(Actor::AnyOpponent),
            other => other
                .strip_prefix("opponent")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|slot| (1..=MAX_OPPONENT_SLOTS).contains(slot))
                .map(Actor::Opponent)
                .ok_or_else(|| format!("unknown actor '{}'", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SideEffect {
    #[default]
    None,
    Minor,
    Major,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Square {
    pub challenge: String,
    pub difficulty: Difficulty,
    pub actor: Actor,
    pub marked: bool,
    #[serde(default)]
    pub side_effect: SideEffect,
}

/// One of the 12 winning lines of the grid.
///
/// Serialized as `row-0`..`row-4`, `col-0`..`col-4`, `diag-main`, `diag-anti`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Line {
    Row(u8),
    Column(u8),
    MainDiagonal,
    AntiDiagonal,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Row(i) => write!(f, "row-{}", i),
            Line::Column(i) => write!(f, "col-{}", i),
            Line::MainDiagonal => f.write_str("diag-main"),
            Line::AntiDiagonal => f.write_str("diag-anti"),
        }
    }
}

impl From<Line> for String {
    fn from(line: Line) -> Self {
        line.to_string()
    }
}

impl TryFrom<String> for Line {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let parse_index = |s: &str| {
            s.parse::<u8>()
                .ok()
                .filter(|i| usize::from(*i) < GRID_WIDTH)
        };
        match value.as_str() {
            "diag-main" => Ok(Line::MainDiagonal),
            "diag-anti" => Ok(Line::AntiDiagonal),
            other => {
                if let Some(i) = other.strip_prefix("row-").and_then(parse_index) {
                    Ok(Line::Row(i))
                } else if let Some(i) = other.strip_prefix("col-").and_then(parse_index) {
                    Ok(Line::Column(i))
                } else {
                    Err(format!("unknown line '{}'", value))
                }
            }
        }
    }
}

/// What happened, carrying only the fields that kind of event needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventKind {
    SideEffect { severity: SideEffect },
    NearWin { line: Line },
    Win,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEvent {
    pub id: EventId,
    /// Display name of the player whose mark caused the event
    pub player_name: String,
    #[serde(flatten)]
    pub kind: GameEventKind,
    pub created_at: String,
    #[serde(default)]
    pub acknowledged_by: BTreeSet<PlayerId>,
}

impl GameEvent {
    pub fn new(player_name: &str, kind: GameEventKind) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            player_name: player_name.to_string(),
            kind,
            created_at: chrono::Utc::now().to_rfc3339(),
            acknowledged_by: BTreeSet::new(),
        }
    }
}

/// Per-board progress summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerProgress {
    pub player_id: PlayerId,
    pub player_name: String,
    pub marked_count: usize,
    /// Most squares marked on any single line (0-5)
    pub best_line: usize,
}
