//! Static challenge phrase pools, one per difficulty tier.

use crate::types::{Difficulty, BOARD_SIZE};

/// A challenge phrase in both grammatical persons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// Used when the board owner must do it ("score > 4 points in a turn")
    pub you_form: &'static str,
    /// Used for anyone else ("scores > 4 points in a turn")
    pub they_form: &'static str,
}

pub const fn action(you_form: &'static str, they_form: &'static str) -> Action {
    Action {
        you_form,
        they_form,
    }
}

pub const EASY_ACTIONS: &[Action] = &[
    action("score > 4 points in a turn", "scores > 4 points in a turn"),
    action("score > 5 points in a turn", "scores > 5 points in a turn"),
    action("score > 6 points in a turn", "scores > 6 points in a turn"),
    action("score > 7 points in a turn", "scores > 7 points in a turn"),
    action("score > 8 points in a turn", "scores > 8 points in a turn"),
    action("play a consonant ending word", "plays a consonant ending word"),
    action("play a consonant starting word", "plays a consonant starting word"),
    action("play a vowel ending word", "plays a vowel ending word"),
    action("play a vowel starting word", "plays a vowel starting word"),
    action("use a DoubleLetter square", "uses a DoubleLetter square"),
    action("use a 1-point tile", "uses a 1-point tile"),
    action(
        "connect a word to an existing tile",
        "connects a word to an existing tile",
    ),
    action("play a word containing 'I'", "plays a word containing 'I'"),
    action("play a word containing 'A'", "plays a word containing 'A'"),
    action("play a word containing 'E'", "plays a word containing 'E'"),
    action("play a word containing 'T'", "plays a word containing 'T'"),
];

pub const MEDIUM_ACTIONS: &[Action] = &[
    action("score > 12 points in a turn", "scores > 12 points in a turn"),
    action(
        "add a prefix to an existing word",
        "adds a prefix to an existing word",
    ),
    action(
        "add a suffix to an existing word",
        "adds a suffix to an existing word",
    ),
    action("use a TripleLetter square", "uses a TripleLetter square"),
    action("use a DoubleWord square", "uses a DoubleWord square"),
    action("use a 2-point tile", "uses a 2-point tile"),
    action(
        "play a word touching the board edge",
        "plays a word touching the board edge",
    ),
    action("play a 2-letter word", "plays a 2-letter word"),
    action("play a word containing 'S'", "plays a word containing 'S'"),
    action("play a word containing 'C'", "plays a word containing 'C'"),
    action("play a word containing 'L'", "plays a word containing 'L'"),
    action("play a word containing 'U'", "plays a word containing 'U'"),
    action("play a word containing 'O'", "plays a word containing 'O'"),
];

pub const HARD_ACTIONS: &[Action] = &[
    action("score > 20 points in a turn", "scores > 20 points in a turn"),
    action("use a tile worth 4+ points", "uses a tile worth 4+ points"),
    action(
        "connect a word to 2+ existing tiles",
        "connects a word to 2+ existing tiles",
    ),
    action(
        "play a word longer than 6 letters",
        "plays a word longer than 6 letters",
    ),
    action(
        "play a word touching a board corner",
        "plays a word touching a board corner",
    ),
];

/// Squares of each tier on every board
pub const EASY_QUOTA: usize = 13;
pub const MEDIUM_QUOTA: usize = 8;
pub const HARD_QUOTA: usize = 4;

const _: () = assert!(EASY_QUOTA + MEDIUM_QUOTA + HARD_QUOTA == BOARD_SIZE);

/// The phrase pools boards are drawn from. Every tier holds at least one phrase.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    easy: &'static [Action],
    medium: &'static [Action],
    hard: &'static [Action],
}

impl Catalog {
    pub const STANDARD: Catalog = Catalog {
        easy: EASY_ACTIONS,
        medium: MEDIUM_ACTIONS,
        hard: HARD_ACTIONS,
    };

    /// None if any tier is empty
    pub fn new(
        easy: &'static [Action],
        medium: &'static [Action],
        hard: &'static [Action],
    ) -> Option<Self> {
        if easy.is_empty() || medium.is_empty() || hard.is_empty() {
            return None;
        }
        Some(Self { easy, medium, hard })
    }

    pub fn actions(&self, difficulty: Difficulty) -> &'static [Action] {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::STANDARD
    }
}

pub fn quota(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => EASY_QUOTA,
        Difficulty::Medium => MEDIUM_QUOTA,
        Difficulty::Hard => HARD_QUOTA,
    }
}
