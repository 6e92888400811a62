//! Single-challenge generation and whole-board assembly.

use super::catalog::{quota, Catalog};
use crate::types::{Actor, Difficulty, SideEffect, Square, BOARD_SIZE, MAX_OPPONENT_SLOTS};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

/// Draws per square before a duplicate is accepted
pub const MAX_UNIQUE_ATTEMPTS: usize = 50;

/// Side-effect squares per board: one major, the rest minor
pub const SIDE_EFFECT_SQUARES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Challenge {
    pub actor: Actor,
    pub text: String,
}

/// Draw one challenge of the given tier.
///
/// `opponents` are the other players of the board owner, in join order;
/// hard challenges may name one of the first three.
pub fn generate_challenge<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    difficulty: Difficulty,
    opponents: &[String],
) -> Challenge {
    let is_self = rng.random_bool(0.5);
    let actor = if is_self {
        Actor::You
    } else {
        match difficulty {
            Difficulty::Easy => Actor::Anyone,
            Difficulty::Medium => Actor::AnyOpponent,
            Difficulty::Hard if opponents.is_empty() => Actor::AnyOpponent,
            Difficulty::Hard => {
                let slots = opponents.len().min(usize::from(MAX_OPPONENT_SLOTS));
                Actor::Opponent(rng.random_range(1..=slots as u8))
            }
        }
    };

    let pool = catalog.actions(difficulty);
    let action = pool[rng.random_range(0..pool.len())];
    let form = if actor == Actor::You {
        action.you_form
    } else {
        action.they_form
    };

    Challenge {
        actor,
        text: capitalize(form),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build one board per player, in the order of `player_names`.
pub fn assemble_boards<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    player_names: &[String],
    side_effect_mode: bool,
) -> Vec<Vec<Square>> {
    (0..player_names.len())
        .map(|owner| {
            let opponents: Vec<String> = player_names
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != owner)
                .map(|(_, name)| name.clone())
                .collect();
            assemble_board(rng, catalog, &opponents, side_effect_mode)
        })
        .collect()
}

/// Fill the tier quotas with (actor, text)-unique challenges, shuffle, then tag side effects.
pub fn assemble_board<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    opponents: &[String],
    side_effect_mode: bool,
) -> Vec<Square> {
    let mut used: HashSet<Challenge> = HashSet::new();
    let mut squares = Vec::with_capacity(BOARD_SIZE);

    for difficulty in Difficulty::ALL {
        for _ in 0..quota(difficulty) {
            let challenge = draw_unique(rng, catalog, difficulty, opponents, &used);
            used.insert(challenge.clone());
            squares.push(Square {
                challenge: challenge.text,
                difficulty,
                actor: challenge.actor,
                marked: false,
                side_effect: SideEffect::None,
            });
        }
    }

    squares.shuffle(rng);

    if side_effect_mode {
        let picks = index::sample(rng, squares.len(), SIDE_EFFECT_SQUARES.min(squares.len()));
        for (n, i) in picks.into_iter().enumerate() {
            squares[i].side_effect = if n == 0 {
                SideEffect::Major
            } else {
                SideEffect::Minor
            };
        }
    }

    squares
}

fn draw_unique<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &Catalog,
    difficulty: Difficulty,
    opponents: &[String],
    used: &HashSet<Challenge>,
) -> Challenge {
    for _ in 0..MAX_UNIQUE_ATTEMPTS {
        let challenge = generate_challenge(rng, catalog, difficulty, opponents);
        if !used.contains(&challenge) {
            return challenge;
        }
    }
    tracing::debug!(
        "No unique {:?} challenge after {} attempts, accepting a duplicate",
        difficulty,
        MAX_UNIQUE_ATTEMPTS
    );
    generate_challenge(rng, catalog, difficulty, opponents)
}
