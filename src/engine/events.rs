//! Derives the notable events caused by marking one square.

use super::lines::{check_win, close_lines};
use crate::types::{GameEvent, GameEventKind, SideEffect, Square};

/// Everything needed to evaluate a single mark
#[derive(Debug, Clone, Copy)]
pub struct MarkContext<'a> {
    /// The board after the mark was applied
    pub squares: &'a [Square],
    pub index: usize,
    pub player_name: &'a str,
    pub side_effect_mode: bool,
    /// The game's event log so far, used to suppress repeated near-win notices
    pub existing: &'a [GameEvent],
}

#[derive(Debug, Clone, Default)]
pub struct DerivedEvents {
    /// In append order: side effect, near wins (in line order), win
    pub events: Vec<GameEvent>,
    pub won: bool,
}

/// Events newly caused by the mark described in `ctx`.
///
/// Returns nothing when the square at `ctx.index` is not marked; unmarking
/// never produces events.
pub fn derive_events(ctx: MarkContext<'_>) -> DerivedEvents {
    let Some(square) = ctx.squares.get(ctx.index) else {
        return DerivedEvents::default();
    };
    if !square.marked {
        return DerivedEvents::default();
    }

    let mut events = Vec::new();

    if ctx.side_effect_mode && square.side_effect != SideEffect::None {
        events.push(GameEvent::new(
            ctx.player_name,
            GameEventKind::SideEffect {
                severity: square.side_effect,
            },
        ));
    }

    for line in close_lines(ctx.squares) {
        let already_flagged = ctx.existing.iter().any(|e| {
            e.player_name == ctx.player_name
                && matches!(e.kind, GameEventKind::NearWin { line: l } if l == line)
        });
        if !already_flagged {
            events.push(GameEvent::new(
                ctx.player_name,
                GameEventKind::NearWin { line },
            ));
        }
    }

    let won = check_win(ctx.squares);
    if won {
        events.push(GameEvent::new(ctx.player_name, GameEventKind::Win));
    }

    DerivedEvents { events, won }
}
