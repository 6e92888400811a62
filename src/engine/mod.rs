//! Pure game rules: challenge catalog, board generation, line evaluation
//! and mark-event derivation. Nothing here touches the store.

pub mod catalog;
pub mod events;
pub mod generator;
pub mod lines;

pub use catalog::Catalog;
pub use events::{derive_events, DerivedEvents, MarkContext};
pub use generator::{assemble_board, assemble_boards, generate_challenge, Challenge};
pub use lines::{best_line_progress, check_win, close_lines, winning_line, LINES};
