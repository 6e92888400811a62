//! Winning-line evaluation on the 5x5 grid.

use crate::types::{Line, Square, GRID_WIDTH};

/// Rows, then columns, then the two diagonals
pub const LINES: [Line; 12] = [
    Line::Row(0),
    Line::Row(1),
    Line::Row(2),
    Line::Row(3),
    Line::Row(4),
    Line::Column(0),
    Line::Column(1),
    Line::Column(2),
    Line::Column(3),
    Line::Column(4),
    Line::MainDiagonal,
    Line::AntiDiagonal,
];

impl Line {
    /// Square indices covered by this line
    pub fn indices(self) -> [usize; GRID_WIDTH] {
        let mut out = [0; GRID_WIDTH];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = match self {
                Line::Row(r) => usize::from(r) * GRID_WIDTH + k,
                Line::Column(c) => k * GRID_WIDTH + usize::from(c),
                Line::MainDiagonal => k * GRID_WIDTH + k,
                Line::AntiDiagonal => k * GRID_WIDTH + (GRID_WIDTH - 1 - k),
            };
        }
        out
    }

    /// Marked squares on this line; squares missing from a short board count as unmarked
    pub fn marked_count(self, squares: &[Square]) -> usize {
        self.indices()
            .iter()
            .filter(|&&i| squares.get(i).is_some_and(|s| s.marked))
            .count()
    }
}

pub fn check_win(squares: &[Square]) -> bool {
    winning_line(squares).is_some()
}

/// First fully marked line, if any
pub fn winning_line(squares: &[Square]) -> Option<Line> {
    LINES
        .into_iter()
        .find(|line| line.marked_count(squares) == GRID_WIDTH)
}

pub fn best_line_progress(squares: &[Square]) -> usize {
    LINES
        .iter()
        .map(|line| line.marked_count(squares))
        .max()
        .unwrap_or(0)
}

/// Lines one mark away from a win, in `LINES` order
pub fn close_lines(squares: &[Square]) -> Vec<Line> {
    LINES
        .into_iter()
        .filter(|line| line.marked_count(squares) == GRID_WIDTH - 1)
        .collect()
}
