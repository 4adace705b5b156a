//! Win detection.
//!
//! Only the cell just played is inspected. Each of the four axes through it
//! is scanned outward in both directions, at most `win_length - 1` steps each
//! way, so a check costs O(win_length) regardless of board size.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::board::{Board, Position, Symbol, WIN_LENGTH};

/// Axis directions: horizontal, vertical, diagonal (↘/↖), anti-diagonal (↙/↗).
const AXES: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Outcome of evaluating a board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Draw,
    InProgress,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Draw => "draw",
            Self::InProgress => "in_progress",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Win | Self::Draw)
    }
}

/// Decides win/draw/continue for the cell just played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinDetector {
    win_length: usize,
}

impl Default for WinDetector {
    fn default() -> Self {
        Self::new(WIN_LENGTH)
    }
}

impl WinDetector {
    pub fn new(win_length: usize) -> Self {
        Self { win_length }
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// Evaluate `board` after a mark was placed at `last`.
    #[instrument(level = "trace", skip(self, board))]
    pub fn evaluate(&self, board: &Board, last: Position) -> GameResult {
        if self.is_winning(board, last) {
            GameResult::Win
        } else if board.is_full() {
            GameResult::Draw
        } else {
            GameResult::InProgress
        }
    }

    /// Check whether the mark at `origin` completes a run on any axis.
    pub fn is_winning(&self, board: &Board, origin: Position) -> bool {
        let symbol = match board.get(origin) {
            Some(s) if !s.is_empty() => s,
            _ => return false,
        };

        AXES.iter()
            .any(|&axis| self.run_length(board, origin, symbol, axis) >= self.win_length)
    }

    /// Length of the run through `origin` along one axis. Each axis starts
    /// from its own count of 1.
    fn run_length(
        &self,
        board: &Board,
        origin: Position,
        symbol: Symbol,
        (dx, dy): (i32, i32),
    ) -> usize {
        let mut count = 1 + self.walk(board, origin, symbol, dx, dy);
        if count < self.win_length {
            count += self.walk(board, origin, symbol, -dx, -dy);
        }
        count
    }

    /// Count matching cells stepping away from `origin`, stopping at the
    /// first mismatch, the board edge, or after `win_length - 1` steps.
    fn walk(&self, board: &Board, origin: Position, symbol: Symbol, dx: i32, dy: i32) -> usize {
        let max_steps = self.win_length.saturating_sub(1);
        let mut steps = 0;
        let mut pos = origin;

        while steps < max_steps {
            pos = pos.offset(dx, dy);
            if board.get(pos) != Some(symbol) {
                break;
            }
            steps += 1;
        }

        steps
    }
}
