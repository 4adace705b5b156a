//! Board state.
//!
//! A square grid of cells plus a running count of empty cells. The only
//! mutation path is [`Board::place`], which keeps the counter consistent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default board dimension.
pub const BOARD_SIZE: usize = 15;

/// Default run length required to win.
pub const WIN_LENGTH: usize = 5;

/// One of the two player marks. Also names the two seats of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Cross,
    Nought,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Cross, Slot::Nought];

    /// The opposing slot.
    pub fn other(self) -> Self {
        match self {
            Self::Cross => Self::Nought,
            Self::Nought => Self::Cross,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cross => "cross",
            Self::Nought => "nought",
        }
    }
}

/// Contents of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    #[default]
    Empty,
    Cross,
    Nought,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Cross => "cross",
            Self::Nought => "nought",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Slot> for Symbol {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Cross => Symbol::Cross,
            Slot::Nought => Symbol::Nought,
        }
    }
}

/// Board coordinate. Signed so that client-supplied moves such as `(-1, 0)`
/// can be represented and rejected rather than wrapped.
///
/// `x` selects the row and `y` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position shifted by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({"x": self.x, "y": self.y})
    }
}

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalPlacement {
    #[error("position ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied { x: i32, y: i32 },
}

/// N×N grid with an empty-cell counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Symbol>,
    empty_count: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_SIZE)
    }
}

impl Board {
    /// Create an empty `size`×`size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Symbol::Empty; size * size],
            empty_count: size * size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn empty_count(&self) -> usize {
        self.empty_count
    }

    pub fn is_full(&self) -> bool {
        self.empty_count == 0
    }

    /// Check if position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Read a cell. `None` when the position is off the board.
    pub fn get(&self, pos: Position) -> Option<Symbol> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Check if the cell at `pos` is on the board and empty.
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(|s| s.is_empty())
    }

    /// Write `slot`'s mark into an empty cell.
    pub fn place(&mut self, pos: Position, slot: Slot) -> Result<(), IllegalPlacement> {
        let idx = self.index(pos).ok_or(IllegalPlacement::OutOfBounds {
            x: pos.x,
            y: pos.y,
        })?;

        if !self.cells[idx].is_empty() {
            return Err(IllegalPlacement::CellOccupied { x: pos.x, y: pos.y });
        }

        self.cells[idx] = slot.into();
        self.empty_count -= 1;
        Ok(())
    }

    /// Rows of cells, `x` outermost.
    pub fn rows(&self) -> impl Iterator<Item = &[Symbol]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Convert grid to JSON (array of rows of symbol names).
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows()
            .map(|row| {
                let cells: Vec<serde_json::Value> =
                    row.iter().map(|s| serde_json::json!(s.as_str())).collect();
                serde_json::Value::Array(cells)
            })
            .collect();
        serde_json::Value::Array(rows)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        if x < self.size && y < self.size {
            Some(x * self.size + y)
        } else {
            None
        }
    }
}
