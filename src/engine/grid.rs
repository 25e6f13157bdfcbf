//! Grid state for one board: cell storage, move validation and win/stalemate
//! evaluation.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::layout::BoardLayout;
use super::models::{BoardSize, Cell, Mark, Position};
use crate::error::{GameError, Result};

/// Cells of one board, stored in canonical (row-major) order. Always holds
/// exactly `size²` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: BoardSize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size.cell_count()],
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn layout(&self) -> &'static BoardLayout {
        self.size.layout()
    }

    pub fn normalize_position(&self, raw: &str) -> Result<Position> {
        self.size.parse_position(raw)
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.index(self.size.dimension())]
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        !self.is_empty_at(pos)
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.cell(pos).is_empty()
    }

    /// Place `mark` on an empty cell.
    pub fn apply_mark(&mut self, pos: Position, mark: Mark) -> Result<()> {
        if self.is_occupied(pos) {
            return Err(GameError::PositionOccupied(pos));
        }
        self.set(pos, Cell::Mark(mark));
        Ok(())
    }

    /// Overwrite a cell regardless of its current value.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        let idx = pos.index(self.size.dimension());
        self.cells[idx] = cell;
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    pub fn evaluate_win(&self, mark: Mark) -> bool {
        let target = Cell::Mark(mark);
        self.layout()
            .win_lines
            .iter()
            .any(|line| line.iter().all(|&pos| self.cell(pos) == target))
    }

    /// True when exactly two distinct cell values are on the board. On a
    /// fresh board this flips on right after the first placement; later in
    /// the game it stops meaning "one move made".
    pub fn is_opening_state(&self) -> bool {
        self.cells.iter().collect::<HashSet<_>>().len() == 2
    }

    /// Number of distinct values among the given cells.
    pub fn distinct_count(&self, positions: &[Position]) -> usize {
        positions
            .iter()
            .map(|&pos| self.cell(pos))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Cells paired with their positions, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.layout()
            .cells
            .iter()
            .zip(self.cells.iter())
            .map(|(&pos, &cell)| (pos, cell))
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(pos, _)| pos)
            .collect()
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (pos, cell) in self.iter() {
            map.serialize_entry(&pos.to_string(), &cell.symbol().to_string())?;
        }
        map.end()
    }
}
