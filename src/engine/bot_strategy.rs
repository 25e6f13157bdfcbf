//! Bot strategy trait and the fixed-priority heuristic opponent.

use std::fmt;

use tracing::debug;

use super::grid::Grid;
use super::models::{Cell, Mark, Position};

/// A bot strategy selects the next cell to mark given the current grid.
///
/// Implementations must only return empty cells, and return `None` only when
/// the grid is full.
pub trait BotStrategy: Send + Sync {
    fn choose_move(&self, grid: &Grid, own: Mark, opponent: Mark) -> Option<Position>;
}

/// Which link of the heuristic chain produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Opening,
    WinNow,
    BlockNow,
    CornerDefense,
    SideDefense,
    OppositeCornerTrap,
    Optimal,
    LastResort,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::Opening => "opening",
            Rule::WinNow => "win_now",
            Rule::BlockNow => "block_now",
            Rule::CornerDefense => "corner_defense",
            Rule::SideDefense => "side_defense",
            Rule::OppositeCornerTrap => "opposite_corner_trap",
            Rule::Optimal => "optimal",
            Rule::LastResort => "last_resort",
        };
        f.write_str(name)
    }
}

/// The computer opponent: an ordered chain of board heuristics, not a search.
/// The first rule that matches decides the move.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl HeuristicStrategy {
    /// Run the chain and report which rule fired.
    pub fn choose_with_rule(
        &self,
        grid: &Grid,
        own: Mark,
        opponent: Mark,
    ) -> Option<(Position, Rule)> {
        if grid.is_full() {
            return None;
        }
        let layout = grid.layout();

        if grid.is_opening_state() {
            if let Some(pos) = first_empty(grid, &[layout.center, layout.primary_corner]) {
                return Some((pos, Rule::Opening));
            }
        }

        // Both completions are computed up front, before either is played.
        let win = completing_cell(grid, own);
        let block = completing_cell(grid, opponent);
        if let Some(pos) = win {
            return Some((pos, Rule::WinNow));
        }
        if let Some(pos) = block {
            return Some((pos, Rule::BlockNow));
        }

        if corner_defense_triggered(grid) {
            return Some(
                first_empty(grid, &layout.defense_corners)
                    .map(|pos| (pos, Rule::CornerDefense))
                    .unwrap_or_else(|| optimal_move(grid)),
            );
        }

        if side_defense_triggered(grid, own) {
            return Some(
                first_empty(grid, &layout.side_targets)
                    .map(|pos| (pos, Rule::SideDefense))
                    .unwrap_or_else(|| optimal_move(grid)),
            );
        }

        if opposite_corners_taken(grid, opponent) && grid.is_empty_at(layout.secondary_center) {
            return Some((layout.secondary_center, Rule::OppositeCornerTrap));
        }

        Some(optimal_move(grid))
    }
}

impl BotStrategy for HeuristicStrategy {
    fn choose_move(&self, grid: &Grid, own: Mark, opponent: Mark) -> Option<Position> {
        self.choose_with_rule(grid, own, opponent).map(|(pos, rule)| {
            debug!(position = %pos, rule = %rule, "bot chose move");
            pos
        })
    }
}

fn first_empty(grid: &Grid, candidates: &[Position]) -> Option<Position> {
    candidates.iter().copied().find(|&pos| grid.is_empty_at(pos))
}

/// The open cell of the first win line holding `size - 1` copies of `mark`
/// and one empty cell.
fn completing_cell(grid: &Grid, mark: Mark) -> Option<Position> {
    let needed = grid.size().dimension() as usize - 1;
    grid.layout().win_lines.iter().find_map(|line| {
        let owned = line.iter().filter(|&&pos| grid.cell(pos) == Cell::Mark(mark)).count();
        let open = line.iter().copied().find(|&pos| grid.is_empty_at(pos));
        match open {
            Some(pos) if owned == needed => Some(pos),
            _ => None,
        }
    })
}

fn corner_defense_triggered(grid: &Grid) -> bool {
    grid.layout()
        .edge_midpoints
        .iter()
        .filter(|&&pos| grid.is_empty_at(pos))
        .count()
        == 1
}

fn side_defense_triggered(grid: &Grid, own: Mark) -> bool {
    let layout = grid.layout();
    grid.cell(layout.center) == Cell::Mark(own)
        && grid.distinct_count(&layout.side_corners) == 2
        && grid.distinct_count(&layout.side_edges) == 3
}

fn opposite_corners_taken(grid: &Grid, opponent: Mark) -> bool {
    let held = Cell::Mark(opponent);
    grid.layout()
        .trap_pairs
        .iter()
        .any(|&(a, b)| grid.cell(a) == held && grid.cell(b) == held)
}

/// Fallback used when no tactical rule applies. Caller guarantees the grid
/// has at least one empty cell.
fn optimal_move(grid: &Grid) -> (Position, Rule) {
    for &(first, second, play) in &grid.layout().optimal_pairs {
        if grid.is_empty_at(first) && grid.is_empty_at(second) {
            return (play, Rule::Optimal);
        }
    }
    let last = grid
        .layout()
        .cells
        .iter()
        .rev()
        .copied()
        .find(|&pos| grid.is_empty_at(pos))
        .unwrap_or(grid.layout().center);
    (last, Rule::LastResort)
}
