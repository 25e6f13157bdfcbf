//! Static board descriptors: canonical cell order, win-line table and the
//! distinguished cells the heuristic bot reasons about.

use once_cell::sync::Lazy;

use super::models::{BoardSize, Position};

const fn p(name: &str) -> Position {
    Position::named(name)
}

/// Everything the engine needs to know about one board size.
#[derive(Debug)]
pub struct BoardLayout {
    pub size: BoardSize,
    pub dimension: u8,
    /// a1, b1, c1, [d1], a2, ... (row-major).
    pub cells: Vec<Position>,
    /// Columns, then rows, then the main and anti diagonals.
    pub win_lines: Vec<Vec<Position>>,
    pub center: Position,
    pub primary_corner: Position,
    pub secondary_center: Position,
    /// Edge midpoints watched by the corner-defense trigger.
    pub edge_midpoints: [Position; 4],
    /// Corner placement order for corner defense.
    pub defense_corners: [Position; 4],
    /// Corners sampled by the side-defense trigger.
    pub side_corners: Vec<Position>,
    /// Edges sampled by the side-defense trigger.
    pub side_edges: Vec<Position>,
    /// Placement order for side defense.
    pub side_targets: [Position; 4],
    /// Opponent corner pairs that trigger the trap reply.
    pub trap_pairs: [(Position, Position); 2],
    /// `(first, second, play)`: if both are empty, play `play`.
    pub optimal_pairs: [(Position, Position, Position); 2],
}

fn canonical_cells(n: u8) -> Vec<Position> {
    (0..n)
        .flat_map(|row| (0..n).map(move |column| Position::new(column, row)))
        .collect()
}

fn win_lines(n: u8) -> Vec<Vec<Position>> {
    let mut lines = Vec::with_capacity(2 * n as usize + 2);
    for column in 0..n {
        lines.push((0..n).map(|row| Position::new(column, row)).collect());
    }
    for row in 0..n {
        lines.push((0..n).map(|column| Position::new(column, row)).collect());
    }
    lines.push((0..n).map(|i| Position::new(i, i)).collect());
    lines.push((0..n).map(|i| Position::new(i, n - 1 - i)).collect());
    lines
}

// The literal cells below are shared by both sizes except where noted; the
// 4x4 board reuses the 3x3 coordinates for most of its rules.
const EDGE_MIDPOINTS: [Position; 4] = [p("a2"), p("b1"), p("b3"), p("c2")];
const DEFENSE_CORNERS: [Position; 4] = [p("a1"), p("c1"), p("a3"), p("c3")];
const OPTIMAL_PAIRS: [(Position, Position, Position); 2] = [
    (p("b1"), p("b3"), p("b3")),
    (p("a2"), p("c2"), p("c2")),
];

pub static SMALL_LAYOUT: Lazy<BoardLayout> = Lazy::new(|| BoardLayout {
    size: BoardSize::Small,
    dimension: 3,
    cells: canonical_cells(3),
    win_lines: win_lines(3),
    center: p("b2"),
    primary_corner: p("a1"),
    secondary_center: p("a2"),
    edge_midpoints: EDGE_MIDPOINTS,
    defense_corners: DEFENSE_CORNERS,
    side_corners: vec![p("a1"), p("a3"), p("c1"), p("c3")],
    side_edges: EDGE_MIDPOINTS.to_vec(),
    side_targets: EDGE_MIDPOINTS,
    trap_pairs: [(p("a1"), p("c3")), (p("a3"), p("c1"))],
    optimal_pairs: OPTIMAL_PAIRS,
});

pub static LARGE_LAYOUT: Lazy<BoardLayout> = Lazy::new(|| BoardLayout {
    size: BoardSize::Large,
    dimension: 4,
    cells: canonical_cells(4),
    win_lines: win_lines(4),
    center: p("b2"),
    primary_corner: p("a1"),
    secondary_center: p("a2"),
    edge_midpoints: EDGE_MIDPOINTS,
    defense_corners: DEFENSE_CORNERS,
    side_corners: vec![p("a1"), p("a4"), p("d1"), p("d4")],
    side_edges: vec![
        p("a2"),
        p("a3"),
        p("b1"),
        p("b4"),
        p("c1"),
        p("c4"),
        p("d2"),
        p("d3"),
    ],
    side_targets: EDGE_MIDPOINTS,
    // Not the true opposite corners (a1/d4, a4/d1); kept as the game has
    // always played it.
    trap_pairs: [(p("a1"), p("c4")), (p("a4"), p("c1"))],
    optimal_pairs: OPTIMAL_PAIRS,
});

impl BoardSize {
    pub fn layout(self) -> &'static BoardLayout {
        match self {
            BoardSize::Small => &SMALL_LAYOUT,
            BoardSize::Large => &LARGE_LAYOUT,
        }
    }
}
