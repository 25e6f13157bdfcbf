//! Criterion benchmarks for the heuristic bot's move selection.
//!
//! Run with:
//!     cargo bench --bench heuristic_move

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use strife_game_engine::engine::bot_strategy::{BotStrategy, HeuristicStrategy};
use strife_game_engine::engine::grid::Grid;
use strife_game_engine::engine::models::{BoardSize, Mark, Mode};
use strife_game_engine::engine::session::GameSession;

/// Boards a few moves into a human-vs-computer game, built by replaying
/// first-empty human moves.
fn midgame_grid(size: BoardSize, human_moves: usize) -> Grid {
    let mut session = GameSession::new("bench", size, Mode::HumanVsComputer);
    for _ in 0..human_moves {
        let Some(next) = session.grid.empty_positions().first().map(|p| p.to_string()) else {
            break;
        };
        session.round(&next);
    }
    session.grid
}

fn bench_choose_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("choose_move");
    for size in [BoardSize::Small, BoardSize::Large] {
        for moves in [1, 3] {
            let grid = midgame_grid(size, moves);
            if grid.is_full() {
                continue;
            }
            let label = format!("{}_{}moves", size, moves);
            group.bench_with_input(BenchmarkId::from_parameter(label), &grid, |b, grid| {
                b.iter(|| HeuristicStrategy.choose_move(grid, Mark::COMPUTER, Mark::Player1))
            });
        }
    }
    group.finish();
}

fn bench_full_round(c: &mut Criterion) {
    c.bench_function("round_4x4_opening", |b| {
        b.iter(|| {
            let mut session = GameSession::new("bench", BoardSize::Large, Mode::HumanVsComputer);
            session.round("d4");
            session
        })
    });
}

criterion_group!(benches, bench_choose_move, bench_full_round);
criterion_main!(benches);
