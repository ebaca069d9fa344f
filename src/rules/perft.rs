//! Perft: exhaustive leaf counting for move-generation checks.
//!
//! Terminal positions count as leaves even when depth remains.

use std::time::{Duration, Instant};

use tracing::debug;

use super::engine::Game;

/// Leaf count of one perft depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerftRow {
    pub depth: u32,
    pub leaves: u64,
    pub elapsed: Duration,
}

/// Count the leaves of the game tree `depth` plies below `game`.
///
/// The position is explored with apply/undo and left unchanged.
pub fn perft<G: Game>(game: &mut G, depth: u32) -> u64 {
    if depth == 0 || game.is_over() {
        return 1;
    }

    let mut moves = game.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut leaves = 0;
    for mv in moves.iter_mut() {
        game.apply(mv);
        leaves += perft(game, depth - 1);
        game.undo(mv);
    }
    leaves
}

/// Perft for every depth in `1..=max_depth`, with timings.
pub fn perft_report<G: Game>(game: &mut G, max_depth: u32) -> Vec<PerftRow> {
    (1..=max_depth)
        .map(|depth| {
            let start = Instant::now();
            let leaves = perft(game, depth);
            let elapsed = start.elapsed();
            debug!(game = G::NAME, depth, leaves, elapsed_us = elapsed.as_micros() as u64, "perft");
            PerftRow {
                depth,
                leaves,
                elapsed,
            }
        })
        .collect()
}
