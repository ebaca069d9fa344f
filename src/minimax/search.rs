//! Negamax alpha-beta search.
//!
//! The search copies the caller's game once and walks the tree with
//! apply/undo on that copy. Values are always from the perspective of the
//! side to move at the node.

use std::time::Instant;

use tracing::{debug, trace};

use crate::core::SearchError;
use crate::rules::Game;

use super::config::AlphaBetaConfig;
use super::policy::{GameOrdering, LeafEvaluator, MoveOrdering, StaticEvaluator};
use super::stats::SearchStats;
use super::table::{Bound, TranspositionTable};

/// Initial search window half-width, above any evaluation.
pub const SEARCH_BOUND: f32 = 10_000_000.0;

/// Result of one alpha-beta search.
#[derive(Clone, Debug)]
pub struct SearchOutcome<M> {
    pub best_move: M,

    /// Root value for the side to move.
    pub value: f32,

    /// Depth of the last completed iteration (0 when the move was forced).
    pub depth: u32,
}

pub struct AlphaBetaSearch<G: Game> {
    config: AlphaBetaConfig,

    /// Allocated on the first search that can use it.
    table: Option<TranspositionTable>,

    ordering: Box<dyn MoveOrdering<G>>,

    leaf: Box<dyn LeafEvaluator<G>>,

    stats: SearchStats,

    best_root: Option<G::Move>,
}

impl<G: Game> AlphaBetaSearch<G> {
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self {
            config,
            table: None,
            ordering: Box::new(GameOrdering),
            leaf: Box::new(StaticEvaluator),
            stats: SearchStats::default(),
            best_root: None,
        }
    }

    /// Set a custom move ordering.
    pub fn with_ordering<M: MoveOrdering<G> + 'static>(mut self, ordering: M) -> Self {
        self.ordering = Box::new(ordering);
        self
    }

    /// Set a custom evaluation for depth-0 leaves.
    pub fn with_leaf_evaluator<L: LeafEvaluator<G> + 'static>(mut self, leaf: L) -> Self {
        self.leaf = Box::new(leaf);
        self
    }

    /// Search `game` to the configured depth and return the best move.
    ///
    /// A single legal move is returned without searching.
    pub fn search(&mut self, game: &G) -> Result<SearchOutcome<G::Move>, SearchError> {
        let start = Instant::now();
        self.stats.reset();

        if game.is_over() {
            return Err(SearchError::GameOver);
        }
        let mut moves = game.legal_moves();
        if moves.len() == 1 {
            self.stats.value = game.evaluate();
            debug!(game = G::NAME, "single legal move, search skipped");
            return Ok(SearchOutcome {
                best_move: moves.swap_remove(0),
                value: self.stats.value,
                depth: 0,
            });
        }
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        self.prepare_table(game);
        let mut work = game.copy(false);
        let target = self.config.depth.max(1);
        let first = if self.config.iterative_deepening { 1 } else { target };

        let mut preferred = None;
        let mut value = 0.0;
        for depth in first..=target {
            self.best_root = None;
            value = self.negamax(&mut work, depth, 0, -SEARCH_BOUND, SEARCH_BOUND, preferred)?;
            preferred = self.best_root.as_ref().map(G::action_index);
            self.stats.depth = depth;
            trace!(depth, value, nodes = self.stats.nodes, "iteration complete");
        }

        let best_move = self.best_root.take().ok_or(SearchError::NoLegalMoves)?;
        self.stats.value = value;
        self.stats.time_us = start.elapsed().as_micros() as u64;
        debug!(
            game = G::NAME,
            best = %best_move,
            value,
            nodes = self.stats.nodes,
            cache_hits = self.stats.cache_hits,
            time_us = self.stats.time_us,
            "alpha-beta search finished"
        );

        Ok(SearchOutcome {
            best_move,
            value,
            depth: target,
        })
    }

    /// Fresh table for this search, or none when it cannot be used.
    fn prepare_table(&mut self, game: &G) {
        if !self.config.use_transposition_table || game.hash().is_none() {
            self.table = None;
            return;
        }
        match self.table.as_mut() {
            Some(table) => table.clear(),
            None => self.table = Some(TranspositionTable::new(self.config.table_size_log2)),
        }
    }

    fn negamax(
        &mut self,
        game: &mut G,
        depth: u32,
        ply: u32,
        mut alpha: f32,
        beta: f32,
        preferred: Option<usize>,
    ) -> Result<f32, SearchError> {
        self.stats.nodes += 1;

        if game.is_over() {
            return Ok(game.evaluate());
        }
        if depth == 0 {
            return Ok(self.leaf.evaluate(game));
        }

        let is_root = ply == 0;
        let key = self.table.as_ref().and_then(|_| game.hash());
        if !is_root {
            if let (Some(key), Some(table)) = (key, self.table.as_ref()) {
                let cached = table
                    .probe(key)
                    .and_then(|entry| entry.usable(depth as i32, alpha, beta));
                if let Some(value) = cached {
                    self.stats.cache_hits += 1;
                    return Ok(value);
                }
            }
        }

        let mut moves = game.legal_moves();
        if moves.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        self.ordering
            .order(game, &mut moves, if is_root { preferred } else { None });

        let start_alpha = alpha;
        let mut best = -SEARCH_BOUND;
        for mut mv in moves {
            let (child_alpha, child_beta) = if self.config.use_pruning {
                (-beta, -alpha)
            } else {
                (-SEARCH_BOUND, SEARCH_BOUND)
            };

            game.apply(&mut mv);
            let result = self.negamax(game, depth - 1, ply + 1, child_alpha, child_beta, None);
            game.undo(&mv);
            let value = -result?;

            if value > best {
                best = value;
                alpha = alpha.max(best);
                if is_root {
                    self.best_root = Some(mv);
                }
                if self.config.use_pruning && alpha >= beta {
                    break;
                }
            }
        }

        if let (Some(key), Some(table)) = (key, self.table.as_mut()) {
            let bound = if best >= beta {
                Bound::Lower
            } else if best <= start_alpha {
                Bound::Upper
            } else {
                Bound::Exact
            };
            table.store(key, best, depth as i32, bound);
        }
        Ok(best)
    }

    #[must_use]
    pub fn config(&self) -> &AlphaBetaConfig {
        &self.config
    }

    /// Statistics of the last search.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub fn table(&self) -> Option<&TranspositionTable> {
        self.table.as_ref()
    }
}
