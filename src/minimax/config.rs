//! Alpha-beta configuration parameters.

use serde::{Deserialize, Serialize};

/// Alpha-beta configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaBetaConfig {
    /// Search depth in plies.
    pub depth: u32,

    /// Search depths 1..=depth, trying the previous best root move first.
    pub iterative_deepening: bool,

    /// Probe and store the transposition table (needs a hashed game).
    pub use_transposition_table: bool,

    /// Cut off when alpha >= beta. Disabling gives the same value, slower.
    pub use_pruning: bool,

    /// Transposition table holds `2^table_size_log2` entries.
    pub table_size_log2: u32,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            depth: 6,
            iterative_deepening: false,
            use_transposition_table: true,
            use_pruning: true,
            table_size_log2: 20,
        }
    }
}

impl AlphaBetaConfig {
    /// Create a config searching to a fixed depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_iterative_deepening(mut self, enabled: bool) -> Self {
        self.iterative_deepening = enabled;
        self
    }

    pub fn with_transposition_table(mut self, enabled: bool) -> Self {
        self.use_transposition_table = enabled;
        self
    }

    pub fn with_pruning(mut self, enabled: bool) -> Self {
        self.use_pruning = enabled;
        self
    }

    pub fn with_table_size_log2(mut self, size_log2: u32) -> Self {
        self.table_size_log2 = size_log2;
        self
    }
}
