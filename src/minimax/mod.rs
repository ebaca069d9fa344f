//! Alpha-beta minimax search.
//!
//! Negamax with a fixed-size transposition table, optional iterative
//! deepening, and pluggable move ordering and leaf evaluation.
//!
//! ## Usage
//!
//! ```rust
//! use board_search::games::ConnectFour;
//! use board_search::minimax::{AlphaBetaConfig, AlphaBetaSearch};
//!
//! let game = ConnectFour::new();
//! let config = AlphaBetaConfig::default().with_depth(4).with_table_size_log2(16);
//! let mut search = AlphaBetaSearch::new(config);
//! let outcome = search.search(&game).unwrap();
//! println!("{} ({})", outcome.best_move, search.stats());
//! ```

pub mod config;
pub mod policy;
pub mod search;
pub mod stats;
pub mod table;

pub use config::AlphaBetaConfig;
pub use policy::{
    GameOrdering, LeafEvaluator, MoveOrdering, NoOrdering, OracleEvaluator, OracleOrdering,
    StaticEvaluator,
};
pub use search::{AlphaBetaSearch, SearchOutcome, SEARCH_BOUND};
pub use stats::SearchStats;
pub use table::{Bound, Entry, TranspositionTable};
