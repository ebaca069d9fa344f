//! # board-search
//!
//! Bitboard game engines with alpha-beta and batched MCTS search.
//!
//! ## Design Principles
//!
//! 1. **Bitboards**: Every position is a handful of 64-bit masks. Moves are
//!    generated with shifts and masks, and each move carries the data needed
//!    to take it back exactly.
//!
//! 2. **Search-Agnostic Games**: Searches only talk to the [`Game`] trait.
//!    Othello, Checkers and Connect-Four plug in without search changes.
//!
//! 3. **Explicit Randomness**: All random choices flow from seeded
//!    generators, so a search with a fixed seed is reproducible.
//!
//! ## Architecture
//!
//! - **Alpha-Beta**: Negamax with pruning, iterative deepening and a
//!   Zobrist-keyed transposition table.
//!
//! - **Batched MCTS**: Leaves are selected in batches under virtual loss and
//!   evaluated together by a [`PolicyOracle`]; oracle values are blended with
//!   random rollouts.
//!
//! - **Sequential Value Search**: Root moves sampled by prior, each followed
//!   by a short rollout whose end position the oracle values in one batch.
//!
//! ## Modules
//!
//! - `core`: Bitboard helpers, Zobrist hashing, players, RNG, errors
//! - `rules`: The `Game` trait, results and perft
//! - `games`: Othello, Checkers and Connect-Four engines
//! - `nn`: Policy/value oracle interface and observation encoding
//! - `minimax`: Alpha-beta search with a transposition table
//! - `mcts`: Batched Monte Carlo Tree Search
//! - `svs`: Flat prior-sampled rollout search
//! - `players`: Move sources for playing games

pub mod core;
pub mod rules;
pub mod games;
pub mod nn;
pub mod minimax;
pub mod mcts;
pub mod svs;
pub mod players;

// Re-export commonly used types
pub use crate::core::{
    Bitboard, GameRng, ParseError, PlayerId, SearchError,
    ZobristHash, ZobristKeys, DEFAULT_ZOBRIST_SEED,
};

pub use crate::rules::{perft, Game, GameResult, MoveList, WIN_SCORE};

pub use crate::games::{
    Checkers, CheckersMove, ConnectFour, ConnectFourMove,
    Othello, OthelloMove, PositionalWeights,
};

pub use crate::nn::{HeuristicOracle, OracleError, OracleOutput, PolicyOracle, UniformOracle};

pub use crate::minimax::{AlphaBetaConfig, AlphaBetaSearch, SearchOutcome, TranspositionTable};

pub use crate::mcts::{
    MCTSConfig, MCTSSearch, MCTSTree, MCTSNode, NodeId,
    TreeStats, SelectionPolicy, RolloutPolicy, PUCT, UCB1, RandomRollout,
};

pub use crate::svs::{SVSConfig, SVSSearch};

pub use crate::players::{GreedyPlayer, MoveSource, PolicyPlayer, RandomPlayer};
