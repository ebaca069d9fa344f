//! Game trait and rule-level utilities.
//!
//! Games implement `Game` to define:
//! - Legal moves for each position
//! - How moves modify the position, and how to take them back
//! - Win/loss/draw conditions and static evaluation
//!
//! The searches call into `Game` but never interpret game-specific
//! concepts directly.

pub mod engine;
pub mod perft;

pub use engine::{Game, GameResult, MoveList, WIN_SCORE};
pub use perft::{perft, perft_report, PerftRow};
