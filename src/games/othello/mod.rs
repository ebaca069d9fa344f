//! Othello (Reversi) on an 8x8 bit board.
//!
//! - Black moves first from the standard four-disc center
//! - A placement is legal iff it brackets at least one line of opponent discs
//! - A side with no placement must pass; two consecutive passes or a full
//!   board end the game, and the side with more discs wins
//!
//! Evaluation uses a positional weight table ([`PositionalWeights`]) with a
//! corner-and-mobility alternative.

mod game;
mod moves;

pub use game::{Othello, PositionalWeights, BLACK, DEFAULT_REGIONS, WHITE};
pub use moves::{OthelloMove, PASS_INDEX};
