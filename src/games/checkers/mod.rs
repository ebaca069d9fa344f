//! English draughts (8x8 checkers).
//!
//! - Black moves first; men step diagonally forward, kings both ways
//! - Captures are forced; after a capture the same piece must keep jumping
//!   while it can, with the opponent answering each jump with a null move
//! - A man reaching the far row is crowned
//! - A side without pieces or moves loses; thirty quiet moves or a lone king
//!   against a lone king is a draw

mod game;
mod moves;

pub use game::{Checkers, BLACK, QUIET_MOVE_LIMIT, SQUARES, WHITE};
pub use moves::{CheckersMove, NULL_INDEX};
