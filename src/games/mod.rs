//! Game implementations.
//!
//! Each game is a concrete type implementing [`crate::rules::Game`].

pub mod checkers;
pub mod connect_four;
pub mod othello;

pub use checkers::{Checkers, CheckersMove};
pub use connect_four::{ConnectFour, ConnectFourMove};
pub use othello::{Othello, OthelloMove, PositionalWeights};
