//! Connect-Four on a 7-wide, 6-high board.
//!
//! Red moves first. Discs drop to the lowest empty cell of a column; four in
//! a row horizontally, vertically or diagonally wins, and a full board is a
//! draw.

mod game;

pub use game::{ConnectFour, ConnectFourMove, HEIGHT, RED, WIDTH, YELLOW};
