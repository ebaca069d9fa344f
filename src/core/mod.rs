//! Core building blocks: bit boards, hashing, players, RNG, errors.
//!
//! Everything here is game-agnostic. The game engines in `games` are built
//! from these primitives.

pub mod bitboard;
pub mod error;
pub mod player;
pub mod rng;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use error::{ParseError, SearchError};
pub use player::PlayerId;
pub use rng::GameRng;
pub use zobrist::{ZobristHash, ZobristKeys, DEFAULT_ZOBRIST_SEED};
