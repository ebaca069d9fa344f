//! The capability set every game engine provides to the searches.
//!
//! Games implement [`Game`] to define:
//! - Legal moves for the side to move
//! - Reversible in-place move application
//! - Terminal detection, outcome and static evaluation
//! - Hashing, copying and text (de)serialization
//!
//! The searches call into `Game` and never interpret game-specific concepts
//! directly.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::core::{GameRng, ParseError, PlayerId, SearchError};

/// Magnitude of a decided game in [`Game::evaluate`].
pub const WIN_SCORE: f32 = 1_000_000.0;

/// Move list returned by move generation.
pub type MoveList<M> = SmallVec<[M; 16]>;

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }

    /// `1.0` for a win, `-1.0` for a loss, `0.0` for a draw.
    #[must_use]
    pub fn value_for(&self, player: PlayerId) -> f32 {
        match self {
            GameResult::Winner(p) if *p == player => 1.0,
            GameResult::Winner(_) => -1.0,
            GameResult::Draw => 0.0,
        }
    }

    /// Result from a first-player-relative score: positive means the first
    /// player won.
    #[must_use]
    pub fn from_score(score: i32) -> Self {
        match score.signum() {
            1 => GameResult::Winner(PlayerId::FIRST),
            -1 => GameResult::Winner(PlayerId::SECOND),
            _ => GameResult::Draw,
        }
    }
}

/// A two-player, perfect-information board game.
///
/// ## Implementation Notes
///
/// - `legal_moves`: never empty for a non-terminal position; games where
///   passing is legal return the pass move instead
/// - `apply`: fills the move's undo data from the current position before
///   mutating, so moves built from text work as well as generated ones
/// - `undo`: uses only the data stored in the move
/// - `evaluate`: always from the perspective of the side to move
/// - `Display`/`FromStr`: the board text format, lossless round trip
pub trait Game: Clone + fmt::Debug + fmt::Display + FromStr<Err = ParseError> + PartialEq {
    /// Move type with its self-describing undo payload.
    type Move: Clone + fmt::Debug + fmt::Display + FromStr<Err = ParseError> + PartialEq;

    /// Human-readable game name.
    const NAME: &'static str;

    /// Size of the policy vector indexed by [`Game::action_index`].
    const ACTION_SPACE: usize;

    /// Length of the vector returned by [`Game::encode`].
    const OBSERVATION_SIZE: usize;

    /// Side to move.
    fn to_move(&self) -> PlayerId;

    /// Number of moves applied since the starting position.
    fn move_counter(&self) -> u32;

    /// Legal moves for the side to move.
    fn legal_moves(&self) -> MoveList<Self::Move>;

    /// Apply a move in place, recording its undo data.
    fn apply(&mut self, mv: &mut Self::Move);

    /// Exact inverse of [`Game::apply`] for the same move.
    fn undo(&mut self, mv: &Self::Move);

    /// Whether the game has ended.
    fn is_over(&self) -> bool;

    /// Outcome of a finished game, `None` while it continues.
    fn result(&self) -> Option<GameResult>;

    /// Static evaluation from the perspective of the side to move.
    ///
    /// Finished games score `±WIN_SCORE` (or 0 for a draw).
    fn evaluate(&self) -> f32;

    /// Independent deep copy, optionally without hashing.
    #[must_use]
    fn copy(&self, disable_hash: bool) -> Self;

    /// Incrementally maintained fingerprint, `None` if hashing is disabled.
    fn hash(&self) -> Option<u64>;

    /// Fingerprint recomputed from scratch, `None` if hashing is disabled.
    fn full_hash(&self) -> Option<u64>;

    /// Policy index of a move in `0..ACTION_SPACE`.
    fn action_index(mv: &Self::Move) -> usize;

    /// Flat observation from the perspective of the side to move.
    fn encode(&self) -> Vec<f32>;

    // === Provided Methods ===

    /// Uniformly random legal move, `None` if there is none.
    fn random_move(&self, rng: &mut GameRng) -> Option<Self::Move> {
        let mut moves = self.legal_moves();
        rng.index(moves.len()).map(|i| moves.swap_remove(i))
    }

    /// Reorder moves for search, with the `preferred` action index first.
    ///
    /// The default keeps generation order apart from the preferred move.
    fn order_moves(&self, moves: &mut [Self::Move], preferred: Option<usize>) {
        if let Some(preferred) = preferred {
            if let Some(pos) = moves.iter().position(|m| Self::action_index(m) == preferred) {
                moves[..=pos].rotate_right(1);
            }
        }
    }

    /// Legal move with the given action index.
    fn find_move(&self, action: usize) -> Result<Self::Move, SearchError> {
        self.legal_moves()
            .into_iter()
            .find(|m| Self::action_index(m) == action)
            .ok_or(SearchError::IllegalMove(action))
    }

    /// Apply the legal move with the given action index and return it.
    fn play(&mut self, action: usize) -> Result<Self::Move, SearchError> {
        let mut mv = self.find_move(action)?;
        self.apply(&mut mv);
        Ok(mv)
    }

    /// Mask over the action space marking legal moves.
    fn action_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; Self::ACTION_SPACE];
        for mv in self.legal_moves() {
            mask[Self::action_index(&mv)] = true;
        }
        mask
    }
}
