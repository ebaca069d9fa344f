//! Incremental Zobrist hashing.
//!
//! Each (piece type, square) pair owns one random 64-bit key, and one more key
//! stands for "second player to move". A position's fingerprint is the XOR of
//! the keys of every occupied (type, square) pair, plus the player key when it
//! applies. Because XOR is its own inverse, applying and undoing a move both
//! update the fingerprint with the same deltas.
//!
//! Key tables are generated from an explicit seed and shared between engine
//! copies through an `Arc`, so cloning a hashed engine stays cheap.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::bitboard::{pop_next_index, Bitboard};

/// Seed used by the game engines when no explicit table is supplied.
pub const DEFAULT_ZOBRIST_SEED: u64 = 0;

/// Random keys for every (piece type, square) pair plus the player key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZobristKeys {
    keys: Vec<u64>,
    squares: usize,
    player: u64,
}

impl ZobristKeys {
    /// Generate keys for `piece_types` types over `squares` squares.
    #[must_use]
    pub fn new(piece_types: usize, squares: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let keys = (0..piece_types * squares).map(|_| rng.gen()).collect();
        Self {
            keys,
            squares,
            player: rng.gen(),
        }
    }

    /// Generate a shared table.
    #[must_use]
    pub fn shared(piece_types: usize, squares: usize, seed: u64) -> Arc<Self> {
        Arc::new(Self::new(piece_types, squares, seed))
    }

    /// Key for one (type, square) pair.
    #[inline]
    #[must_use]
    pub fn key(&self, piece_type: usize, square: u32) -> u64 {
        self.keys[piece_type * self.squares + square as usize]
    }

    /// The player-to-move key.
    #[inline]
    #[must_use]
    pub fn player_key(&self) -> u64 {
        self.player
    }

    /// XOR of the keys of every set square of `mask` for one piece type.
    #[inline]
    #[must_use]
    pub fn mask_key(&self, piece_type: usize, mut mask: Bitboard) -> u64 {
        let mut key = 0;
        while let Some(square) = pop_next_index(&mut mask) {
            key ^= self.key(piece_type, square);
        }
        key
    }

    /// Fingerprint of a full position computed from scratch.
    ///
    /// `layers[t]` is the occupancy mask of piece type `t`.
    #[must_use]
    pub fn hash_position(&self, layers: &[Bitboard], second_to_move: bool) -> u64 {
        let mut key = layers
            .iter()
            .enumerate()
            .fold(0, |acc, (piece_type, &mask)| acc ^ self.mask_key(piece_type, mask));
        if second_to_move {
            key ^= self.player;
        }
        key
    }

    /// Number of piece types covered.
    #[must_use]
    pub fn piece_types(&self) -> usize {
        self.keys.len() / self.squares.max(1)
    }
}

/// Rolling fingerprint bound to a key table.
#[derive(Clone, Debug)]
pub struct ZobristHash {
    keys: Arc<ZobristKeys>,
    key: u64,
}

impl ZobristHash {
    /// Start from the empty fingerprint.
    #[must_use]
    pub fn new(keys: Arc<ZobristKeys>) -> Self {
        Self { keys, key: 0 }
    }

    /// Start from a position's full fingerprint.
    #[must_use]
    pub fn from_position(keys: Arc<ZobristKeys>, layers: &[Bitboard], second_to_move: bool) -> Self {
        let key = keys.hash_position(layers, second_to_move);
        Self { keys, key }
    }

    /// XOR the keys of every square in `delta` for one piece type.
    #[inline]
    pub fn update_position(&mut self, piece_type: usize, delta: Bitboard) {
        self.key ^= self.keys.mask_key(piece_type, delta);
    }

    /// Toggle the player-to-move key.
    #[inline]
    pub fn update_player(&mut self) {
        self.key ^= self.keys.player_key();
    }

    /// Current fingerprint.
    #[inline]
    #[must_use]
    pub fn key(&self) -> u64 {
        self.key
    }

    /// The underlying key table.
    #[must_use]
    pub fn keys(&self) -> &Arc<ZobristKeys> {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_deterministic() {
        let a = ZobristKeys::new(3, 64, 7);
        let b = ZobristKeys::new(3, 64, 7);
        let c = ZobristKeys::new(3, 64, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.piece_types(), 3);
    }

    #[test]
    fn test_update_is_self_inverse() {
        let mut hash = ZobristHash::new(ZobristKeys::shared(2, 64, 1));
        hash.update_position(0, 0b1011);
        hash.update_player();
        assert_ne!(hash.key(), 0);
        hash.update_player();
        hash.update_position(0, 0b1011);
        assert_eq!(hash.key(), 0);
    }

    #[test]
    fn test_incremental_matches_scratch() {
        let keys = ZobristKeys::shared(2, 64, 3);
        let mut hash = ZobristHash::new(keys.clone());
        hash.update_position(0, 0b0110);
        hash.update_position(1, 0b1000);
        hash.update_player();
        assert_eq!(hash.key(), keys.hash_position(&[0b0110, 0b1000], true));

        let rebuilt = ZobristHash::from_position(keys, &[0b0110, 0b1000], true);
        assert_eq!(rebuilt.key(), hash.key());
    }

    #[test]
    fn test_distinct_types_have_distinct_keys() {
        let keys = ZobristKeys::new(2, 64, 0);
        assert_ne!(keys.key(0, 5), keys.key(1, 5));
        assert_ne!(keys.mask_key(0, 1 << 5), keys.mask_key(1, 1 << 5));
    }
}
