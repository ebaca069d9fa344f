//! Side-to-move identification for two-player games.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two sides of a game.
///
/// Indices are 0-based: the side that moves first is `PlayerId::FIRST`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The side that moves first (Black in Othello and Checkers, Red in Connect-Four).
    pub const FIRST: PlayerId = PlayerId(0);

    /// The side that moves second.
    pub const SECOND: PlayerId = PlayerId(1);

    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// `1.0` for the first player, `-1.0` for the second.
    ///
    /// Converts first-player-relative scores to the perspective of this side.
    #[must_use]
    pub const fn sign(self) -> f32 {
        if self.0 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Both players in move order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::FIRST, Self::SECOND].into_iter()
    }

    /// Parse the single-digit form used by board text.
    #[must_use]
    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::FIRST),
            '1' => Some(Self::SECOND),
            _ => None,
        }
    }

    /// Single-digit form used by board text.
    #[must_use]
    pub fn to_digit(self) -> char {
        if self.0 == 0 {
            '0'
        } else {
            '1'
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(PlayerId::FIRST.opponent(), PlayerId::SECOND);
        assert_eq!(PlayerId::SECOND.opponent(), PlayerId::FIRST);
    }

    #[test]
    fn test_sign() {
        assert_eq!(PlayerId::FIRST.sign(), 1.0);
        assert_eq!(PlayerId::SECOND.sign(), -1.0);
    }

    #[test]
    fn test_digits() {
        for player in PlayerId::both() {
            assert_eq!(PlayerId::from_digit(player.to_digit()), Some(player));
        }
        assert_eq!(PlayerId::from_digit('2'), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PlayerId::SECOND), "Player 1");
    }
}
