//! Othello move type and its text forms.

use std::fmt;
use std::str::FromStr;

use crate::core::bitboard::{bit, index_of, Bitboard};
use crate::core::ParseError;

/// Action index of the pass move.
pub const PASS_INDEX: usize = 64;

/// A disc placement or a pass.
///
/// Carries the discs it flips and the consecutive-pass count before it was
/// played, which is everything needed to take it back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OthelloMove {
    pub(crate) position: Bitboard,
    pub(crate) flips: Bitboard,
    pub(crate) prev_passes: u8,
}

impl OthelloMove {
    /// Placement on a single-bit `position`; flips are filled in when applied.
    #[must_use]
    pub const fn place(position: Bitboard) -> Self {
        Self {
            position,
            flips: 0,
            prev_passes: 0,
        }
    }

    /// The pass move.
    #[must_use]
    pub const fn pass() -> Self {
        Self::place(0)
    }

    /// Move for an action index (`64` is the pass).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            PASS_INDEX => Some(Self::pass()),
            i if i < PASS_INDEX => Some(Self::place(bit(i as u32))),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_pass(&self) -> bool {
        self.position == 0
    }

    /// Single-bit mask of the placed disc (0 for a pass).
    #[must_use]
    pub const fn position(&self) -> Bitboard {
        self.position
    }

    /// Discs turned over by this move.
    #[must_use]
    pub const fn flips(&self) -> Bitboard {
        self.flips
    }

    /// Cell index, or [`PASS_INDEX`].
    #[must_use]
    pub const fn index(&self) -> usize {
        if self.is_pass() {
            PASS_INDEX
        } else {
            index_of(self.position) as usize
        }
    }

    /// Algebraic notation: column letter then row number (`d3`), `pa` for pass.
    #[must_use]
    pub fn algebraic(&self) -> String {
        if self.is_pass() {
            return "pa".to_string();
        }
        let index = self.index() as u8;
        let col = (b'a' + index % 8) as char;
        let row = (b'1' + index / 8) as char;
        format!("{col}{row}")
    }

    /// Parse algebraic notation.
    pub fn from_algebraic(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text == "pa" {
            return Ok(Self::pass());
        }
        match text.as_bytes() {
            [col @ b'a'..=b'h', row @ b'1'..=b'8'] => {
                let index = (row - b'1') * 8 + (col - b'a');
                Ok(Self::place(bit(u32::from(index))))
            }
            _ => Err(ParseError::Move(text.to_string())),
        }
    }
}

impl fmt::Display for OthelloMove {
    /// `index,prevPasses,flipMask`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.index(), self.prev_passes, self.flips)
    }
}

impl FromStr for OthelloMove {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Move(s.to_string());
        let fields: Vec<&str> = s.trim().split(',').collect();
        let [index, prev_passes, flips] = fields.as_slice() else {
            return Err(err());
        };

        let index: usize = index.parse().map_err(|_| err())?;
        let mut mv = Self::from_index(index).ok_or_else(err)?;
        mv.prev_passes = prev_passes.parse().map_err(|_| err())?;
        mv.flips = flips.parse().map_err(|_| err())?;
        if mv.prev_passes > 2 || mv.flips & mv.position != 0 || (mv.is_pass() && mv.flips != 0) {
            return Err(err());
        }
        Ok(mv)
    }
}
