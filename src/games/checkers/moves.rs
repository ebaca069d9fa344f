//! Checkers move type and its text form.

use std::fmt;
use std::str::FromStr;

use crate::core::bitboard::{index_of, Bitboard};
use crate::core::{ParseError, PlayerId};

/// Action index of the null move.
pub const NULL_INDEX: usize = 128;

const PLAYABLE: Bitboard = 0xFFFF_FFFF;

/// Direction slot (0..4) of a step or jump, `None` for impossible geometry.
///
/// Slots are ordered by vertical then horizontal direction, so a step and the
/// jump continuing it share a slot.
pub(crate) fn direction(start: Bitboard, end: Bitboard) -> Option<usize> {
    let start_idx = index_of(start) as i32;
    let offset = (start_idx >> 2) & 1;
    match index_of(end) as i32 - start_idx + offset {
        -4 | -9 | -8 => Some(0),
        -3 | -7 | -6 => Some(1),
        4 | 7 | 8 => Some(2),
        5 | 9 | 10 => Some(3),
        _ => None,
    }
}

/// A step, a single jump, or the null move.
///
/// Besides the start and end squares, a move records everything needed to
/// take it back: the captured square and whether it held a king, whether the
/// mover was promoted, and the mid-capture state and quiet-move counter
/// before the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CheckersMove {
    pub(crate) start: Bitboard,
    pub(crate) end: Bitboard,
    pub(crate) forced: bool,
    pub(crate) capture: bool,
    pub(crate) king_capture: bool,
    pub(crate) captured: Bitboard,
    pub(crate) promotion: bool,
    pub(crate) prev_capturing: Option<PlayerId>,
    pub(crate) prev_quiet: u8,
}

impl CheckersMove {
    /// Move between two single-bit squares; the rest is filled in when applied.
    #[must_use]
    pub const fn new(start: Bitboard, end: Bitboard) -> Self {
        Self {
            start,
            end,
            forced: false,
            capture: false,
            king_capture: false,
            captured: 0,
            promotion: false,
            prev_capturing: None,
            prev_quiet: 0,
        }
    }

    /// The null move, played by the side waiting out a multi-jump.
    #[must_use]
    pub const fn null() -> Self {
        Self::new(0, 0)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.start == 0
    }

    #[must_use]
    pub const fn start(&self) -> Bitboard {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Bitboard {
        self.end
    }

    #[must_use]
    pub const fn is_capture(&self) -> bool {
        self.capture
    }

    #[must_use]
    pub const fn is_promotion(&self) -> bool {
        self.promotion
    }

    /// Whether this jump continues a multi-jump from a forced square.
    #[must_use]
    pub const fn is_forced(&self) -> bool {
        self.forced
    }

    /// Square of the captured piece (0 unless a capture was applied).
    #[must_use]
    pub const fn captured(&self) -> Bitboard {
        self.captured
    }

    /// `start * 4 + direction`, or [`NULL_INDEX`].
    #[must_use]
    pub fn index(&self) -> usize {
        if self.is_null() {
            return NULL_INDEX;
        }
        match direction(self.start, self.end) {
            Some(slot) => index_of(self.start) as usize * 4 + slot,
            None => {
                debug_assert!(false, "move with impossible geometry: {self}");
                NULL_INDEX
            }
        }
    }
}

impl fmt::Display for CheckersMove {
    /// `index,start,end,forced,capture,kingCapture,captureMask,promotion,prevState,prevQuiet`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prev_state = self.prev_capturing.map_or('-', PlayerId::to_digit);
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{}",
            self.index(),
            self.start,
            self.end,
            self.forced,
            self.capture,
            self.king_capture,
            self.captured,
            self.promotion,
            prev_state,
            self.prev_quiet
        )
    }
}

impl FromStr for CheckersMove {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::Move(s.to_string());
        let fields: Vec<&str> = s.trim().split(',').collect();
        let [index, start, end, forced, capture, king_capture, captured, promotion, prev_state, prev_quiet] =
            fields.as_slice()
        else {
            return Err(err());
        };

        let prev_capturing = match *prev_state {
            "-" => None,
            digit => {
                let mut chars = digit.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(PlayerId::from_digit(c).ok_or_else(err)?),
                    _ => return Err(err()),
                }
            }
        };
        let prev_quiet: u8 = prev_quiet.parse().map_err(|_| err())?;
        let index: usize = index.parse().map_err(|_| err())?;

        let mut mv = Self::null();
        mv.prev_capturing = prev_capturing;
        mv.prev_quiet = prev_quiet;
        if index == NULL_INDEX {
            return Ok(mv);
        }

        mv.start = start.parse().map_err(|_| err())?;
        mv.end = end.parse().map_err(|_| err())?;
        mv.forced = forced.parse().map_err(|_| err())?;
        mv.capture = capture.parse().map_err(|_| err())?;
        mv.king_capture = king_capture.parse().map_err(|_| err())?;
        mv.captured = captured.parse().map_err(|_| err())?;
        mv.promotion = promotion.parse().map_err(|_| err())?;

        let single_square = |b: Bitboard| b.count_ones() == 1 && b & !PLAYABLE == 0;
        let expected = direction(mv.start, mv.end).map(|slot| index_of(mv.start) as usize * 4 + slot);
        if !single_square(mv.start) || !single_square(mv.end) || expected != Some(index) {
            return Err(err());
        }
        Ok(mv)
    }
}
