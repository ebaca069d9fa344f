//! Othello engine on two 64-bit masks.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::bitboard::{self, positions, shift_to_neighbor, Bitboard, NEIGHBOR_OFFSETS};
use crate::core::{ParseError, PlayerId, ZobristHash, ZobristKeys, DEFAULT_ZOBRIST_SEED};
use crate::rules::{Game, GameResult, MoveList, WIN_SCORE};

use super::moves::{OthelloMove, PASS_INDEX};

/// Black moves first.
pub const BLACK: PlayerId = PlayerId::FIRST;
pub const WHITE: PlayerId = PlayerId::SECOND;

// Hash piece types.
const BLACK_TYPE: usize = 0;
const WHITE_TYPE: usize = 1;
const EMPTY_TYPE: usize = 2;
const PIECE_TYPES: usize = 3;

const CORNERS: Bitboard = 0x8100_0000_0000_0081;

/// Default positional weights: square regions and their per-disc value.
pub const DEFAULT_REGIONS: [(Bitboard, f32); 7] = [
    (0x0000_3C3C_3C3C_0000, -1.0),
    (0x003C_4242_4242_3C00, -2.0),
    (0x1800_0081_8100_0018, 5.0),
    (0x2400_8100_0081_0024, 10.0),
    (0x4281_0000_0000_8142, -20.0),
    (0x0042_0000_0000_4200, -50.0),
    (0x8100_0000_0000_0081, 100.0),
];

/// Positional weight table for Othello evaluation.
///
/// Each region is a square mask with the value of one disc placed on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionalWeights {
    pub regions: Vec<(Bitboard, f32)>,
}

impl PositionalWeights {
    /// Weight table from explicit regions.
    #[must_use]
    pub fn new(regions: Vec<(Bitboard, f32)>) -> Self {
        Self { regions }
    }

    /// Value of a disc on the given single-bit square.
    #[must_use]
    pub fn weight_of(&self, position: Bitboard) -> f32 {
        region_weight(&self.regions, position)
    }
}

impl Default for PositionalWeights {
    fn default() -> Self {
        Self::new(DEFAULT_REGIONS.to_vec())
    }
}

fn region_weight(regions: &[(Bitboard, f32)], position: Bitboard) -> f32 {
    regions
        .iter()
        .find(|(mask, _)| mask & position != 0)
        .map_or(0.0, |&(_, weight)| weight)
}

fn legal_mask_for(own: Bitboard, opp: Bitboard) -> Bitboard {
    let empty = !(own | opp);
    let mut moves = 0;
    for offset in NEIGHBOR_OFFSETS {
        let mut line = shift_to_neighbor(own, offset) & opp;
        for _ in 0..5 {
            line |= shift_to_neighbor(line, offset) & opp;
        }
        moves |= shift_to_neighbor(line, offset) & empty;
    }
    moves
}

fn flips_for(own: Bitboard, opp: Bitboard, position: Bitboard) -> Bitboard {
    let mut flips = 0;
    for offset in NEIGHBOR_OFFSETS {
        let mut line = 0;
        let mut cursor = shift_to_neighbor(position, offset);
        while cursor & opp != 0 {
            line |= cursor;
            cursor = shift_to_neighbor(cursor, offset);
        }
        if cursor & own != 0 {
            flips |= line;
        }
    }
    flips
}

/// Othello position.
///
/// Black and White discs are disjoint masks; `passes` counts consecutive
/// passes (two end the game).
#[derive(Clone, Debug)]
pub struct Othello {
    black: Bitboard,
    white: Bitboard,
    to_move: PlayerId,
    passes: u8,
    move_counter: u32,
    hash: Option<ZobristHash>,
}

impl Othello {
    /// Standard starting position, hashed with the default key table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keys(Some(Self::default_keys()))
    }

    /// Standard starting position with an explicit key table (or none).
    #[must_use]
    pub fn with_keys(keys: Option<Arc<ZobristKeys>>) -> Self {
        let white = bitboard::square(3, 3) | bitboard::square(4, 4);
        let black = bitboard::square(3, 4) | bitboard::square(4, 3);
        Self::from_parts(black, white, BLACK, 0, 0, keys)
    }

    /// Key table used by [`Othello::new`].
    #[must_use]
    pub fn default_keys() -> Arc<ZobristKeys> {
        ZobristKeys::shared(PIECE_TYPES, 64, DEFAULT_ZOBRIST_SEED)
    }

    /// Arbitrary position from disc masks.
    pub fn from_masks(black: Bitboard, white: Bitboard, to_move: PlayerId) -> Result<Self, ParseError> {
        if black & white != 0 {
            return Err(ParseError::Board("black and white discs overlap".to_string()));
        }
        Ok(Self::from_parts(black, white, to_move, 0, 0, Some(Self::default_keys())))
    }

    fn from_parts(
        black: Bitboard,
        white: Bitboard,
        to_move: PlayerId,
        passes: u8,
        move_counter: u32,
        keys: Option<Arc<ZobristKeys>>,
    ) -> Self {
        let mut game = Self {
            black,
            white,
            to_move,
            passes,
            move_counter,
            hash: None,
        };
        let layers = game.layers();
        game.hash = keys.map(|keys| ZobristHash::from_position(keys, &layers, to_move == WHITE));
        game
    }

    fn layers(&self) -> [Bitboard; PIECE_TYPES] {
        [self.black, self.white, self.empty()]
    }

    /// Discs of one side.
    #[must_use]
    pub fn pieces(&self, player: PlayerId) -> Bitboard {
        if player == BLACK {
            self.black
        } else {
            self.white
        }
    }

    #[must_use]
    pub fn empty(&self) -> Bitboard {
        !(self.black | self.white)
    }

    /// Consecutive passes so far.
    #[must_use]
    pub fn passes(&self) -> u8 {
        self.passes
    }

    fn own_and_opp(&self) -> (Bitboard, Bitboard) {
        (self.pieces(self.to_move), self.pieces(self.to_move.opponent()))
    }

    fn sides_mut(&mut self, player: PlayerId) -> (&mut Bitboard, &mut Bitboard) {
        if player == BLACK {
            (&mut self.black, &mut self.white)
        } else {
            (&mut self.white, &mut self.black)
        }
    }

    /// Empty squares where the side to move may place a disc.
    #[must_use]
    pub fn legal_mask(&self) -> Bitboard {
        let (own, opp) = self.own_and_opp();
        legal_mask_for(own, opp)
    }

    /// Discs the side to move would flip by playing `position`.
    #[must_use]
    pub fn flips_for(&self, position: Bitboard) -> Bitboard {
        let (own, opp) = self.own_and_opp();
        flips_for(own, opp, position)
    }

    /// Black discs minus White discs.
    #[must_use]
    pub fn material_diff(&self) -> i32 {
        self.black.count_ones() as i32 - self.white.count_ones() as i32
    }

    /// Late phase: at least 80% of the board filled, or every corner taken.
    #[must_use]
    pub fn is_endgame(&self) -> bool {
        let occupied = self.black | self.white;
        occupied.count_ones() * 5 >= 64 * 4 || occupied & CORNERS == CORNERS
    }

    fn terminal_score(&self) -> f32 {
        self.material_diff().signum() as f32 * WIN_SCORE * self.to_move.sign()
    }

    /// Positional evaluation with a custom weight table.
    #[must_use]
    pub fn evaluate_with(&self, weights: &PositionalWeights) -> f32 {
        if self.is_over() {
            return self.terminal_score();
        }
        self.positional_score(&weights.regions)
    }

    fn positional_score(&self, regions: &[(Bitboard, f32)]) -> f32 {
        let score: f32 = regions
            .iter()
            .map(|&(mask, weight)| {
                let diff = (self.black & mask).count_ones() as i32 - (self.white & mask).count_ones() as i32;
                diff as f32 * weight
            })
            .sum();
        score * self.to_move.sign()
    }

    /// Corner-and-mobility evaluation.
    ///
    /// Ten points per corner advantage plus the mobility balance
    /// `(mB - mW) / (mB + mW)`, from the side to move's perspective.
    #[must_use]
    pub fn mobility_evaluate(&self) -> f32 {
        if self.is_over() {
            return self.terminal_score();
        }
        let corners = (self.black & CORNERS).count_ones() as f32 - (self.white & CORNERS).count_ones() as f32;
        let black_mobility = legal_mask_for(self.black, self.white).count_ones() as f32;
        let white_mobility = legal_mask_for(self.white, self.black).count_ones() as f32;
        let total = black_mobility + white_mobility;
        let mobility = if total > 0.0 {
            (black_mobility - white_mobility) / total
        } else {
            0.0
        };
        (10.0 * corners + mobility) * self.to_move.sign()
    }
}

impl Default for Othello {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Othello {
    fn eq(&self, other: &Self) -> bool {
        self.black == other.black
            && self.white == other.white
            && self.to_move == other.to_move
            && self.passes == other.passes
            && self.move_counter == other.move_counter
    }
}

impl Game for Othello {
    type Move = OthelloMove;

    const NAME: &'static str = "othello";
    const ACTION_SPACE: usize = PASS_INDEX + 1;
    const OBSERVATION_SIZE: usize = 128;

    fn to_move(&self) -> PlayerId {
        self.to_move
    }

    fn move_counter(&self) -> u32 {
        self.move_counter
    }

    fn legal_moves(&self) -> MoveList<OthelloMove> {
        let (own, opp) = self.own_and_opp();
        let legal = legal_mask_for(own, opp);
        if legal == 0 {
            let mut pass = OthelloMove::pass();
            pass.prev_passes = self.passes;
            return MoveList::from_elem(pass, 1);
        }
        positions(legal)
            .map(|position| OthelloMove {
                position,
                flips: flips_for(own, opp, position),
                prev_passes: self.passes,
            })
            .collect()
    }

    fn apply(&mut self, mv: &mut OthelloMove) {
        mv.prev_passes = self.passes;
        let player = self.to_move;

        if mv.is_pass() {
            self.passes += 1;
        } else {
            if mv.flips == 0 {
                mv.flips = self.flips_for(mv.position);
            }
            let (own, opp) = self.sides_mut(player);
            *own |= mv.position | mv.flips;
            *opp &= !mv.flips;
            if let Some(hash) = &mut self.hash {
                let (own_type, opp_type) = if player == BLACK {
                    (BLACK_TYPE, WHITE_TYPE)
                } else {
                    (WHITE_TYPE, BLACK_TYPE)
                };
                hash.update_position(own_type, mv.position | mv.flips);
                hash.update_position(opp_type, mv.flips);
                hash.update_position(EMPTY_TYPE, mv.position);
            }
            self.passes = 0;
        }

        self.move_counter += 1;
        self.to_move = player.opponent();
        if let Some(hash) = &mut self.hash {
            hash.update_player();
        }
    }

    fn undo(&mut self, mv: &OthelloMove) {
        let player = self.to_move.opponent();
        self.to_move = player;
        self.move_counter -= 1;
        if let Some(hash) = &mut self.hash {
            hash.update_player();
        }

        if !mv.is_pass() {
            let (own, opp) = self.sides_mut(player);
            *own &= !(mv.position | mv.flips);
            *opp |= mv.flips;
            if let Some(hash) = &mut self.hash {
                let (own_type, opp_type) = if player == BLACK {
                    (BLACK_TYPE, WHITE_TYPE)
                } else {
                    (WHITE_TYPE, BLACK_TYPE)
                };
                hash.update_position(own_type, mv.position | mv.flips);
                hash.update_position(opp_type, mv.flips);
                hash.update_position(EMPTY_TYPE, mv.position);
            }
        }
        self.passes = mv.prev_passes;
    }

    fn is_over(&self) -> bool {
        self.empty() == 0 || self.passes >= 2
    }

    fn result(&self) -> Option<GameResult> {
        self.is_over().then(|| GameResult::from_score(self.material_diff()))
    }

    fn evaluate(&self) -> f32 {
        if self.is_over() {
            return self.terminal_score();
        }
        self.positional_score(&DEFAULT_REGIONS)
    }

    fn copy(&self, disable_hash: bool) -> Self {
        let mut game = self.clone();
        if disable_hash {
            game.hash = None;
        }
        game
    }

    fn hash(&self) -> Option<u64> {
        self.hash.as_ref().map(ZobristHash::key)
    }

    fn full_hash(&self) -> Option<u64> {
        self.hash
            .as_ref()
            .map(|hash| hash.keys().hash_position(&self.layers(), self.to_move == WHITE))
    }

    fn action_index(mv: &OthelloMove) -> usize {
        mv.index()
    }

    fn encode(&self) -> Vec<f32> {
        let (own, opp) = self.own_and_opp();
        let plane = |mask: Bitboard| (0..64).map(move |i| ((mask >> i) & 1) as f32);
        plane(own).chain(plane(opp)).collect()
    }

    /// Preferred action first, then by descending positional weight.
    fn order_moves(&self, moves: &mut [OthelloMove], preferred: Option<usize>) {
        let key = |mv: &OthelloMove| {
            if Some(mv.index()) == preferred {
                f32::INFINITY
            } else {
                region_weight(&DEFAULT_REGIONS, mv.position)
            }
        };
        moves.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(std::cmp::Ordering::Equal));
    }
}

impl fmt::Display for Othello {
    /// 64 cells (`X` black, `O` white, `.` empty), player digit, pass count digit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::with_capacity(66);
        for i in 0..64 {
            let cell = bitboard::bit(i);
            text.push(if self.black & cell != 0 {
                'X'
            } else if self.white & cell != 0 {
                'O'
            } else {
                '.'
            });
        }
        text.push(self.to_move.to_digit());
        text.push(char::from(b'0' + self.passes));
        f.write_str(&text)
    }
}

impl FromStr for Othello {
    type Err = ParseError;

    /// The text carries no move counter, so parsed positions start at 0 and
    /// compare unequal to a source that has moves behind it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 66 {
            return Err(ParseError::Length {
                expected: 66,
                found: chars.len(),
            });
        }

        let (mut black, mut white) = (0, 0);
        for (i, &symbol) in chars[..64].iter().enumerate() {
            match symbol {
                'X' => black |= bitboard::bit(i as u32),
                'O' => white |= bitboard::bit(i as u32),
                '.' => {}
                _ => return Err(ParseError::Cell { symbol, position: i }),
            }
        }
        let to_move = PlayerId::from_digit(chars[64]).ok_or(ParseError::Player(chars[64]))?;
        let passes = match chars[65] {
            c @ '0'..='2' => c as u8 - b'0',
            c => return Err(ParseError::Counter(c.to_string())),
        };

        Ok(Self::from_parts(black, white, to_move, passes, 0, Some(Self::default_keys())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bitboard::square;

    #[test]
    fn test_start_has_four_moves() {
        let game = Othello::new();
        let moves = game.legal_moves();
        assert_eq!(moves.len(), 4);
        let mut names: Vec<_> = moves.iter().map(OthelloMove::algebraic).collect();
        names.sort();
        assert_eq!(names, vec!["c4", "d3", "e6", "f5"]);
        assert!(moves.iter().all(|m| m.flips().count_ones() == 1));
    }

    #[test]
    fn test_apply_flips_and_undo_restores() {
        let mut game = Othello::new();
        let before = game.clone();
        let mut mv = OthelloMove::from_algebraic("d3").unwrap();
        game.apply(&mut mv);

        assert_eq!(game.pieces(BLACK).count_ones(), 4);
        assert_eq!(game.pieces(WHITE).count_ones(), 1);
        assert_eq!(game.to_move(), WHITE);
        assert_eq!(game.hash(), game.full_hash());

        game.undo(&mv);
        assert_eq!(game, before);
        assert_eq!(game.hash(), before.hash());
    }

    #[test]
    fn test_pass_when_no_moves() {
        // White to move with no white discs adjacent to anything capturable.
        let black = square(0, 0) | square(0, 1);
        let white = square(7, 7);
        let game = Othello::from_masks(black, white, WHITE).unwrap();
        let moves = game.legal_moves();
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_pass());
    }

    #[test]
    fn test_two_passes_end_the_game() {
        let black = square(0, 0);
        let white = square(7, 7);
        let mut game = Othello::from_masks(black, white, BLACK).unwrap();
        let mut first = game.legal_moves()[0];
        game.apply(&mut first);
        assert!(!game.is_over());
        let mut second = game.legal_moves()[0];
        game.apply(&mut second);
        assert!(game.is_over());
        assert_eq!(game.result(), Some(GameResult::Draw));

        game.undo(&second);
        game.undo(&first);
        assert_eq!(game.passes(), 0);
    }

    #[test]
    fn test_full_black_board_evaluation() {
        let game = Othello::from_masks(u64::MAX, 0, BLACK).unwrap();
        assert!(game.is_over());
        assert_eq!(game.evaluate(), WIN_SCORE);

        let game = Othello::from_masks(u64::MAX, 0, WHITE).unwrap();
        assert_eq!(game.evaluate(), -WIN_SCORE);
    }

    #[test]
    fn test_start_evaluation_is_symmetric() {
        let game = Othello::new();
        assert_eq!(game.evaluate(), 0.0);
        assert_eq!(game.mobility_evaluate(), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let weights = PositionalWeights::new(vec![(u64::MAX, 1.0)]);
        let game = Othello::from_masks(square(2, 2) | square(2, 3), square(5, 5), BLACK).unwrap();
        assert_eq!(game.evaluate_with(&weights), 1.0);
        assert_eq!(weights.weight_of(square(0, 0)), 1.0);
        assert_eq!(PositionalWeights::default().weight_of(square(0, 0)), 100.0);
    }

    #[test]
    fn test_order_moves_prefers_corners() {
        // Black to move can take the a1 corner or a quiet square.
        let game = Othello::from_masks(square(2, 2) | square(3, 5), square(1, 1) | square(3, 4), BLACK).unwrap();
        let mut moves = game.legal_moves();
        assert!(moves.len() >= 2);
        game.order_moves(&mut moves, None);
        assert_eq!(moves[0].algebraic(), "a1");

        let last = moves[moves.len() - 1].index();
        game.order_moves(&mut moves, Some(last));
        assert_eq!(moves[0].index(), last);
    }

    #[test]
    fn test_text_round_trip() {
        let mut game = Othello::new();
        let mut mv = game.legal_moves()[0];
        game.apply(&mut mv);
        let text = game.to_string();
        assert_eq!(text.len(), 66);
        let parsed: Othello = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.hash(), parsed.full_hash());
    }

    #[test]
    fn test_parsed_position_restarts_move_counter() {
        let mut game = Othello::new();
        let mut mv = game.legal_moves()[0];
        game.apply(&mut mv);
        assert_eq!(game.move_counter(), 1);

        let parsed: Othello = game.to_string().parse().unwrap();
        assert_eq!(parsed.move_counter(), 0);
        assert_ne!(parsed, game);
    }

    #[test]
    fn test_text_rejects_bad_input() {
        assert!("X".parse::<Othello>().is_err());
        let mut text = Othello::new().to_string();
        text.replace_range(0..1, "?");
        assert!(matches!(text.parse::<Othello>(), Err(ParseError::Cell { .. })));
    }

    #[test]
    fn test_apply_fills_missing_flips() {
        let mut game = Othello::new();
        let mut mv = OthelloMove::from_algebraic("f5").unwrap();
        assert_eq!(mv.flips(), 0);
        game.apply(&mut mv);
        assert_eq!(mv.flips().count_ones(), 1);
    }

    #[test]
    fn test_encode_is_perspective_relative() {
        let game = Othello::new();
        let obs = game.encode();
        assert_eq!(obs.len(), Othello::OBSERVATION_SIZE);
        assert_eq!(obs[28], 1.0);
        assert_eq!(obs[64 + 27], 1.0);
    }

    #[test]
    fn test_endgame_detection() {
        assert!(!Othello::new().is_endgame());
        let corners = Othello::from_masks(0x81, 0x8100_0000_0000_0000, BLACK).unwrap();
        assert!(corners.is_endgame());
        let crowded = Othello::from_masks(0x0000_FFFF_FFFF_FFFF, 0x00FF_0000_0000_0000, BLACK).unwrap();
        assert!(crowded.is_endgame());
    }
}
