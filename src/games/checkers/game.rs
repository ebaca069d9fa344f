//! Checkers engine on a 32-square bit board.
//!
//! Square `i` sits on row `i / 4`. Even rows hold the dark squares of columns
//! 1, 3, 5, 7 and odd rows those of columns 0, 2, 4, 6. Black starts on rows
//! 5-7 and moves toward row 0; White's moves are generated on the mirrored
//! board (`bit i -> bit 31 - i`) so both sides share one move generator.
//!
//! Mask arithmetic follows the shift-and-mask scheme of
//! <https://3dkingdoms.com/checkers/bitboards.htm>.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::bitboard::{self, positions, Bitboard};
use crate::core::{ParseError, PlayerId, ZobristHash, ZobristKeys, DEFAULT_ZOBRIST_SEED};
use crate::rules::{Game, GameResult, MoveList, WIN_SCORE};

use super::moves::{CheckersMove, NULL_INDEX};

/// Black moves first.
pub const BLACK: PlayerId = PlayerId::FIRST;
pub const WHITE: PlayerId = PlayerId::SECOND;

/// Quiet moves (no capture, no promotion) that end the game in a draw.
pub const QUIET_MOVE_LIMIT: u8 = 30;

pub const SQUARES: usize = 32;

const PLAYABLE: Bitboard = 0xFFFF_FFFF;
const L3: Bitboard = 0x00E0_E0E0;
const L5: Bitboard = 0x0707_0707;
const R3: Bitboard = 0x0707_0700;
const R5: Bitboard = 0xE0E0_E0E0;
const FAR_ROW: Bitboard = 0x0000_000F;

const START_BLACK: Bitboard = 0xFFF0_0000;
const START_WHITE: Bitboard = 0x0000_0FFF;

// Hash layers, in order: black, white, kings, empty.
const PIECE_TYPES: usize = 4;

/// Rotate the board half a turn.
#[inline]
fn mirror(mask: Bitboard) -> Bitboard {
    bitboard::reverse(mask) >> 32
}

#[inline]
fn step_down(mask: Bitboard) -> Bitboard {
    (mask >> 4) | ((mask & R3) >> 3) | ((mask & R5) >> 5)
}

#[inline]
fn step_up(mask: Bitboard) -> Bitboard {
    (mask << 4) | ((mask & L3) << 3) | ((mask & L5) << 5)
}

/// Pieces that can capture, viewed from the side moving toward row 0.
fn jumpers(own: Bitboard, opp: Bitboard, kings: Bitboard, empty: Bitboard) -> Bitboard {
    let own_kings = own & kings;

    let next_to_empty = (empty << 4) & opp;
    let mut mask = (((next_to_empty & L3) << 3) | ((next_to_empty & L5) << 5)) & own;
    let next_to_empty = (((empty & L3) << 3) | ((empty & L5) << 5)) & opp;
    mask |= (next_to_empty << 4) & own;

    if own_kings != 0 {
        let next_to_empty = (empty >> 4) & opp;
        mask |= (((next_to_empty & R3) >> 3) | ((next_to_empty & R5) >> 5)) & own_kings;
        let next_to_empty = (((empty & R3) >> 3) | ((empty & R5) >> 5)) & opp;
        mask |= (next_to_empty >> 4) & own_kings;
    }
    mask
}

/// Pieces that can step, viewed from the side moving toward row 0.
fn movers(own: Bitboard, kings: Bitboard, empty: Bitboard) -> Bitboard {
    let own_kings = own & kings;
    let mut mask = step_up(empty) & own;
    if own_kings != 0 {
        mask |= step_down(empty) & own_kings;
    }
    mask
}

fn step_targets(position: Bitboard, kings: Bitboard, empty: Bitboard) -> Bitboard {
    let mut mask = step_down(position);
    if position & kings != 0 {
        mask |= step_up(position);
    }
    mask & empty
}

fn jump_targets(position: Bitboard, opp: Bitboard, kings: Bitboard, empty: Bitboard) -> Bitboard {
    let over = (((position & R3) >> 3) | ((position & R5) >> 5)) & opp;
    let mut mask = (over >> 4) & empty;
    let over = (position >> 4) & opp;
    mask |= (((over & R3) >> 3) | ((over & R5) >> 5)) & empty;

    if position & kings != 0 {
        let over = (((position & L3) << 3) | ((position & L5) << 5)) & opp;
        mask |= (over << 4) & empty;
        let over = (position << 4) & opp;
        mask |= (((over & L3) << 3) | ((over & L5) << 5)) & empty;
    }
    mask
}

/// Square jumped over by a capture from `start` to `end`.
fn capture_square(start: Bitboard, end: Bitboard) -> Bitboard {
    let start_idx = bitboard::index_of(start);
    let end_idx = bitboard::index_of(end);
    let idx = ((start_idx + end_idx) >> 1) + 1 - ((start_idx >> 2) & 1);
    bitboard::bit(idx)
}

/// Masks seen from one side: own pieces, opponent pieces, kings, empty squares.
#[derive(Clone, Copy)]
struct View {
    own: Bitboard,
    opp: Bitboard,
    kings: Bitboard,
    empty: Bitboard,
    mirrored: bool,
}

impl View {
    fn orient(&self, mask: Bitboard) -> Bitboard {
        if self.mirrored {
            mirror(mask)
        } else {
            mask
        }
    }
}

/// Checkers position.
#[derive(Clone, Debug)]
pub struct Checkers {
    black: Bitboard,
    white: Bitboard,
    kings: Bitboard,
    to_move: PlayerId,
    /// Side in the middle of a multi-jump, if any.
    capturing: Option<PlayerId>,
    /// Square the capturing side must continue from.
    forced_start: Bitboard,
    quiet_moves: u8,
    move_counter: u32,
    hash: Option<ZobristHash>,
}

impl Checkers {
    /// Standard starting position, hashed with the default key table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keys(Some(Self::default_keys()))
    }

    /// Standard starting position with an explicit key table (or none).
    #[must_use]
    pub fn with_keys(keys: Option<Arc<ZobristKeys>>) -> Self {
        let mut game = Self::bare(START_BLACK, START_WHITE, 0, BLACK);
        game.rehash(keys);
        game
    }

    /// Key table used by [`Checkers::new`].
    #[must_use]
    pub fn default_keys() -> Arc<ZobristKeys> {
        ZobristKeys::shared(PIECE_TYPES, SQUARES, DEFAULT_ZOBRIST_SEED)
    }

    /// Arbitrary position from piece masks over the 32 squares.
    pub fn from_masks(
        black: Bitboard,
        white: Bitboard,
        kings: Bitboard,
        to_move: PlayerId,
    ) -> Result<Self, ParseError> {
        if black & white != 0 {
            return Err(ParseError::Board("black and white pieces overlap".to_string()));
        }
        if (black | white) & !PLAYABLE != 0 {
            return Err(ParseError::Board("pieces outside the 32 playable squares".to_string()));
        }
        if kings & !(black | white) != 0 {
            return Err(ParseError::Board("king flag on an empty square".to_string()));
        }
        let mut game = Self::bare(black, white, kings, to_move);
        game.rehash(Some(Self::default_keys()));
        Ok(game)
    }

    fn bare(black: Bitboard, white: Bitboard, kings: Bitboard, to_move: PlayerId) -> Self {
        Self {
            black,
            white,
            kings,
            to_move,
            capturing: None,
            forced_start: 0,
            quiet_moves: 0,
            move_counter: 0,
            hash: None,
        }
    }

    fn rehash(&mut self, keys: Option<Arc<ZobristKeys>>) {
        let layers = self.layers();
        self.hash = keys.map(|keys| ZobristHash::from_position(keys, &layers, self.to_move == WHITE));
    }

    fn layers(&self) -> [Bitboard; PIECE_TYPES] {
        [self.black, self.white, self.kings, self.empty()]
    }

    /// Pieces of one side, kings included.
    #[must_use]
    pub fn pieces(&self, player: PlayerId) -> Bitboard {
        if player == BLACK {
            self.black
        } else {
            self.white
        }
    }

    #[must_use]
    pub fn kings(&self) -> Bitboard {
        self.kings
    }

    #[must_use]
    pub fn empty(&self) -> Bitboard {
        !(self.black | self.white) & PLAYABLE
    }

    /// Consecutive moves without capture or promotion.
    #[must_use]
    pub fn quiet_moves(&self) -> u8 {
        self.quiet_moves
    }

    /// Side currently in the middle of a multi-jump.
    #[must_use]
    pub fn capturing(&self) -> Option<PlayerId> {
        self.capturing
    }

    fn view(&self, player: PlayerId) -> View {
        let mirrored = player == WHITE;
        let orient = |mask| if mirrored { mirror(mask) } else { mask };
        View {
            own: orient(self.pieces(player)),
            opp: orient(self.pieces(player.opponent())),
            kings: orient(self.kings),
            empty: orient(self.empty()),
            mirrored,
        }
    }

    fn sides_mut(&mut self, player: PlayerId) -> (&mut Bitboard, &mut Bitboard) {
        if player == BLACK {
            (&mut self.black, &mut self.white)
        } else {
            (&mut self.white, &mut self.black)
        }
    }

    fn any_legal_moves(&self) -> bool {
        if self.capturing.is_some() {
            return true;
        }
        let view = self.view(self.to_move);
        movers(view.own, view.kings, view.empty) != 0 || jumpers(view.own, view.opp, view.kings, view.empty) != 0
    }

    fn is_lone_king_draw(&self) -> bool {
        self.black.count_ones() == 1 && self.white.count_ones() == 1 && self.kings.count_ones() == 2
    }

    fn promotes(&self, player: PlayerId, start: Bitboard, end: Bitboard) -> bool {
        let far_row = if player == BLACK { FAR_ROW } else { mirror(FAR_ROW) };
        self.kings & start == 0 && end & far_row != 0
    }

    /// Update the hash for every square whose contents changed.
    fn hash_delta(&mut self, before: [Bitboard; PIECE_TYPES]) {
        let after = self.layers();
        if let Some(hash) = &mut self.hash {
            for (piece_type, (old, new)) in before.iter().zip(after.iter()).enumerate() {
                hash.update_position(piece_type, old ^ new);
            }
            hash.update_player();
        }
    }
}

impl Default for Checkers {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Checkers {
    fn eq(&self, other: &Self) -> bool {
        self.black == other.black
            && self.white == other.white
            && self.kings == other.kings
            && self.to_move == other.to_move
            && self.capturing == other.capturing
            && self.forced_start == other.forced_start
            && self.quiet_moves == other.quiet_moves
            && self.move_counter == other.move_counter
    }
}

impl Game for Checkers {
    type Move = CheckersMove;

    const NAME: &'static str = "checkers";
    const ACTION_SPACE: usize = NULL_INDEX + 1;
    const OBSERVATION_SIZE: usize = 3 * SQUARES;

    fn to_move(&self) -> PlayerId {
        self.to_move
    }

    fn move_counter(&self) -> u32 {
        self.move_counter
    }

    fn legal_moves(&self) -> MoveList<CheckersMove> {
        let player = self.to_move;
        let stamp = |mut mv: CheckersMove| {
            mv.prev_capturing = self.capturing;
            mv.prev_quiet = self.quiet_moves;
            mv
        };

        if self.capturing == Some(player.opponent()) {
            return MoveList::from_elem(stamp(CheckersMove::null()), 1);
        }

        let view = self.view(player);
        let continuing = self.capturing == Some(player);
        let starts = if continuing {
            view.orient(self.forced_start)
        } else {
            jumpers(view.own, view.opp, view.kings, view.empty)
        };

        let mut moves = MoveList::new();
        if starts != 0 {
            for start in positions(starts) {
                for end in positions(jump_targets(start, view.opp, view.kings, view.empty)) {
                    let mut mv = CheckersMove::new(view.orient(start), view.orient(end));
                    mv.forced = continuing;
                    mv.capture = true;
                    mv.captured = capture_square(mv.start, mv.end);
                    mv.king_capture = self.kings & mv.captured != 0;
                    mv.promotion = self.promotes(player, mv.start, mv.end);
                    moves.push(stamp(mv));
                }
            }
            return moves;
        }

        for start in positions(movers(view.own, view.kings, view.empty)) {
            for end in positions(step_targets(start, view.kings, view.empty)) {
                let mut mv = CheckersMove::new(view.orient(start), view.orient(end));
                mv.promotion = self.promotes(player, mv.start, mv.end);
                moves.push(stamp(mv));
            }
        }
        moves
    }

    fn apply(&mut self, mv: &mut CheckersMove) {
        let player = self.to_move;
        mv.prev_capturing = self.capturing;
        mv.prev_quiet = self.quiet_moves;
        self.move_counter += 1;

        if mv.is_null() {
            self.to_move = player.opponent();
            if let Some(hash) = &mut self.hash {
                hash.update_player();
            }
            return;
        }

        let before = self.layers();
        let (start, end) = (mv.start, mv.end);
        mv.forced = self.capturing == Some(player);
        mv.capture = (bitboard::index_of(start) as i32 - bitboard::index_of(end) as i32).abs() >= 7;
        mv.promotion = self.promotes(player, start, end);

        let (own, _) = self.sides_mut(player);
        *own ^= start | end;
        if self.kings & start != 0 {
            self.kings ^= start | end;
        }
        if mv.promotion {
            self.kings |= end;
        }

        let mut multi_jump = false;
        if mv.capture {
            mv.captured = capture_square(start, end);
            mv.king_capture = self.kings & mv.captured != 0;
            let (_, opp) = self.sides_mut(player);
            *opp &= !mv.captured;
            self.kings &= !mv.captured;

            let view = self.view(player);
            multi_jump = jump_targets(view.orient(end), view.opp, view.kings, view.empty) != 0;
        }

        if multi_jump {
            self.capturing = Some(player);
            self.forced_start = end;
        } else {
            self.capturing = None;
            self.forced_start = 0;
        }

        if mv.capture || mv.promotion {
            self.quiet_moves = 0;
        } else {
            self.quiet_moves += 1;
        }
        self.to_move = player.opponent();
        self.hash_delta(before);
    }

    fn undo(&mut self, mv: &CheckersMove) {
        let player = self.to_move.opponent();
        self.to_move = player;
        self.move_counter -= 1;

        if mv.is_null() {
            if let Some(hash) = &mut self.hash {
                hash.update_player();
            }
            return;
        }

        let before = self.layers();
        let (start, end) = (mv.start, mv.end);
        let (own, _) = self.sides_mut(player);
        *own ^= start | end;
        if self.kings & end != 0 {
            self.kings ^= start | end;
        }
        if mv.promotion {
            self.kings &= !start;
        }
        if mv.capture {
            let (_, opp) = self.sides_mut(player);
            *opp |= mv.captured;
            if mv.king_capture {
                self.kings |= mv.captured;
            }
        }

        self.capturing = mv.prev_capturing;
        self.forced_start = if mv.forced { start } else { 0 };
        self.quiet_moves = mv.prev_quiet;
        self.hash_delta(before);
    }

    fn is_over(&self) -> bool {
        self.white == 0
            || self.black == 0
            || !self.any_legal_moves()
            || self.quiet_moves >= QUIET_MOVE_LIMIT
            || self.is_lone_king_draw()
    }

    fn result(&self) -> Option<GameResult> {
        if self.white == 0 {
            Some(GameResult::Winner(BLACK))
        } else if self.black == 0 {
            Some(GameResult::Winner(WHITE))
        } else if !self.any_legal_moves() {
            Some(GameResult::Winner(self.to_move.opponent()))
        } else if self.quiet_moves >= QUIET_MOVE_LIMIT || self.is_lone_king_draw() {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    /// Material balance with kings worth four men.
    fn evaluate(&self) -> f32 {
        if let Some(result) = self.result() {
            return result.value_for(self.to_move) * WIN_SCORE;
        }
        let count = |mask: Bitboard| mask.count_ones() as i32;
        let score = count(self.black) + 3 * count(self.black & self.kings)
            - count(self.white)
            - 3 * count(self.white & self.kings);
        score as f32 * self.to_move.sign()
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

    fn action_index(mv: &CheckersMove) -> usize {
        mv.index()
    }

    /// Own pieces, opponent pieces and kings, on the board as the side to
    /// move sees it.
    fn encode(&self) -> Vec<f32> {
        let view = self.view(self.to_move);
        let mut obs = vec![0.0; Self::OBSERVATION_SIZE];
        for (plane, mask) in [view.own, view.opp, view.kings].into_iter().enumerate() {
            for square in positions(mask) {
                obs[plane * SQUARES + bitboard::index_of(square) as usize] = 1.0;
            }
        }
        obs
    }
}

impl fmt::Display for Checkers {
    /// 32 squares (`x`/`X` black man/king, `o`/`O` white man/king, `.`),
    /// player digit, capturing side (`0`, `1` or `-`), two-digit quiet move
    /// count, two-digit forced start square (`--` if none).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::with_capacity(SQUARES + 6);
        for i in 0..SQUARES as u32 {
            let square = bitboard::bit(i);
            let king = self.kings & square != 0;
            text.push(match (self.black & square != 0, self.white & square != 0, king) {
                (true, _, false) => 'x',
                (true, _, true) => 'X',
                (_, true, false) => 'o',
                (_, true, true) => 'O',
                _ => '.',
            });
        }
        text.push(self.to_move.to_digit());
        text.push(self.capturing.map_or('-', PlayerId::to_digit));
        text.push_str(&format!("{:02}", self.quiet_moves));
        if self.forced_start == 0 {
            text.push_str("--");
        } else {
            text.push_str(&format!("{:02}", bitboard::index_of(self.forced_start)));
        }
        f.write_str(&text)
    }
}

impl FromStr for Checkers {
    type Err = ParseError;

    /// The move counter is not part of the text and restarts at 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        let expected = SQUARES + 6;
        if chars.len() != expected {
            return Err(ParseError::Length {
                expected,
                found: chars.len(),
            });
        }

        let (mut black, mut white, mut kings) = (0, 0, 0);
        for (position, &symbol) in chars[..SQUARES].iter().enumerate() {
            let square = bitboard::bit(position as u32);
            match symbol {
                'x' => black |= square,
                'X' => {
                    black |= square;
                    kings |= square;
                }
                'o' => white |= square,
                'O' => {
                    white |= square;
                    kings |= square;
                }
                '.' => {}
                _ => return Err(ParseError::Cell { symbol, position }),
            }
        }

        let to_move = PlayerId::from_digit(chars[SQUARES]).ok_or(ParseError::Player(chars[SQUARES]))?;
        let capturing = match chars[SQUARES + 1] {
            '-' => None,
            c => Some(PlayerId::from_digit(c).ok_or(ParseError::Player(c))?),
        };
        let quiet: String = chars[SQUARES + 2..SQUARES + 4].iter().collect();
        let quiet_moves: u8 = quiet.parse().map_err(|_| ParseError::Counter(quiet.clone()))?;
        let forced: String = chars[SQUARES + 4..].iter().collect();
        let forced_start = match forced.as_str() {
            "--" => 0,
            digits => match digits.parse::<u32>() {
                Ok(idx) if (idx as usize) < SQUARES => bitboard::bit(idx),
                _ => return Err(ParseError::Counter(forced.clone())),
            },
        };
        if capturing.is_some() != (forced_start != 0) {
            return Err(ParseError::Board("capturing side and forced square disagree".to_string()));
        }
        if let Some(side) = capturing {
            let pieces = if side == BLACK { black } else { white };
            if pieces & forced_start == 0 {
                return Err(ParseError::Board("forced square holds no piece of the capturing side".to_string()));
            }
        }

        let mut game = Self::bare(black, white, kings, to_move);
        game.capturing = capturing;
        game.forced_start = forced_start;
        game.quiet_moves = quiet_moves;
        game.rehash(Some(Self::default_keys()));
        Ok(game)
    }
}
