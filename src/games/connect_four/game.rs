//! Connect-Four engine.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::bitboard::Bitboard;
use crate::core::{ParseError, PlayerId, ZobristHash, ZobristKeys, DEFAULT_ZOBRIST_SEED};
use crate::rules::{Game, GameResult, MoveList, WIN_SCORE};

/// Red moves first.
pub const RED: PlayerId = PlayerId::FIRST;
pub const YELLOW: PlayerId = PlayerId::SECOND;

pub const HEIGHT: usize = 6;
pub const WIDTH: usize = 7;

// Cells are `row * 8 + col` with row 0 at the bottom. Column 7 and rows 6-7
// are never occupied, which keeps line detection from wrapping.
const BB_WIDTH: usize = 8;
const SENTINELS: Bitboard = 0xFFFF_8080_8080_8080;
const LINE_SHIFTS: [u32; 4] = [1, 7, 8, 9];

const RED_TYPE: usize = 0;
const YELLOW_TYPE: usize = 1;
const EMPTY_TYPE: usize = 2;
const PIECE_TYPES: usize = 3;

fn has_four(pieces: Bitboard) -> bool {
    LINE_SHIFTS.iter().any(|&shift| {
        let pairs = pieces & (pieces >> shift);
        pairs & (pairs >> (2 * shift)) != 0
    })
}

/// Number of four-cell windows fully inside `cells`.
fn count_fours(cells: Bitboard) -> u32 {
    LINE_SHIFTS
        .iter()
        .map(|&shift| (cells & (cells >> shift) & (cells >> (2 * shift)) & (cells >> (3 * shift))).count_ones())
        .sum()
}

const fn cell(row: usize, col: usize) -> Bitboard {
    1 << (row * BB_WIDTH + col)
}

/// Drop a disc into a column.
///
/// The landing row follows from the column height, so the column alone is
/// enough to undo the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectFourMove {
    column: u8,
}

impl ConnectFourMove {
    /// Move for a column, `None` if the column is off the board.
    #[must_use]
    pub fn new(column: usize) -> Option<Self> {
        (column < WIDTH).then_some(Self { column: column as u8 })
    }

    #[must_use]
    pub fn column(&self) -> usize {
        usize::from(self.column)
    }
}

impl fmt::Display for ConnectFourMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column)
    }
}

impl FromStr for ConnectFourMove {
    type Err = ParseError;

    /// Checks only that the column is on the board, not that it has room.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseError::Move(s.to_string()))
    }
}

/// Connect-Four position on a 7x6 board.
#[derive(Clone, Debug)]
pub struct ConnectFour {
    red: Bitboard,
    yellow: Bitboard,
    heights: [u8; WIDTH],
    to_move: PlayerId,
    move_counter: u32,
    hash: Option<ZobristHash>,
}

impl ConnectFour {
    /// Empty board, hashed with the default key table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keys(Some(Self::default_keys()))
    }

    /// Empty board with an explicit key table (or none).
    #[must_use]
    pub fn with_keys(keys: Option<Arc<ZobristKeys>>) -> Self {
        Self::from_parts(0, 0, [0; WIDTH], RED, 0, keys)
    }

    /// Key table used by [`ConnectFour::new`].
    #[must_use]
    pub fn default_keys() -> Arc<ZobristKeys> {
        ZobristKeys::shared(PIECE_TYPES, 64, DEFAULT_ZOBRIST_SEED)
    }

    fn from_parts(
        red: Bitboard,
        yellow: Bitboard,
        heights: [u8; WIDTH],
        to_move: PlayerId,
        move_counter: u32,
        keys: Option<Arc<ZobristKeys>>,
    ) -> Self {
        let mut game = Self {
            red,
            yellow,
            heights,
            to_move,
            move_counter,
            hash: None,
        };
        let layers = game.layers();
        game.hash = keys.map(|keys| ZobristHash::from_position(keys, &layers, to_move == YELLOW));
        game
    }

    fn layers(&self) -> [Bitboard; PIECE_TYPES] {
        [self.red, self.yellow, self.empty()]
    }

    /// Discs of one side.
    #[must_use]
    pub fn pieces(&self, player: PlayerId) -> Bitboard {
        if player == RED {
            self.red
        } else {
            self.yellow
        }
    }

    /// Empty playable cells.
    #[must_use]
    pub fn empty(&self) -> Bitboard {
        !(self.red | self.yellow | SENTINELS)
    }

    /// Number of discs in a column.
    #[must_use]
    pub fn height(&self, column: usize) -> usize {
        usize::from(self.heights[column])
    }

    fn landing_cell(&self, column: usize) -> Bitboard {
        cell(self.height(column), column)
    }

    fn piece_type(player: PlayerId) -> usize {
        if player == RED {
            RED_TYPE
        } else {
            YELLOW_TYPE
        }
    }

    fn toggle(&mut self, player: PlayerId, position: Bitboard) {
        if player == RED {
            self.red ^= position;
        } else {
            self.yellow ^= position;
        }
        if let Some(hash) = &mut self.hash {
            hash.update_position(Self::piece_type(player), position);
            hash.update_position(EMPTY_TYPE, position);
            hash.update_player();
        }
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ConnectFour {
    fn eq(&self, other: &Self) -> bool {
        self.red == other.red
            && self.yellow == other.yellow
            && self.heights == other.heights
            && self.to_move == other.to_move
            && self.move_counter == other.move_counter
    }
}

impl Game for ConnectFour {
    type Move = ConnectFourMove;

    const NAME: &'static str = "connect_four";
    const ACTION_SPACE: usize = WIDTH;
    const OBSERVATION_SIZE: usize = 2 * WIDTH * HEIGHT;

    fn to_move(&self) -> PlayerId {
        self.to_move
    }

    fn move_counter(&self) -> u32 {
        self.move_counter
    }

    fn legal_moves(&self) -> MoveList<ConnectFourMove> {
        (0..WIDTH)
            .filter(|&col| self.height(col) < HEIGHT)
            .map(|col| ConnectFourMove { column: col as u8 })
            .collect()
    }

    /// Drops a disc into the move's column.
    ///
    /// The column must have room. Moves built from text or action indices
    /// should come from [`Game::find_move`] or [`Game::play`], which reject
    /// full columns.
    fn apply(&mut self, mv: &mut ConnectFourMove) {
        let column = mv.column();
        debug_assert!(self.height(column) < HEIGHT, "column {column} is full");
        let position = self.landing_cell(column);
        self.toggle(self.to_move, position);
        self.heights[column] += 1;
        self.move_counter += 1;
        self.to_move = self.to_move.opponent();
    }

    fn undo(&mut self, mv: &ConnectFourMove) {
        let column = mv.column();
        self.to_move = self.to_move.opponent();
        self.move_counter -= 1;
        self.heights[column] -= 1;
        let position = self.landing_cell(column);
        self.toggle(self.to_move, position);
    }

    fn is_over(&self) -> bool {
        self.empty() == 0 || has_four(self.red) || has_four(self.yellow)
    }

    fn result(&self) -> Option<GameResult> {
        if has_four(self.red) {
            Some(GameResult::Winner(RED))
        } else if has_four(self.yellow) {
            Some(GameResult::Winner(YELLOW))
        } else if self.empty() == 0 {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    /// Open four-windows for the side to move minus those of the opponent.
    fn evaluate(&self) -> f32 {
        if let Some(result) = self.result() {
            return result.value_for(self.to_move) * WIN_SCORE;
        }
        let red_windows = count_fours(!SENTINELS & !self.yellow) as f32;
        let yellow_windows = count_fours(!SENTINELS & !self.red) as f32;
        (red_windows - yellow_windows) * self.to_move.sign()
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
            .map(|hash| hash.keys().hash_position(&self.layers(), self.to_move == YELLOW))
    }

    fn action_index(mv: &ConnectFourMove) -> usize {
        mv.column()
    }

    fn encode(&self) -> Vec<f32> {
        let own = self.pieces(self.to_move);
        let opp = self.pieces(self.to_move.opponent());
        let mut obs = Vec::with_capacity(Self::OBSERVATION_SIZE);
        for mask in [own, opp] {
            for row in 0..HEIGHT {
                for col in 0..WIDTH {
                    obs.push(if mask & cell(row, col) != 0 { 1.0 } else { 0.0 });
                }
            }
        }
        obs
    }
}

impl fmt::Display for ConnectFour {
    /// 42 cells row by row from the bottom (`X` red, `O` yellow, `.` empty),
    /// then the player digit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::with_capacity(WIDTH * HEIGHT + 1);
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                let position = cell(row, col);
                text.push(if self.red & position != 0 {
                    'X'
                } else if self.yellow & position != 0 {
                    'O'
                } else {
                    '.'
                });
            }
        }
        text.push(self.to_move.to_digit());
        f.write_str(&text)
    }
}

impl FromStr for ConnectFour {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        let expected = WIDTH * HEIGHT + 1;
        if chars.len() != expected {
            return Err(ParseError::Length {
                expected,
                found: chars.len(),
            });
        }

        let (mut red, mut yellow) = (0, 0);
        let mut heights = [0u8; WIDTH];
        for row in 0..HEIGHT {
            for col in 0..WIDTH {
                let position = row * WIDTH + col;
                let symbol = chars[position];
                let occupied = match symbol {
                    'X' => {
                        red |= cell(row, col);
                        true
                    }
                    'O' => {
                        yellow |= cell(row, col);
                        true
                    }
                    '.' => false,
                    _ => return Err(ParseError::Cell { symbol, position }),
                };
                if occupied {
                    if usize::from(heights[col]) != row {
                        return Err(ParseError::Board(format!("floating disc in column {col}")));
                    }
                    heights[col] += 1;
                }
            }
        }

        let digit = chars[WIDTH * HEIGHT];
        let to_move = PlayerId::from_digit(digit).ok_or(ParseError::Player(digit))?;
        let move_counter = (red | yellow).count_ones();
        Ok(Self::from_parts(red, yellow, heights, to_move, move_counter, Some(Self::default_keys())))
    }
}
