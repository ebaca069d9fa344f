//! Bit board primitives over 64-bit masks.
//!
//! Cells are numbered `row * 8 + col`, so bit 0 is the first column of the
//! first row and bit 63 is the last column of the last row. Every shift in
//! this module masks the column that would otherwise wrap into the adjacent
//! row, so directional operations never leak across board edges.
//!
//! All functions are pure and allocation-free.

/// A set of cells on an 8x8 board.
pub type Bitboard = u64;

/// Number of rows on the board.
pub const ROWS: u32 = 8;

/// Number of columns on the board.
pub const COLS: u32 = 8;

/// Cells of the first column.
pub const FIRST_COL: Bitboard = 0x0101_0101_0101_0101;

/// Cells of the last column.
pub const LAST_COL: Bitboard = 0x8080_8080_8080_8080;

/// Cells of the first row.
pub const FIRST_ROW: Bitboard = 0x0000_0000_0000_00FF;

/// Cells of the last row.
pub const LAST_ROW: Bitboard = 0xFF00_0000_0000_0000;

/// The eight neighbor offsets in index space.
pub const NEIGHBOR_OFFSETS: [i32; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];

/// Single-cell mask for `(row, col)`.
#[inline]
#[must_use]
pub const fn square(row: u32, col: u32) -> Bitboard {
    1 << (row * COLS + col)
}

/// Single-cell mask for a cell index.
#[inline]
#[must_use]
pub const fn bit(index: u32) -> Bitboard {
    1 << index
}

/// Index of the lowest set cell. Undefined meaning for an empty mask (returns 64).
#[inline]
#[must_use]
pub const fn index_of(position: Bitboard) -> u32 {
    position.trailing_zeros()
}

/// Whether every cell of `positions` is set in `board`.
#[inline]
#[must_use]
pub const fn contains(board: Bitboard, positions: Bitboard) -> bool {
    board & positions == positions
}

#[inline]
pub fn set(board: &mut Bitboard, positions: Bitboard) {
    *board |= positions;
}

#[inline]
pub fn clear(board: &mut Bitboard, positions: Bitboard) {
    *board &= !positions;
}

#[inline]
pub fn toggle(board: &mut Bitboard, positions: Bitboard) {
    *board ^= positions;
}

/// Remove and return the lowest set cell as a single-bit mask.
///
/// Returns 0 once the mask is empty.
#[inline]
pub fn pop_next(board: &mut Bitboard) -> Bitboard {
    let position = *board & board.wrapping_neg();
    *board ^= position;
    position
}

/// Remove and return the index of the lowest set cell.
#[inline]
pub fn pop_next_index(board: &mut Bitboard) -> Option<u32> {
    if *board == 0 {
        return None;
    }
    let index = board.trailing_zeros();
    *board &= *board - 1;
    Some(index)
}

/// Iterate over the single-bit masks of a board, lowest first.
#[inline]
#[must_use]
pub fn positions(board: Bitboard) -> Positions {
    Positions(board)
}

/// Iterator returned by [`positions`].
#[derive(Clone, Copy, Debug)]
pub struct Positions(Bitboard);

impl Iterator for Positions {
    type Item = Bitboard;

    #[inline]
    fn next(&mut self) -> Option<Bitboard> {
        match pop_next(&mut self.0) {
            0 => None,
            position => Some(position),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Positions {}

/// Shift every cell `offset` columns to the right (negative: left).
///
/// Cells pushed past the board edge are dropped instead of wrapping.
#[inline]
#[must_use]
pub const fn shift_horizontal(board: Bitboard, offset: i32) -> Bitboard {
    if offset >= 0 {
        let mut result = board;
        let mut i = 0;
        while i < offset {
            result = (result << 1) & !FIRST_COL;
            i += 1;
        }
        result
    } else {
        let mut result = board;
        let mut i = 0;
        while i < -offset {
            result = (result >> 1) & !LAST_COL;
            i += 1;
        }
        result
    }
}

/// Shift every cell `offset` rows up (negative: down).
#[inline]
#[must_use]
pub const fn shift_vertical(board: Bitboard, offset: i32) -> Bitboard {
    let amount = offset.unsigned_abs() * COLS;
    if amount >= 64 {
        0
    } else if offset >= 0 {
        board << amount
    } else {
        board >> amount
    }
}

/// Shift every cell to its neighbor in direction `offset`.
///
/// `offset` is one of [`NEIGHBOR_OFFSETS`]: the index distance to the
/// neighbor (`+1` right, `+8` up, `+9` up-right, ...).
#[inline]
#[must_use]
pub const fn shift_to_neighbor(board: Bitboard, offset: i32) -> Bitboard {
    let vertical = (offset + 1) >> 3;
    let horizontal = ((offset + 1) & 7) - 1;
    shift_horizontal(shift_vertical(board, vertical), horizontal)
}

/// The board plus its orthogonal neighbors.
#[inline]
#[must_use]
pub const fn expand4(board: Bitboard) -> Bitboard {
    board
        | shift_horizontal(board, 1)
        | shift_horizontal(board, -1)
        | shift_vertical(board, 1)
        | shift_vertical(board, -1)
}

/// The board plus all eight neighbors.
#[inline]
#[must_use]
pub const fn expand8(board: Bitboard) -> Bitboard {
    let rows = board | shift_vertical(board, 1) | shift_vertical(board, -1);
    rows | shift_horizontal(rows, 1) | shift_horizontal(rows, -1)
}

/// Mirror the board through its center (bit `i` becomes bit `63 - i`).
#[inline]
#[must_use]
pub const fn reverse(board: Bitboard) -> Bitboard {
    board.reverse_bits()
}

/// Mask of a full row.
#[inline]
#[must_use]
pub const fn row_mask(row: u32) -> Bitboard {
    FIRST_ROW << (row * COLS)
}

/// Mask of a full column.
#[inline]
#[must_use]
pub const fn col_mask(col: u32) -> Bitboard {
    FIRST_COL << col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_indexing() {
        assert_eq!(square(0, 0), 1);
        assert_eq!(square(0, 7), 1 << 7);
        assert_eq!(square(7, 7), 1 << 63);
        assert_eq!(index_of(square(3, 4)), 28);
    }

    #[test]
    fn test_horizontal_shift_does_not_wrap() {
        assert_eq!(shift_horizontal(LAST_COL, 1), 0);
        assert_eq!(shift_horizontal(FIRST_COL, -1), 0);
        assert_eq!(shift_horizontal(FIRST_COL, 1), col_mask(1));
        assert_eq!(shift_horizontal(FIRST_COL, 3), col_mask(3));
    }

    #[test]
    fn test_vertical_shift_drops_rows() {
        assert_eq!(shift_vertical(LAST_ROW, 1), 0);
        assert_eq!(shift_vertical(FIRST_ROW, -1), 0);
        assert_eq!(shift_vertical(FIRST_ROW, 2), row_mask(2));
        assert_eq!(shift_vertical(FIRST_ROW, 8), 0);
    }

    #[test]
    fn test_shift_to_neighbor_matches_offsets() {
        let center = square(3, 3);
        for offset in NEIGHBOR_OFFSETS {
            let expected = 1u64 << (index_of(center) as i32 + offset);
            assert_eq!(shift_to_neighbor(center, offset), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_shift_to_neighbor_at_edges() {
        assert_eq!(shift_to_neighbor(square(3, 7), 1), 0);
        assert_eq!(shift_to_neighbor(square(3, 7), 9), 0);
        assert_eq!(shift_to_neighbor(square(3, 0), 7), 0);
        assert_eq!(shift_to_neighbor(square(0, 3), -8), 0);
    }

    #[test]
    fn test_expand() {
        let corner = square(0, 0);
        assert_eq!(expand4(corner).count_ones(), 3);
        assert_eq!(expand8(corner).count_ones(), 4);
        assert_eq!(expand8(square(4, 4)).count_ones(), 9);
        assert_eq!(expand4(square(4, 4)).count_ones(), 5);
    }

    #[test]
    fn test_pop_next() {
        let mut board = square(0, 1) | square(5, 5);
        assert_eq!(pop_next(&mut board), square(0, 1));
        assert_eq!(pop_next(&mut board), square(5, 5));
        assert_eq!(pop_next(&mut board), 0);

        let mut board = 0b1010;
        assert_eq!(pop_next_index(&mut board), Some(1));
        assert_eq!(pop_next_index(&mut board), Some(3));
        assert_eq!(pop_next_index(&mut board), None);
    }

    #[test]
    fn test_positions_iterator() {
        let board = square(1, 1) | square(2, 2) | square(7, 0);
        let cells: Vec<_> = positions(board).collect();
        assert_eq!(cells, vec![square(1, 1), square(2, 2), square(7, 0)]);
        assert_eq!(positions(board).len(), 3);
    }

    #[test]
    fn test_set_clear_toggle() {
        let mut board = 0;
        set(&mut board, 0b110);
        assert!(contains(board, 0b100));
        clear(&mut board, 0b100);
        assert_eq!(board, 0b010);
        toggle(&mut board, 0b011);
        assert_eq!(board, 0b001);
    }

    #[test]
    fn test_reverse() {
        assert_eq!(reverse(1), 1 << 63);
        assert_eq!(reverse(square(3, 3)), square(4, 4));
        assert_eq!(reverse(reverse(0xDEAD_BEEF)), 0xDEAD_BEEF);
    }
}
