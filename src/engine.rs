use rand::Rng;
use std::fmt;
use std::sync::OnceLock;

/// Side length of the board.
pub const SIZE: usize = 4;

/// Tile value that wins the game.
pub const WIN_VALUE: u32 = 2048;

/// Tile values the game may spawn after a move, in the order the search tries them.
pub const SPAWN_VALUES: [u32; 2] = [2, 4];

const CELLS: usize = SIZE * SIZE;
const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines
const MAX_EXPONENT: u8 = 15;

type BoardRaw = u64;
type Line = u16;
type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Every direction, in the order legal moves are enumerated.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

/// A board coordinate. Row 0 is the top row, column 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self { Cell { row, col } }

    #[inline]
    fn from_index(idx: usize) -> Self { Cell { row: idx / SIZE, col: idx % SIZE } }

    #[inline]
    fn index(self) -> Option<usize> {
        (self.row < SIZE && self.col < SIZE).then_some(self.row * SIZE + self.col)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("tile value {0} is not a power of two between 2 and 32768")]
    InvalidTile(u32),
}

/// Packed 4x4 2048 board as 16 4-bit exponents in a `u64`.
///
/// Cell `i` (row-major) lives in the nibble at bits `60 - 4i`. An exponent of
/// 0 is an empty cell, `e` is a tile of value `2^e`. The board is `Copy`, so
/// every derived position is an independent value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Build a board from tile values laid out row by row (0 = empty).
    ///
    /// ```
    /// use minimax_2048::engine::{Board, Cell};
    /// let b = Board::from_rows([[2, 0, 0, 0], [0, 4, 0, 0], [0; 4], [0, 0, 0, 2048]]).unwrap();
    /// assert_eq!(b.tile_at(Cell::new(3, 3)), Some(2048));
    /// assert!(Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Result<Self, BoardError> {
        let mut raw = 0;
        for (idx, &value) in rows.iter().flatten().enumerate() {
            let exp = if value == 0 { 0 } else { exponent_of(value).ok_or(BoardError::InvalidTile(value))? };
            raw |= BoardRaw::from(exp) << nibble_shift(idx);
        }
        Ok(Board(raw))
    }

    /// Tile values row by row (0 = empty).
    pub fn to_rows(self) -> [[u32; SIZE]; SIZE] {
        let mut rows = [[0; SIZE]; SIZE];
        for (idx, slot) in rows.iter_mut().flatten().enumerate() {
            *slot = self.tile_value(idx);
        }
        rows
    }

    /// Value at row-major index `idx` (0 if empty).
    #[inline]
    pub fn tile_value(self, idx: usize) -> u32 { value_of(self.exponent(idx)) }

    /// Value at `cell`, or `None` when the coordinate is off the board.
    #[inline]
    pub fn tile_at(self, cell: Cell) -> Option<u32> { cell.index().map(|idx| self.tile_value(idx)) }

    /// Return a copy of this board with `value` placed at `cell`.
    ///
    /// `value` must be a power of two in `2..=32768` and `cell` must be on the board.
    #[inline]
    pub fn with_tile(self, cell: Cell, value: u32) -> Self {
        debug_assert!(cell.index().is_some(), "cell {cell:?} is off the board");
        debug_assert!(exponent_of(value).is_some(), "invalid tile value {value}");
        let idx = cell.row * SIZE + cell.col;
        let shift = nibble_shift(idx);
        let exp = BoardRaw::from(value.trailing_zeros());
        Board((self.0 & !(0xf_u64 << shift)) | (exp << shift))
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// A direction that moves nothing returns the board unchanged.
    ///
    /// ```
    /// use minimax_2048::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(b.shift(Move::Left).to_rows()[0], [4, 4, 0, 0]);
    /// assert_eq!(b.shift(Move::Up), b);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        let t = tables();
        match dir {
            Move::Left => Board(shift_rows(self.0, &t.shift_left)),
            Move::Right => Board(shift_rows(self.0, &t.shift_right)),
            Move::Up => Board(transpose(shift_rows(transpose(self.0), &t.shift_left))),
            Move::Down => Board(transpose(shift_rows(transpose(self.0), &t.shift_right))),
        }
    }

    /// Directions that change the board, in [`Move::ALL`] order.
    #[inline]
    pub fn available_moves(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&dir| self.shift(dir) != self)
    }

    /// Empty cells in row-major order.
    #[inline]
    pub fn available_cells(self) -> impl Iterator<Item = Cell> {
        (0..CELLS).filter(move |&idx| self.exponent(idx) == 0).map(Cell::from_index)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize {
        let mut occupied = self.0;
        occupied |= occupied >> 1;
        occupied |= occupied >> 2;
        occupied &= 0x1111_1111_1111_1111;
        CELLS - occupied.count_ones() as usize
    }

    /// True if any cell holds exactly `value`.
    #[inline]
    pub fn has_tile(self, value: u32) -> bool {
        match exponent_of(value) {
            Some(exp) => (0..CELLS).any(|idx| self.exponent(idx) == exp),
            None => false,
        }
    }

    /// Return true if no legal moves remain.
    ///
    /// ```
    /// use minimax_2048::engine::Board;
    /// // Nothing slides on an empty board.
    /// assert!(Board::EMPTY.is_game_over());
    /// ```
    #[inline]
    pub fn is_game_over(self) -> bool { self.available_moves().next().is_none() }

    /// Return the highest tile value (e.g., 2048) present on the board.
    #[inline]
    pub fn highest_tile(self) -> u32 {
        value_of((0..CELLS).map(|idx| self.exponent(idx)).max().unwrap_or(0))
    }

    /// Compute the total score for this board.
    ///
    /// Each tile is credited with the merges it took to build it, which matches
    /// the in-game score for boards that only ever spawned 2s.
    #[inline]
    pub fn score(self) -> Score {
        let score = &tables().score;
        (0..SIZE).map(|row| score[usize::from(extract_line(self.0, row))]).sum()
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use minimax_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let empty = self.count_empty();
        if empty == 0 {
            return self;
        }
        let pick = rng.gen_range(0..empty);
        let value = if rng.gen_range(0..10) < 9 { SPAWN_VALUES[0] } else { SPAWN_VALUES[1] };
        match self.available_cells().nth(pick) {
            Some(cell) => self.with_tile(cell, value),
            None => self,
        }
    }

    /// Perform a move then insert a random tile if the move changed the board, using the provided RNG.
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, direction: Move, rng: &mut R) -> Self {
        let moved = self.shift(direction);
        if moved != self { moved.with_random_tile(rng) } else { self }
    }

    #[inline]
    fn exponent(self, idx: usize) -> u8 { ((self.0 >> nibble_shift(idx)) & 0xf) as u8 }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.to_rows().iter().enumerate() {
            if r > 0 {
                writeln!(f, "{}", "-".repeat(8 * SIZE - 1))?;
            }
            let cells: Vec<String> = row
                .iter()
                .map(|&v| if v == 0 { " ".repeat(7) } else { format!("{v:^7}") })
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.raw() } }

struct Tables {
    shift_left: Box<[Line]>,
    shift_right: Box<[Line]>,
    score: Box<[Score]>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

#[inline(always)]
fn tables() -> &'static Tables { TABLES.get_or_init(build_tables) }

fn build_tables() -> Tables {
    // Allocate on the heap to avoid large stack frames
    let mut shift_left = vec![0; LINE_TABLE_SIZE];
    let mut shift_right = vec![0; LINE_TABLE_SIZE];
    let mut score = vec![0; LINE_TABLE_SIZE];
    for (idx, line) in (0..=Line::MAX).enumerate() {
        shift_left[idx] = slide_left(line);
        shift_right[idx] = reverse_line(slide_left(reverse_line(line)));
        score[idx] = line_score(line);
    }
    Tables {
        shift_left: shift_left.into_boxed_slice(),
        shift_right: shift_right.into_boxed_slice(),
        score: score.into_boxed_slice(),
    }
}

#[inline(always)]
fn nibble_shift(idx: usize) -> u32 { (60 - 4 * idx) as u32 }

#[inline]
fn value_of(exp: u8) -> u32 { if exp == 0 { 0 } else { 1 << exp } }

#[inline]
fn exponent_of(value: u32) -> Option<u8> {
    let exp = value.trailing_zeros();
    (value.is_power_of_two() && (1..=u32::from(MAX_EXPONENT)).contains(&exp)).then_some(exp as u8)
}

// Credit to Nneonneo
pub(crate) fn transpose(x: BoardRaw) -> BoardRaw {
    let a1 = x & 0xF0F00F0FF0F00F0F;
    let a2 = x & 0x0000F0F00000F0F0;
    let a3 = x & 0x0F0F00000F0F0000;
    let a = a1 | (a2 << 12) | (a3 >> 12);
    let b1 = a & 0xFF00FF0000FF00FF;
    let b2 = a & 0x00FF00FF00000000;
    let b3 = a & 0x00000000FF00FF00;
    b1 | (b2 >> 24) | (b3 << 24)
}

/// Row `row` of a packed board as a 16-bit line (first cell in the high nibble).
#[inline(always)]
pub(crate) fn extract_line(board: BoardRaw, row: usize) -> Line {
    ((board >> ((SIZE - 1 - row) * 16)) & 0xffff) as Line
}

/// The four exponents of a line, leftmost first.
#[inline]
pub(crate) fn unpack_line(line: Line) -> [u8; SIZE] {
    [(line >> 12) as u8 & 0xf, (line >> 8) as u8 & 0xf, (line >> 4) as u8 & 0xf, line as u8 & 0xf]
}

#[inline]
fn pack_line(tiles: [u8; SIZE]) -> Line {
    tiles.iter().fold(0, |line, &exp| (line << 4) | Line::from(exp))
}

fn reverse_line(line: Line) -> Line {
    let mut tiles = unpack_line(line);
    tiles.reverse();
    pack_line(tiles)
}

fn shift_rows(board: BoardRaw, table: &[Line]) -> BoardRaw {
    (0..SIZE).fold(0, |acc, row| {
        let shifted = table[usize::from(extract_line(board, row))];
        acc | (BoardRaw::from(shifted) << ((SIZE - 1 - row) * 16))
    })
}

/// Slide a line towards its first cell, merging each equal pair once.
fn slide_left(line: Line) -> Line {
    let mut out = [0u8; SIZE];
    let mut len = 0;
    let mut pending: Option<u8> = None;
    for exp in unpack_line(line).into_iter().filter(|&e| e != 0) {
        match pending {
            Some(p) if p == exp && p < MAX_EXPONENT => {
                out[len] = p + 1;
                len += 1;
                pending = None;
            }
            Some(p) => {
                out[len] = p;
                len += 1;
                pending = Some(exp);
            }
            None => pending = Some(exp),
        }
    }
    if let Some(p) = pending {
        out[len] = p;
    }
    pack_line(out)
}

// Credit to Nneonneo
fn line_score(line: Line) -> Score {
    unpack_line(line)
        .iter()
        .filter(|&&exp| exp >= 2)
        .map(|&exp| Score::from(exp - 1) * (1 << exp))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [[u32; 4]; 4]) -> Board { Board::from_rows(rows).unwrap() }

    #[test]
    fn it_slide_left() {
        assert_eq!(slide_left(0x0000), 0x0000);
        assert_eq!(slide_left(0x1212), 0x1212);
        assert_eq!(slide_left(0x1122), 0x2300);
        assert_eq!(slide_left(0x1001), 0x2000);
        assert_eq!(slide_left(0x1111), 0x2200);
        assert_eq!(slide_left(0x0222), 0x3200);
        assert_eq!(slide_left(0xff00), 0xff00);
    }

    #[test]
    fn it_slide_right() {
        let right = |l| reverse_line(slide_left(reverse_line(l)));
        assert_eq!(right(0x0000), 0x0000);
        assert_eq!(right(0x1212), 0x1212);
        assert_eq!(right(0x1122), 0x0023);
        assert_eq!(right(0x5005), 0x0006);
        assert_eq!(right(0x0222), 0x0023);
    }

    #[test]
    fn test_move_left() {
        let game = Board::from_raw(0x1234133220021002);
        assert_eq!(game.shift(Move::Left), Board::from_raw(0x1234142030001200));
    }

    #[test]
    fn test_move_up() {
        let game = Board::from_raw(0x1121230033004222);
        assert_eq!(game.shift(Move::Up), Board::from_raw(0x1131240232004000));
    }

    #[test]
    fn test_move_right() {
        let game = Board::from_raw(0x1234133220021002);
        assert_eq!(game.shift(Move::Right), Board::from_raw(0x1234014200030012));
    }

    #[test]
    fn test_move_down() {
        let game = Board::from_raw(0x1121230033004222);
        assert_eq!(game.shift(Move::Down), Board::from_raw(0x1000210034014232));
    }

    #[test]
    fn it_round_trips_rows() {
        let rows = [[2, 0, 4, 8], [0, 0, 0, 0], [16, 32, 64, 128], [256, 512, 1024, 2048]];
        assert_eq!(board(rows).to_rows(), rows);
        assert_eq!(Board::from_rows([[6, 0, 0, 0], [0; 4], [0; 4], [0; 4]]), Err(BoardError::InvalidTile(6)));
        assert_eq!(Board::from_rows([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]), Err(BoardError::InvalidTile(1)));
        assert_eq!(Board::from_rows([[65536, 0, 0, 0], [0; 4], [0; 4], [0; 4]]), Err(BoardError::InvalidTile(65536)));
    }

    #[test]
    fn it_reads_cells_with_bounds() {
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]);
        assert_eq!(b.tile_at(Cell::new(0, 0)), Some(2));
        assert_eq!(b.tile_at(Cell::new(3, 3)), Some(4));
        assert_eq!(b.tile_at(Cell::new(1, 1)), Some(0));
        assert_eq!(b.tile_at(Cell::new(4, 0)), None);
        assert_eq!(b.tile_at(Cell::new(0, 4)), None);
    }

    #[test]
    fn it_inserts_and_overwrites_tiles() {
        let b = Board::EMPTY.with_tile(Cell::new(2, 1), 4);
        assert_eq!(b.tile_at(Cell::new(2, 1)), Some(4));
        let b = b.with_tile(Cell::new(2, 1), 2);
        assert_eq!(b.tile_at(Cell::new(2, 1)), Some(2));
        assert_eq!(b.count_empty(), 15);
    }

    #[test]
    fn it_lists_available_moves_in_order() {
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(b.available_moves().collect::<Vec<_>>(), vec![Move::Down, Move::Right]);
        let full = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(full.is_game_over());
        assert_eq!(full.available_moves().count(), 0);
    }

    #[test]
    fn it_lists_available_cells_row_major() {
        let b = board([[2, 4, 2, 4], [4, 0, 4, 2], [2, 4, 2, 4], [0, 2, 4, 0]]);
        let cells: Vec<_> = b.available_cells().collect();
        assert_eq!(cells, vec![Cell::new(1, 1), Cell::new(3, 0), Cell::new(3, 3)]);
    }

    #[test]
    fn it_count_empty() {
        let game = Board::from_raw(0x1111000011110000);
        assert_eq!(game.count_empty(), 8);
        let game = Board::from_raw(0x1100000000000000);
        assert_eq!(game.count_empty(), 14);
        assert_eq!(Board::EMPTY.count_empty(), 16);
    }

    #[test]
    fn it_get_tile_val() {
        let game = Board::from_raw(0x0123456789abcdef);
        assert_eq!(game.tile_value(0), 0);
        assert_eq!(game.tile_value(3), 8);
        assert_eq!(game.tile_value(10), 1024);
        assert_eq!(game.tile_value(15), 32768);
        assert_eq!(game.highest_tile(), 32768);
    }

    #[test]
    fn it_detects_tiles() {
        let b = board([[2048, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(b.has_tile(WIN_VALUE));
        assert!(!b.has_tile(1024));
        assert!(!b.has_tile(0));
        assert!(!b.has_tile(3));
    }

    #[test]
    fn it_scores_merges() {
        // 4 = one merge of 2s, 8 = two 4s built from 2s.
        assert_eq!(board([[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).score(), 4);
        assert_eq!(board([[8, 2, 0, 0], [0; 4], [0; 4], [0; 4]]).score(), 16);
    }

    #[test]
    fn it_fills_board_with_random_tiles() {
        use rand::{rngs::StdRng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(9);
        let mut game = Board::EMPTY;
        for _ in 0..16 {
            game = game.with_random_tile(&mut rng);
        }
        assert_eq!(game.count_empty(), 0);
        assert!((0..16).all(|idx| matches!(game.tile_value(idx), 2 | 4)));
        assert_eq!(game.with_random_tile(&mut rng), game);
    }

    #[test]
    fn it_displays_grid() {
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 2048]]);
        let text = b.to_string();
        assert_eq!(text.lines().count(), 7);
        assert!(text.contains("2048"));
    }
}
