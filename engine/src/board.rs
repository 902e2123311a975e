use std::fmt;
use bitvec::{prelude::*, slice::IterOnes};
use lazy_static::lazy_static;

pub const SIZE: usize = 9;
const CELLS: usize = SIZE * SIZE;
pub type BitBoard = BitArr!(for CELLS, in u16, Lsb0);
// every 9 values represents one sub-board, sub-board 1 first
// each sub-board is stored row-major from its top left cell

pub trait BitArr2D {
    fn empty() -> Self;
    fn set_cell(&mut self, sub_board: usize, cell: usize, value: bool);
    fn from_cell(sub_board: usize, cell: usize) -> Self;
    type IterCells<'a>: Iterator<Item=(usize, usize)> + 'a where Self: 'a;
    fn iter_set_cells(&'_ self) -> Self::IterCells<'_>;
}

impl BitArr2D for BitBoard {
    fn empty() -> Self {
        bitarr!(u16, Lsb0; 0; CELLS)
    }

    fn set_cell(&mut self, sub_board: usize, cell: usize, value: bool) {
        let idx = (sub_board - 1) * SIZE + (cell - 1);
        self.set(idx, value);
    }

    fn from_cell(sub_board: usize, cell: usize) -> Self {
        let mut square = BitBoard::empty();
        square.set_cell(sub_board, cell, true);
        square
    }

    type IterCells<'a> = std::iter::Map<IterOnes<'a, u16, Lsb0>, fn(usize) -> (usize, usize)>;

    fn iter_set_cells(&'_ self) -> Self::IterCells<'_> {
        self.iter_ones().map(|idx| (idx / SIZE + 1, idx % SIZE + 1))
    }
}

/// Cell triples of the eight winning lines, rows then columns then diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [1, 2, 3], [4, 5, 6], [7, 8, 9],
    [1, 4, 7], [2, 5, 8], [3, 6, 9],
    [1, 5, 9], [3, 5, 7],
];

lazy_static! {
    static ref SUB_BOARD_MASKS: Vec<BitBoard> = {
        (1..=SIZE).map(|sub_board| {
            let mut mask = BitBoard::empty();
            for cell in 1..=SIZE {
                mask.set_cell(sub_board, cell, true);
            }
            mask
        }).collect()
    };
    static ref LINE_MASKS: Vec<Vec<BitBoard>> = {
        (1..=SIZE).map(|sub_board| {
            LINES.iter().map(|line| {
                let mut mask = BitBoard::empty();
                for &cell in line {
                    mask |= BitBoard::from_cell(sub_board, cell);
                }
                mask
            }).collect()
        }).collect()
    };
}

/// The eight line masks of `sub_board`, in the order of [`LINES`].
pub fn line_masks(sub_board: usize) -> &'static [BitBoard] {
    &LINE_MASKS[sub_board - 1]
}

pub fn is_valid_index(index: usize) -> bool {
    (1..=SIZE).contains(&index)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Player {
    Us,
    Them,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::Us => Player::Them,
            Player::Them => Player::Us,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Cell {
    Empty,
    Us,
    Them,
}

impl Cell {
    fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Us => 'X',
            Cell::Them => 'O',
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Us => Cell::Us,
            Player::Them => Cell::Them,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Move {
    pub sub_board: usize,
    pub cell: usize,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.sub_board, self.cell)
    }
}

/// The meta-board: nine sub-boards plus the sub-board the next move is forced into.
///
/// Indices are 1-based throughout. Mutators do not check legality or range;
/// callers outside the search validate with [`is_valid_index`] first.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Board {
    us_squares: BitBoard,
    them_squares: BitBoard,
    active: Option<usize>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            us_squares: BitBoard::empty(),
            them_squares: BitBoard::empty(),
            active: None,
        }
    }

    /// Writes `player` into the cell and forces the next move into sub-board `cell`.
    pub fn set(&mut self, sub_board: usize, cell: usize, player: Player) {
        debug_assert!(is_valid_index(sub_board) && is_valid_index(cell));
        let (mine, theirs) = match player {
            Player::Us => (&mut self.us_squares, &mut self.them_squares),
            Player::Them => (&mut self.them_squares, &mut self.us_squares),
        };
        theirs.set_cell(sub_board, cell, false);
        mine.set_cell(sub_board, cell, true);
        self.active = Some(cell);
    }

    /// Resets a cell to empty. Only for undoing speculative moves; `active` is left alone.
    pub fn clear(&mut self, sub_board: usize, cell: usize) {
        self.us_squares.set_cell(sub_board, cell, false);
        self.them_squares.set_cell(sub_board, cell, false);
    }

    pub fn get(&self, sub_board: usize, cell: usize) -> Cell {
        let square = BitBoard::from_cell(sub_board, cell);
        if self.us_squares & square == square {
            Cell::Us
        } else if self.them_squares & square == square {
            Cell::Them
        } else {
            Cell::Empty
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: Option<usize>) {
        self.active = active;
    }

    pub fn squares(&self, player: Player) -> BitBoard {
        match player {
            Player::Us => self.us_squares,
            Player::Them => self.them_squares,
        }
    }

    fn empty_squares(&self) -> BitBoard {
        !(self.us_squares | self.them_squares)
    }

    pub fn count(&self, sub_board: usize, player: Player) -> usize {
        (self.squares(player) & SUB_BOARD_MASKS[sub_board - 1]).count_ones()
    }

    pub fn is_won_by(&self, sub_board: usize, player: Player) -> bool {
        let squares = self.squares(player);
        line_masks(sub_board).iter().any(|mask| *mask & squares == *mask)
    }

    pub fn is_full(&self, sub_board: usize) -> bool {
        self.count(sub_board, Player::Us) + self.count(sub_board, Player::Them) == SIZE
    }

    pub fn is_draw(&self, sub_board: usize) -> bool {
        self.is_full(sub_board)
            && !self.is_won_by(sub_board, Player::Us)
            && !self.is_won_by(sub_board, Player::Them)
    }

    pub fn is_open(&self, sub_board: usize) -> bool {
        !self.is_full(sub_board)
            && !self.is_won_by(sub_board, Player::Us)
            && !self.is_won_by(sub_board, Player::Them)
    }

    /// True once any sub-board is won or the forced sub-board has no room left.
    pub fn is_game_over(&self) -> bool {
        (1..=SIZE).any(|sub_board| {
            self.is_won_by(sub_board, Player::Us) || self.is_won_by(sub_board, Player::Them)
        }) || self.active.map_or(false, |sub_board| self.is_full(sub_board))
    }

    /// Empty cells of `sub_board` in ascending order.
    pub fn legal_moves(&self, sub_board: usize) -> Vec<usize> {
        (self.empty_squares() & SUB_BOARD_MASKS[sub_board - 1])
            .iter_set_cells()
            .map(|(_, cell)| cell)
            .collect()
    }

    pub fn first_empty(&self, sub_board: usize) -> Option<usize> {
        (1..=SIZE).find(|&cell| self.get(sub_board, cell) == Cell::Empty)
    }
}

const BANDS: [[usize; 3]; 3] = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (band_idx, band) in BANDS.iter().enumerate() {
            if band_idx > 0 {
                writeln!(f, " ------+-------+------")?;
            }
            for row in BANDS.iter() {
                let line: Vec<String> = band.iter().map(|&sub_board| {
                    row.iter()
                        .map(|&cell| self.get(sub_board, cell).to_char().to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                }).collect();
                writeln!(f, " {}", line.join(" | "))?;
            }
        }
        Ok(())
    }
}
