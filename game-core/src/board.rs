use game_types::PlayerId;

use crate::GameError;

pub const MIN_BOARD_SIZE: usize = 3;

/// Cell value of an unowned position.
pub const EMPTY_CELL: PlayerId = 0;

// horizontal, vertical and both diagonals
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Square grid of cell ownership. Cells are never cleared once set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<PlayerId>,
}

impl Board {
    pub fn new(size: i32) -> Result<Self, GameError> {
        let size = usize::try_from(size)
            .ok()
            .filter(|size| *size >= MIN_BOARD_SIZE)
            .ok_or(GameError::InvalidSize { size })?;

        Ok(Self {
            size,
            cells: vec![EMPTY_CELL; size * size],
        })
    }

    /// Rebuilds a board from row-major cell values, e.g. a persisted document.
    /// Fails with `InvalidBoard` unless the rows form a square of at least
    /// `MIN_BOARD_SIZE` with no negative owner ids.
    pub fn from_rows(rows: Vec<Vec<PlayerId>>) -> Result<Self, GameError> {
        let size = rows.len();
        if size < MIN_BOARD_SIZE || rows.iter().any(|row| row.len() != size) {
            return Err(GameError::InvalidBoard);
        }

        let cells: Vec<PlayerId> = rows.into_iter().flatten().collect();
        if cells.iter().any(|owner| *owner < EMPTY_CELL) {
            return Err(GameError::InvalidBoard);
        }

        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row slices in top-to-bottom order.
    pub fn rows(&self) -> impl Iterator<Item = &[PlayerId]> {
        self.cells.chunks(self.size)
    }

    /// Owner of a cell, `None` when the cell is empty or off the board.
    pub fn owner(&self, row: i32, col: i32) -> Option<PlayerId> {
        self.index(row, col)
            .map(|index| self.cells[index])
            .filter(|owner| *owner != EMPTY_CELL)
    }

    pub fn place(&mut self, row: i32, col: i32, owner: PlayerId) -> Result<(), GameError> {
        let index = self
            .index(row, col)
            .ok_or(GameError::OutOfBounds { row, col })?;

        if self.cells[index] != EMPTY_CELL {
            return Err(GameError::AlreadyOccupied { row, col });
        }

        self.cells[index] = owner;
        Ok(())
    }

    pub fn is_out_of_bounds(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_none()
    }

    /// Off-board positions are reported as unoccupied.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.owner(row, col).is_some()
    }

    pub fn is_occupied_by(&self, row: i32, col: i32, owner: PlayerId) -> bool {
        self.owner(row, col) == Some(owner)
    }

    /// Whether the cell at `(row, col)` sits on a contiguous run of `owner`
    /// cells at least `win_length` long (clamped to the board size).
    ///
    /// Only scans outward from the given cell, so it must be called with the
    /// position of the move just made.
    pub fn check_win(&self, row: i32, col: i32, owner: PlayerId, win_length: usize) -> bool {
        let needed = win_length.min(self.size);

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let mut count = 1;
            for step in [-1, 1] {
                let (mut r, mut c) = (row + step * dr, col + step * dc);
                while self.is_occupied_by(r, c, owner) {
                    count += 1;
                    r += step * dr;
                    c += step * dc;
                }
            }
            count >= needed
        })
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let row = usize::try_from(row).ok().filter(|r| *r < self.size)?;
        let col = usize::try_from(col).ok().filter(|c| *c < self.size)?;
        Some(row * self.size + col)
    }
}
