use std::sync::Arc;

use super::Player;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Longest run a player needs to win.
const CONNECT: usize = 4;

/// Axis directions through a cell as (row step, col step). Row 0 is the top,
/// so a negative row step walks upward.
const AXES: [(isize, isize); 4] = [
    (0, 1),  // horizontal
    (1, 0),  // vertical
    (-1, 1), // diagonal /
    (1, 1),  // diagonal \
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

type Row = [Cell; COLS];

/// The 6x7 grid.
///
/// Rows are shared between clones and copied only when a drop writes to them,
/// so a snapshot taken with [`Board::clone`] never observes later mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Arc<Row>; ROWS],
    terminal: bool,
}

/// Where a disc landed and what it did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub row: usize,
    pub col: usize,
    pub win: bool,
    pub full: bool,
}

impl Landing {
    /// True when the drop ended the game by a win or a full board.
    pub fn is_terminal(&self) -> bool {
        self.win || self.full
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    #[error("column {0} does not exist")]
    InvalidColumn(usize),

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("the game is already over")]
    GameOver,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        let empty: Arc<Row> = Arc::new([Cell::Empty; COLS]);
        Board {
            rows: std::array::from_fn(|_| Arc::clone(&empty)),
            terminal: false,
        }
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.rows[row][col]
    }

    /// Borrow a whole row.
    pub fn row(&self, row: usize) -> &[Cell; COLS] {
        &self.rows[row]
    }

    /// True once a drop has produced a win or filled the board.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Check if a column is full
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.rows[0][col] != Cell::Empty
    }

    /// Drop a disc into `col` for `player`.
    ///
    /// On error the board is untouched. Only the landing row is copied; every
    /// other row stays shared with earlier snapshots.
    pub fn drop_disc(&mut self, col: usize, player: Player) -> Result<Landing, DropError> {
        if self.terminal {
            return Err(DropError::GameOver);
        }
        if col >= COLS {
            return Err(DropError::InvalidColumn(col));
        }

        // Scan bottom-up for the first empty cell
        let row = (0..ROWS)
            .rev()
            .find(|&row| self.rows[row][col] == Cell::Empty)
            .ok_or(DropError::ColumnFull(col))?;

        let cell = player.to_cell();
        Arc::make_mut(&mut self.rows[row])[col] = cell;

        let win = self.check_winner(row, col, cell);
        let full = self.check_draw();
        self.terminal = win || full;

        Ok(Landing {
            row,
            col,
            win,
            full,
        })
    }

    /// Check whether the disc at (row, col) completes a run of four.
    ///
    /// Only the four axes through the cell are inspected, at most three cells
    /// each way, so this is constant time per move.
    /// Out-of-range coordinates never win.
    pub fn check_winner(&self, row: usize, col: usize, cell: Cell) -> bool {
        if row >= ROWS || col >= COLS {
            return false;
        }
        if cell == Cell::Empty || self.get(row, col) != cell {
            return false;
        }

        AXES.iter().any(|&(dr, dc)| {
            let forward = self.count_run(row, col, dr, dc, cell);
            let backward = self.count_run(row, col, -dr, -dc, cell);
            1 + forward + backward >= CONNECT
        })
    }

    /// Count contiguous `cell`s walking from (row, col) in one direction,
    /// excluding the starting cell.
    fn count_run(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize, col as isize);

        for _ in 1..CONNECT {
            r += dr;
            c += dc;
            if r < 0 || c < 0 || r >= ROWS as isize || c >= COLS as isize {
                break;
            }
            if self.rows[r as usize][c as usize] != cell {
                break;
            }
            count += 1;
        }

        count
    }

    /// True iff the top row is completely filled. Gravity means this is the
    /// same as the whole board being full.
    pub fn check_draw(&self) -> bool {
        self.rows[0].iter().all(|&cell| cell != Cell::Empty)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.check_draw()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
