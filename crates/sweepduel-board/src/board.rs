//! The board: mine layout and adjacency counts.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Offsets of the up-to-eight neighbours of a cell.
const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Mine,
    /// A safe cell and the number of mines among its neighbours.
    Safe(u8),
}

impl Cell {
    pub fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    /// The adjacency count, or `None` for a mine.
    pub fn value(self) -> Option<u8> {
        match self {
            Self::Mine => None,
            Self::Safe(n) => Some(n),
        }
    }
}

/// An immutable `width × height` minefield, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    mines: usize,
    seed: Option<u64>,
    cells: Vec<Cell>,
}

impl Board {
    /// Generates a board with `mines` mines placed uniformly at random.
    ///
    /// Mine positions are a sample without replacement of linear cell
    /// indices drawn from a `StdRng` seeded with `seed`, so the same
    /// arguments always produce the same board. Without a seed one is drawn
    /// from the thread RNG and kept on the board (see [`seed`](Self::seed)).
    ///
    /// # Panics
    /// If either dimension is zero or `mines >= width * height`.
    pub fn generate(
        width: usize,
        height: usize,
        mines: usize,
        seed: Option<u64>,
    ) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be non-zero");
        assert!(
            mines < width * height,
            "mine count {mines} must be below cell count {}",
            width * height
        );

        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = index::sample(&mut rng, width * height, mines);

        tracing::debug!(width, height, mines, seed, "generated board");
        Self::build(
            width,
            height,
            Some(seed),
            positions.into_iter().map(|i| (i / width, i % width)),
        )
    }

    /// Builds a board with mines at exactly the given `(row, col)`
    /// positions. Duplicates are ignored.
    ///
    /// # Panics
    /// If a dimension is zero, a position is out of bounds, or the
    /// positions cover every cell.
    pub fn with_mines(
        width: usize,
        height: usize,
        positions: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be non-zero");
        let board = Self::build(width, height, None, positions);
        assert!(board.mines < width * height, "board needs a safe cell");
        board
    }

    fn build(
        width: usize,
        height: usize,
        seed: Option<u64>,
        positions: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut cells = vec![Cell::Safe(0); width * height];
        let mut mines = 0;

        for (row, col) in positions {
            assert!(row < height && col < width, "mine ({row}, {col}) out of bounds");
            let idx = row * width + col;
            if cells[idx].is_mine() {
                continue;
            }
            cells[idx] = Cell::Mine;
            mines += 1;
        }

        // Second pass so a neighbour that later turns out to be a mine is
        // never counted.
        for idx in 0..cells.len() {
            if !cells[idx].is_mine() {
                continue;
            }
            for (nr, nc) in neighbours(width, height, idx / width, idx % width) {
                if let Cell::Safe(n) = &mut cells[nr * width + nc] {
                    *n += 1;
                }
            }
        }

        Self {
            width,
            height,
            mines,
            seed,
            cells,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of mines on the board.
    pub fn mines(&self) -> usize {
        self.mines
    }

    /// Number of cells that are not mines.
    pub fn safe_cells(&self) -> usize {
        self.width * self.height - self.mines
    }

    /// The seed the layout was generated from. `None` for hand-laid boards.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// The cell at `(row, col)`, or `None` if out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.contains(row, col)
            .then(|| self.cells[row * self.width + col])
    }

    /// In-bounds neighbours of `(row, col)`: 8 inside, 5 on an edge, 3 in a
    /// corner.
    pub fn neighbours(
        &self,
        row: usize,
        col: usize,
    ) -> impl Iterator<Item = (usize, usize)> + use<> {
        neighbours(self.width, self.height, row, col)
    }

    /// Iterates over every cell with its coordinates, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (i / self.width, i % self.width, *cell))
    }

    /// Iterates over the coordinates of every mine.
    pub fn mine_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells()
            .filter(|(_, _, cell)| cell.is_mine())
            .map(|(row, col, _)| (row, col))
    }
}

fn neighbours(
    width: usize,
    height: usize,
    row: usize,
    col: usize,
) -> impl Iterator<Item = (usize, usize)> {
    NEIGHBOUR_OFFSETS.into_iter().filter_map(move |(dr, dc)| {
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        (r < height && c < width).then_some((r, c))
    })
}
