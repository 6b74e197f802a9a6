//! Flood-fill reveal.

use crate::{Board, Cell};

/// A disclosed cell and its adjacency count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Revealed {
    pub row: usize,
    pub col: usize,
    pub value: u8,
}

/// Discloses the cells reachable from `(row, col)`.
///
/// The start cell is always included. Whenever a disclosed cell has no
/// neighbouring mines, all of its neighbours are disclosed too, so a click
/// on a zero opens the whole connected zero region plus its numbered
/// border. Every cell appears at most once.
///
/// Uses an explicit LIFO work list and visited bitmap instead of recursion,
/// so large open regions cannot exhaust the stack.
///
/// The caller is expected to have checked that the start cell is not a
/// mine; if it is, or if it is out of bounds, the result is empty.
pub fn reveal_from(board: &Board, row: usize, col: usize) -> Vec<Revealed> {
    let width = board.width();
    let mut visited = vec![false; width * board.height()];
    let mut stack = vec![(row, col)];
    let mut revealed = Vec::new();

    while let Some((r, c)) = stack.pop() {
        let Some(cell) = board.cell(r, c) else {
            continue;
        };
        let idx = r * width + c;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        let Cell::Safe(value) = cell else {
            // Only reachable as the start cell; zeros never border a mine.
            continue;
        };
        revealed.push(Revealed { row: r, col: c, value });

        if value == 0 {
            stack.extend(
                board
                    .neighbours(r, c)
                    .filter(|&(nr, nc)| !visited[nr * width + nc]),
            );
        }
    }

    revealed
}
