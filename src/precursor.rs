use serde::{Deserialize, Serialize};

use crate::store::Store;

/// A grid cell flagged to start from the precursor initial conditions.
///
/// On the wire a square is a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_within(&self, grid_size: usize) -> bool {
        self.row < grid_size && self.col < grid_size
    }
}

impl From<(usize, usize)> for Square {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Square> for (usize, usize) {
    fn from(square: Square) -> Self {
        (square.row, square.col)
    }
}

/// Precursor squares in the order they were marked. Resets to empty.
///
/// The list behaves as a set: adding a square already present is a no-op.
pub type PrecursorSquareStore = Store<Vec<Square>>;

impl Store<Vec<Square>> {
    pub fn add(&self, square: Square) {
        if self.contains(square) {
            return;
        }
        self.update(|squares| {
            let mut next = squares.clone();
            next.push(square);
            next
        });
    }

    pub fn remove(&self, square: Square) {
        if !self.contains(square) {
            return;
        }
        self.update(|squares| squares.iter().copied().filter(|s| *s != square).collect());
    }

    /// Marks `square` if unmarked, unmarks it otherwise. Returns whether the
    /// square is marked afterwards.
    pub fn toggle(&self, square: Square) -> bool {
        if self.contains(square) {
            self.remove(square);
            false
        } else {
            self.add(square);
            true
        }
    }

    /// Replaces the whole list, dropping repeated squares.
    pub fn sync(&self, squares: impl IntoIterator<Item = Square>) {
        let mut next: Vec<Square> = Vec::new();
        for square in squares {
            if !next.contains(&square) {
                next.push(square);
            }
        }
        self.set(next);
    }

    pub fn contains(&self, square: Square) -> bool {
        self.get().contains(&square)
    }
}
