//! Tab pattern: which side of every internal grid edge gets the tab.
//!
//! One random sign is drawn per internal edge and stored once. Both
//! pieces that share the edge read that same entry and derive opposite
//! local edge types from it, which is what guarantees they interlock.
//!
//! # Conventions
//!
//! - Horizontal edge `(r, c)` runs along the top of cell `(r, c)`; it
//!   exists for `r` in `1..rows`.
//! - Vertical edge `(r, c)` runs along the left of cell `(r, c)`; it
//!   exists for `c` in `1..columns`.
//! - The stored sign is what the cell *below* / *right of* the edge sees
//!   on its top / left side. The cell above / left owns the edge as its
//!   bottom / right side and sees the negation.

use rand::Rng;
use rand::SeedableRng;
use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::edge::EdgeType;

/// Direction of an internal grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// Edge between two vertically adjacent cells.
    Horizontal,
    /// Edge between two horizontally adjacent cells.
    Vertical,
}

/// Identifies one internal edge of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridEdgeKey {
    /// Horizontal or vertical.
    pub orientation: Orientation,
    /// Row index (see the module docs for the convention).
    pub row: u32,
    /// Column index (see the module docs for the convention).
    pub column: u32,
}

impl GridEdgeKey {
    /// Key of the horizontal edge along the top of cell `(row, column)`.
    #[must_use]
    pub const fn horizontal(row: u32, column: u32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            row,
            column,
        }
    }

    /// Key of the vertical edge along the left of cell `(row, column)`.
    #[must_use]
    pub const fn vertical(row: u32, column: u32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            row,
            column,
        }
    }
}

/// Shared sign stored for one internal edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabSign {
    /// `-1`: the non-owning side gets a slot.
    Slot,
    /// `+1`: the non-owning side gets a tab.
    Tab,
}

impl TabSign {
    /// The sign as `-1` or `+1`.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Slot => -1,
            Self::Tab => 1,
        }
    }
}

/// The edge type one piece sees for a shared edge.
///
/// `shared` is the pattern entry (`None` for the outer border).
/// `is_owning_side` is `true` when the edge is the piece's bottom or
/// right side; those pieces see the negated sign.
#[must_use]
pub const fn derive_local_edge_type(shared: Option<TabSign>, is_owning_side: bool) -> EdgeType {
    match (shared, is_owning_side) {
        (None, _) => EdgeType::Flat,
        (Some(TabSign::Tab), false) | (Some(TabSign::Slot), true) => EdgeType::Outward,
        (Some(TabSign::Slot), false) | (Some(TabSign::Tab), true) => EdgeType::Inward,
    }
}

/// The four sides of one piece, clockwise from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceEdges {
    /// Top side.
    pub top: EdgeType,
    /// Right side.
    pub right: EdgeType,
    /// Bottom side.
    pub bottom: EdgeType,
    /// Left side.
    pub left: EdgeType,
}

impl PieceEdges {
    /// All four sides flat: a single-piece puzzle.
    pub const FLAT: Self = Self {
        top: EdgeType::Flat,
        right: EdgeType::Flat,
        bottom: EdgeType::Flat,
        left: EdgeType::Flat,
    };
}

/// Immutable tab/slot assignment for every internal edge of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabPattern {
    rows: u32,
    columns: u32,
    /// `(rows - 1) * columns` entries, row-major starting at row 1.
    horizontal: Vec<TabSign>,
    /// `rows * (columns - 1)` entries, row-major starting at column 1.
    vertical: Vec<TabSign>,
}

impl TabPattern {
    /// Draw one sign per internal edge from `rng`.
    ///
    /// Horizontal edges are drawn first in row-major order, then vertical
    /// edges, so a given generator state always yields the same pattern.
    pub fn assign<R: Rng + ?Sized>(rows: u32, columns: u32, rng: &mut R) -> Self {
        let mut draw = || {
            let tab: bool = Standard.sample(rng);
            if tab { TabSign::Tab } else { TabSign::Slot }
        };
        let horizontal = (1..rows)
            .flat_map(|_| 0..columns)
            .map(|_| draw())
            .collect();
        let vertical = (0..rows)
            .flat_map(|_| 1..columns)
            .map(|_| draw())
            .collect();
        Self {
            rows,
            columns,
            horizontal,
            vertical,
        }
    }

    /// [`assign`](Self::assign) with a generator seeded from `seed`.
    #[must_use]
    pub fn from_seed(rows: u32, columns: u32, seed: u64) -> Self {
        Self::assign(rows, columns, &mut StdRng::seed_from_u64(seed))
    }

    /// Number of piece rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of piece columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Stored sign for `key`, or `None` for border and out-of-range keys.
    #[must_use]
    pub fn get(&self, key: GridEdgeKey) -> Option<TabSign> {
        let GridEdgeKey {
            orientation,
            row,
            column,
        } = key;
        match orientation {
            Orientation::Horizontal => {
                if row == 0 || row >= self.rows || column >= self.columns {
                    return None;
                }
                let index = (row - 1) as usize * self.columns as usize + column as usize;
                self.horizontal.get(index).copied()
            }
            Orientation::Vertical => {
                if column == 0 || column >= self.columns || row >= self.rows {
                    return None;
                }
                let index = row as usize * (self.columns as usize - 1) + (column - 1) as usize;
                self.vertical.get(index).copied()
            }
        }
    }

    /// Every internal edge with its sign, horizontal edges first.
    pub fn iter(&self) -> impl Iterator<Item = (GridEdgeKey, TabSign)> + '_ {
        let horizontal = (1..self.rows)
            .flat_map(move |r| (0..self.columns).map(move |c| GridEdgeKey::horizontal(r, c)));
        let vertical = (0..self.rows)
            .flat_map(move |r| (1..self.columns).map(move |c| GridEdgeKey::vertical(r, c)));
        horizontal
            .chain(vertical)
            .zip(self.horizontal.iter().chain(&self.vertical).copied())
    }

    /// The four edge types of the piece at `(row, column)`.
    ///
    /// Sides on the outer border are always [`EdgeType::Flat`].
    #[must_use]
    pub fn piece_edges(&self, row: u32, column: u32) -> PieceEdges {
        PieceEdges {
            top: derive_local_edge_type(self.get(GridEdgeKey::horizontal(row, column)), false),
            right: derive_local_edge_type(
                self.get(GridEdgeKey::vertical(row, column + 1)),
                true,
            ),
            bottom: derive_local_edge_type(
                self.get(GridEdgeKey::horizontal(row + 1, column)),
                true,
            ),
            left: derive_local_edge_type(self.get(GridEdgeKey::vertical(row, column)), false),
        }
    }
}
