//! Complete cell layouts and borrowed views over them.

use serde::{Deserialize, Serialize};

use crate::{Cell, CellCoord, PairId};

/// Dense row-major description of every cell in a square grid.
///
/// Layouts are produced by the generation system, decoded from transfer
/// strings, and committed to the board. The optional path records the cells
/// the ball visits in order, teleporter partners included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    size: u32,
    cells: Vec<Cell>,
    path: Vec<CellCoord>,
}

impl Layout {
    /// Creates an all-empty layout for a `size`×`size` grid.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let width = usize::try_from(size).unwrap_or(0);
        Self {
            size,
            cells: vec![Cell::Empty; width.saturating_mul(width)],
            path: Vec::new(),
        }
    }

    /// Wraps an existing row-major cell buffer, rejecting mismatched lengths.
    #[must_use]
    pub fn from_cells(size: u32, cells: Vec<Cell>) -> Option<Self> {
        let width = usize::try_from(size).ok()?;
        if cells.len() != width.checked_mul(width)? {
            return None;
        }
        Some(Self {
            size,
            cells,
            path: Vec::new(),
        })
    }

    /// Edge length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Row-major cell buffer.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Content of the provided cell, or `None` when outside the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        coord
            .index(self.size)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites a cell, returning its previous content.
    pub fn set(&mut self, coord: CellCoord, cell: Cell) -> Option<Cell> {
        let index = coord.index(self.size)?;
        let slot = self.cells.get_mut(index)?;
        Some(std::mem::replace(slot, cell))
    }

    /// Ordered cells visited by the ball, empty when unknown.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Replaces the recorded path.
    pub fn set_path(&mut self, path: Vec<CellCoord>) {
        self.path = path;
    }

    /// Number of cells holding special objects.
    #[must_use]
    pub fn object_count(&self) -> u32 {
        let count = self.cells.iter().filter(|cell| cell.is_object()).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Borrowed read-only view over the layout.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }
}

/// Read-only view into a dense square cell buffer.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    size: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [Cell], size: u32) -> Self {
        Self { cells, size }
    }

    /// Edge length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Content of the provided cell, or `None` when outside the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        coord
            .index(self.size)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Iterates over every cell together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + 'a {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| {
                CellCoord::from_index(index, size).map(|coord| (coord, *cell))
            })
    }

    /// First cell holding [`Cell::Entry`].
    #[must_use]
    pub fn entry(&self) -> Option<CellCoord> {
        self.find(|cell| *cell == Cell::Entry)
    }

    /// First cell holding [`Cell::Exit`].
    #[must_use]
    pub fn exit(&self) -> Option<CellCoord> {
        self.find(|cell| *cell == Cell::Exit)
    }

    /// Teleporter cell sharing `pair` other than `from`.
    #[must_use]
    pub fn partner(&self, pair: PairId, from: CellCoord) -> Option<CellCoord> {
        self.iter()
            .find(|(coord, cell)| *coord != from && cell.pair() == Some(pair))
            .map(|(coord, _)| coord)
    }

    fn find(&self, predicate: impl Fn(&Cell) -> bool) -> Option<CellCoord> {
        self.cells
            .iter()
            .position(predicate)
            .and_then(|index| CellCoord::from_index(index, self.size))
    }
}
