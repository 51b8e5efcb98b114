#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for the Pinball Panic grid engine.

pub mod render;

use pinball_panic_core::{Cell, CellCoord, Command, Event, Layout, LayoutRejection};
use tracing::trace;

/// Represents the authoritative N×N cell buffer of one grid.
///
/// The buffer is allocated once by [`Board::new`] and every committed layout
/// overwrites it in place, so its length never changes for the board's
/// lifetime.
#[derive(Debug)]
pub struct Board {
    size: u32,
    cells: Vec<Cell>,
    path: Vec<CellCoord>,
    generated: bool,
}

impl Board {
    /// Allocates an all-empty `size`×`size` board.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let width = usize::try_from(size).unwrap_or(0);
        let capacity = width.saturating_mul(width);
        Self {
            size,
            cells: vec![Cell::Empty; capacity],
            path: Vec::with_capacity(capacity),
            generated: false,
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
        self.path.clear();
        self.generated = false;
    }

    fn commit(&mut self, layout: &Layout) {
        self.cells.copy_from_slice(layout.cells());
        self.path.clear();
        self.path.extend_from_slice(layout.path());
        self.generated = true;
    }
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ClearBoard => {
            board.clear();
            out_events.push(Event::BoardCleared);
        }
        Command::CommitLayout { layout } => {
            if layout.size() != board.size || layout.cells().len() != board.cells.len() {
                out_events.push(Event::LayoutRejected {
                    reason: LayoutRejection::SizeMismatch {
                        expected: board.size,
                        actual: layout.size(),
                    },
                });
                return;
            }

            let view = layout.view();
            let Some(entry) = view.entry() else {
                out_events.push(Event::LayoutRejected {
                    reason: LayoutRejection::MissingEntry,
                });
                return;
            };
            let Some(exit) = view.exit() else {
                out_events.push(Event::LayoutRejected {
                    reason: LayoutRejection::MissingExit,
                });
                return;
            };

            board.commit(&layout);
            let objects = layout.object_count();
            trace!(?entry, ?exit, objects, "layout committed");
            out_events.push(Event::LayoutCommitted {
                entry,
                exit,
                objects,
            });
        }
    }
}

/// Reasons a board query is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The coordinates fall outside the grid.
    #[error("cell ({row}, {column}) lies outside the {size}x{size} grid")]
    IndexOutOfBounds {
        /// Requested row.
        row: u32,
        /// Requested column.
        column: u32,
        /// Edge length of the grid.
        size: u32,
    },
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use pinball_panic_core::{Cell, CellCoord, CellType, GridView, Orientation};

    use super::{Board, QueryError};

    /// Edge length of the board.
    #[must_use]
    pub fn size(board: &Board) -> u32 {
        board.size
    }

    /// Reports whether a layout has been committed since the last clear.
    #[must_use]
    pub fn is_generated(board: &Board) -> bool {
        board.generated
    }

    /// Captures a read-only view of every cell.
    #[must_use]
    pub fn grid_view(board: &Board) -> GridView<'_> {
        GridView::new(&board.cells, board.size)
    }

    /// Content of the cell at `(row, column)`.
    pub fn cell(board: &Board, row: u32, column: u32) -> Result<Cell, QueryError> {
        grid_view(board)
            .cell(CellCoord::new(row, column))
            .ok_or(QueryError::IndexOutOfBounds {
                row,
                column,
                size: board.size,
            })
    }

    /// Semantic type of the cell at `(row, column)`.
    pub fn cell_type(board: &Board, row: u32, column: u32) -> Result<CellType, QueryError> {
        cell(board, row, column).map(|cell| cell.cell_type())
    }

    /// Orientation of the cell at `(row, column)`, [`Orientation::None`] when
    /// the cell type carries none.
    pub fn orientation(board: &Board, row: u32, column: u32) -> Result<Orientation, QueryError> {
        cell(board, row, column).map(|cell| cell.orientation())
    }

    /// Pairing index of the teleporter at `(row, column)`, zero for any other cell.
    pub fn teleporter_index(board: &Board, row: u32, column: u32) -> Result<u32, QueryError> {
        cell(board, row, column).map(|cell| cell.pair().map_or(0, |pair| pair.get()))
    }

    /// Cell the ball starts from, once a layout is committed.
    #[must_use]
    pub fn entry(board: &Board) -> Option<CellCoord> {
        grid_view(board).entry()
    }

    /// Cell the ball leaves through, once a layout is committed.
    #[must_use]
    pub fn exit(board: &Board) -> Option<CellCoord> {
        grid_view(board).exit()
    }

    /// Enumerates every object cell in row-major order.
    #[must_use]
    pub fn objects(board: &Board) -> Vec<(CellCoord, Cell)> {
        grid_view(board)
            .iter()
            .filter(|(_, cell)| cell.is_object())
            .collect()
    }

    /// Other end of the teleporter at `coord`, if the cell is a teleporter.
    #[must_use]
    pub fn teleporter_partner(board: &Board, coord: CellCoord) -> Option<CellCoord> {
        let view = grid_view(board);
        let pair = view.cell(coord)?.pair()?;
        view.partner(pair, coord)
    }

    /// Ordered cells the ball visits in the committed layout.
    #[must_use]
    pub fn path(board: &Board) -> &[CellCoord] {
        &board.path
    }
}
