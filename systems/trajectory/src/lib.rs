#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic ball movement model shared by generation and validation.
//!
//! The ball travels orthogonally one cell per step. Whenever it enters a cell
//! the cell's redirect rule decides how it continues:
//!
//! | cell | effect |
//! |---|---|
//! | empty, in-path | heading unchanged |
//! | bumper `UpRight` (`╱`) | Up→Right, Right→Up, Down→Left, Left→Down |
//! | bumper `DownRight` (`╲`) | Down→Right, Right→Down, Up→Left, Left→Up |
//! | tunnel | passes along its axis, blocked across it |
//! | teleporter | moved to the partner cell, heading unchanged |
//! | directional bumper | TopLeft→Up, TopRight→Right, BottomRight→Down, BottomLeft→Left |
//! | activated bumper | UpRight→Up, DownRight→Down |
//! | exit | terminal |
//!
//! Re-entering the entry, leaving the grid, a blocked tunnel, an unpaired
//! teleporter, or repeating a `(cell, heading)` pair all end the replay with a
//! [`TraceError`].

use pinball_panic_core::{
    Cell, CellCoord, Corner, Direction, GridView, MirrorOrientation, ObjectKind, PairId,
    TunnelAxis,
};
use thiserror::Error;

/// Multiple of the cell count after which a replay is abandoned.
pub const STEP_LIMIT_FACTOR: u32 = 4;

/// Outcome of the ball entering a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redirect {
    /// The ball keeps rolling with the provided heading.
    Travel(Direction),
    /// The ball is relocated to the partner of the provided pair.
    Teleport(PairId),
    /// The ball reached the exit.
    Finish,
    /// The cell cannot be entered with the current heading.
    Blocked,
    /// The ball rolled back onto the entry cell.
    Reentry,
}

/// Applies the redirect rule of `cell` to a ball entering with `heading`.
#[must_use]
pub fn redirect(cell: Cell, heading: Direction) -> Redirect {
    match cell {
        Cell::Empty | Cell::InPath => Redirect::Travel(heading),
        Cell::Entry => Redirect::Reentry,
        Cell::Exit => Redirect::Finish,
        Cell::Bumper(mirror) => Redirect::Travel(reflect(mirror, heading)),
        Cell::Tunnel(axis) => {
            if axis.admits(heading) {
                Redirect::Travel(heading)
            } else {
                Redirect::Blocked
            }
        }
        Cell::Teleporter(pair) => Redirect::Teleport(pair),
        Cell::ActivatedBumper(mirror) => Redirect::Travel(activated_heading(mirror)),
        Cell::DirectionalBumper(corner) => Redirect::Travel(directional_heading(corner)),
    }
}

/// Reflects `heading` off a diagonal mirror.
#[must_use]
pub const fn reflect(mirror: MirrorOrientation, heading: Direction) -> Direction {
    match (mirror, heading) {
        (MirrorOrientation::UpRight, Direction::Up) => Direction::Right,
        (MirrorOrientation::UpRight, Direction::Right) => Direction::Up,
        (MirrorOrientation::UpRight, Direction::Down) => Direction::Left,
        (MirrorOrientation::UpRight, Direction::Left) => Direction::Down,
        (MirrorOrientation::DownRight, Direction::Down) => Direction::Right,
        (MirrorOrientation::DownRight, Direction::Right) => Direction::Down,
        (MirrorOrientation::DownRight, Direction::Up) => Direction::Left,
        (MirrorOrientation::DownRight, Direction::Left) => Direction::Up,
    }
}

/// Heading an activated bumper launches the ball in.
#[must_use]
pub const fn activated_heading(mirror: MirrorOrientation) -> Direction {
    match mirror {
        MirrorOrientation::UpRight => Direction::Up,
        MirrorOrientation::DownRight => Direction::Down,
    }
}

/// Heading a directional bumper launches the ball in.
#[must_use]
pub const fn directional_heading(corner: Corner) -> Direction {
    match corner {
        Corner::TopLeft => Direction::Up,
        Corner::TopRight => Direction::Right,
        Corner::BottomRight => Direction::Down,
        Corner::BottomLeft => Direction::Left,
    }
}

/// Oriented object of `kind` that turns a ball arriving with `incoming` so it
/// leaves with `outgoing`.
///
/// Returns `None` when no orientation of `kind` realises the move, when the
/// move would send the ball back the way it came, and always for teleporters,
/// whose effect depends on their partner rather than an orientation.
#[must_use]
pub fn placement(kind: ObjectKind, incoming: Direction, outgoing: Direction) -> Option<Cell> {
    if outgoing == incoming.opposite() {
        return None;
    }

    match kind {
        ObjectKind::Bumper => MirrorOrientation::ALL
            .into_iter()
            .find(|mirror| reflect(*mirror, incoming) == outgoing)
            .map(Cell::Bumper),
        ObjectKind::Tunnel => TunnelAxis::ALL
            .into_iter()
            .find(|axis| incoming == outgoing && axis.admits(incoming))
            .map(Cell::Tunnel),
        ObjectKind::ActivatedBumper => MirrorOrientation::ALL
            .into_iter()
            .find(|mirror| activated_heading(*mirror) == outgoing)
            .map(Cell::ActivatedBumper),
        ObjectKind::DirectionalBumper => Corner::ALL
            .into_iter()
            .find(|corner| directional_heading(*corner) == outgoing)
            .map(Cell::DirectionalBumper),
        ObjectKind::Teleporter => None,
    }
}

/// Reasons a replayed ball fails to reach the exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TraceError {
    /// The grid contains no entry cell.
    #[error("grid has no entry cell")]
    MissingEntry,
    /// The entry cell has no inward heading.
    #[error("entry {entry:?} is not a non-corner border cell")]
    MisplacedEntry {
        /// Offending entry cell.
        entry: CellCoord,
    },
    /// The ball rolled off the grid.
    #[error("ball left the grid from {from:?} heading {heading:?}")]
    LeftGrid {
        /// Last cell inside the grid.
        from: CellCoord,
        /// Heading the ball left with.
        heading: Direction,
    },
    /// The ball hit a tunnel across its axis.
    #[error("ball blocked at {cell:?} heading {heading:?}")]
    Blocked {
        /// Blocking cell.
        cell: CellCoord,
        /// Heading the ball arrived with.
        heading: Direction,
    },
    /// The ball rolled back onto the entry.
    #[error("ball returned to the entry at {cell:?}")]
    ReenteredEntry {
        /// Entry cell.
        cell: CellCoord,
    },
    /// A teleporter has no partner.
    #[error("teleporter at {cell:?} has no partner")]
    UnpairedTeleporter {
        /// Orphaned teleporter cell.
        cell: CellCoord,
    },
    /// The ball repeated a cell and heading.
    #[error("ball looped at {cell:?} heading {heading:?}")]
    Cycle {
        /// Cell where the loop closed.
        cell: CellCoord,
        /// Heading that repeated.
        heading: Direction,
    },
    /// The ball did not finish within the step limit.
    #[error("ball did not reach the exit within {limit} steps")]
    StepLimit {
        /// Steps allowed.
        limit: u32,
    },
}

/// Record of a ball that travelled from the entry to the exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trajectory {
    cells: Vec<CellCoord>,
    headings: Vec<Direction>,
    steps: u32,
}

impl Trajectory {
    /// Cells the ball occupied in order, from entry to exit.
    ///
    /// A teleport contributes both the teleporter it entered and the partner it
    /// left from.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Heading the ball left each cell of [`Trajectory::cells`] with; the
    /// exit's entry is the heading it arrived with.
    #[must_use]
    pub fn headings(&self) -> &[Direction] {
        &self.headings
    }

    /// Cell the ball started from.
    #[must_use]
    pub fn entry(&self) -> CellCoord {
        self.cells[0]
    }

    /// Cell the ball finished on.
    #[must_use]
    pub fn exit(&self) -> CellCoord {
        self.cells[self.cells.len() - 1]
    }

    /// Number of cells the ball rolled into.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Number of times the heading changed along the way.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.headings
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count()
    }

    /// Reports whether the ball passed through `coord`.
    #[must_use]
    pub fn visits(&self, coord: CellCoord) -> bool {
        self.cells.contains(&coord)
    }
}

/// Replays a ball from the entry with the default step limit of
/// [`STEP_LIMIT_FACTOR`] times the cell count.
pub fn replay(view: GridView<'_>) -> Result<Trajectory, TraceError> {
    let cells = view.size().saturating_mul(view.size());
    replay_with_limit(view, cells.saturating_mul(STEP_LIMIT_FACTOR))
}

/// Replays a ball from the entry, giving up after `limit` steps.
pub fn replay_with_limit(view: GridView<'_>, limit: u32) -> Result<Trajectory, TraceError> {
    let size = view.size();
    let entry = view.entry().ok_or(TraceError::MissingEntry)?;
    let mut heading = entry
        .inward_heading(size)
        .ok_or(TraceError::MisplacedEntry { entry })?;

    let width = usize::try_from(size).unwrap_or(0);
    let mut seen = vec![false; width * width * Direction::ALL.len()];
    let mut cells = vec![entry];
    let mut headings = vec![heading];
    let mut position = entry;
    let mut steps = 0;

    loop {
        if steps >= limit {
            return Err(TraceError::StepLimit { limit });
        }

        let next = position.step(heading, size).ok_or(TraceError::LeftGrid {
            from: position,
            heading,
        })?;
        steps += 1;
        let cell = view.cell(next).unwrap_or_default();

        position = match redirect(cell, heading) {
            Redirect::Finish => {
                cells.push(next);
                headings.push(heading);
                return Ok(Trajectory {
                    cells,
                    headings,
                    steps,
                });
            }
            Redirect::Reentry => return Err(TraceError::ReenteredEntry { cell: next }),
            Redirect::Blocked => {
                return Err(TraceError::Blocked {
                    cell: next,
                    heading,
                })
            }
            Redirect::Travel(outgoing) => {
                heading = outgoing;
                next
            }
            Redirect::Teleport(pair) => {
                let partner = view
                    .partner(pair, next)
                    .ok_or(TraceError::UnpairedTeleporter { cell: next })?;
                cells.push(next);
                headings.push(heading);
                partner
            }
        };

        let slot = position
            .index(size)
            .map(|index| index * Direction::ALL.len() + heading.slot());
        if let Some(visited) = slot.and_then(|slot| seen.get_mut(slot)) {
            if *visited {
                return Err(TraceError::Cycle {
                    cell: position,
                    heading,
                });
            }
            *visited = true;
        }

        cells.push(position);
        headings.push(heading);
    }
}
