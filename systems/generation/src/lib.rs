#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Layout generation for Pinball Panic grids and the engine that owns a board.
//!
//! [`Generator`] produces complete layouts: it picks an entry and an exit on
//! the border, grows the ball's path between them with a randomised
//! depth-first search, then replays the ball to confirm the result before
//! handing it out. [`GridEngine`] owns one board, submits generated layouts to
//! it through the world's `apply` entry point, and answers per-cell queries.

mod search;

use std::collections::BTreeMap;

use pinball_panic_core::{
    Cell, CellCoord, CellType, Command, ConfigurationError, Direction, Event, GridConfiguration,
    Layout, LayoutRejection, ObjectKind, Orientation, PairId,
};
use pinball_panic_system_trajectory::{replay, Trajectory, TraceError};
use pinball_panic_world::{self as world, query, render, Board, QueryError};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::search::Search;

/// Attempts made by [`GridEngine::generate`] before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 400;

/// Search nodes expanded per attempt before the attempt is abandoned.
pub const DEFAULT_SEARCH_BUDGET: u32 = 4_000;

/// Tuning knobs bounding how much work a single `generate` call may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Independent attempts, each with a fresh entry, exit and object count.
    pub max_attempts: u32,
    /// Depth-first search nodes one attempt may expand.
    pub search_budget: u32,
}

impl GenerationSettings {
    /// Creates settings with explicit budgets.
    #[must_use]
    pub const fn new(max_attempts: u32, search_budget: u32) -> Self {
        Self {
            max_attempts,
            search_budget,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_SEARCH_BUDGET)
    }
}

/// Reasons a `generate` call fails. The previous grid is left intact.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Every attempt was rejected.
    #[error("generation failed after {attempts} attempts")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// No count in the configured range can be built from the allowed kinds.
    #[error("generation failed: no object count in {min}..={max} can be built from the allowed object types")]
    UnreachableObjectCount {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// The board refused the generated layout.
    #[error("generation failed: board rejected the layout ({reason:?})")]
    Rejected {
        /// Reason reported by the board.
        reason: LayoutRejection,
    },
}

/// Why a single attempt was discarded.
#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("no exit cell at the required distance from {entry:?}")]
    NoExit { entry: CellCoord },
    #[error("search found no path placing {objects} objects")]
    SearchExhausted { objects: u32 },
    #[error("replay failed: {0}")]
    Replay(#[from] TraceError),
    #[error("ball finished at {actual:?} instead of {expected:?}")]
    WrongExit {
        expected: CellCoord,
        actual: CellCoord,
    },
    #[error("{objects} objects placed outside the configured bounds")]
    ObjectCount { objects: u32 },
    #[error("{kind:?} is not an allowed object type")]
    Disallowed { kind: ObjectKind },
    #[error("object at {cell:?} is never visited")]
    Unvisited { cell: CellCoord },
    #[error("teleporter pair {pair} has {count} cells")]
    BrokenPair { pair: u32, count: u32 },
}

/// Produces validated layouts for a configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Generator {
    settings: GenerationSettings,
}

impl Generator {
    /// Creates a generator bounded by the provided settings.
    #[must_use]
    pub const fn new(settings: GenerationSettings) -> Self {
        Self { settings }
    }

    /// Budgets the generator works within.
    #[must_use]
    pub const fn settings(&self) -> GenerationSettings {
        self.settings
    }

    /// Generates a complete layout whose ball path reaches the exit.
    ///
    /// Each attempt draws a fresh object count, entry and exit from `rng`; the
    /// first attempt whose replay satisfies every layout invariant wins.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        config: &GridConfiguration,
        rng: &mut R,
    ) -> Result<Layout, GenerationError> {
        let unreachable = GenerationError::UnreachableObjectCount {
            min: config.min_objects(),
            max: config.max_objects(),
        };
        let counts = realisable_counts(config);
        if counts.is_empty() {
            return Err(unreachable);
        }

        for attempt in 1..=self.settings.max_attempts {
            let Some(&objects) = counts.choose(rng) else {
                return Err(unreachable);
            };
            match self.attempt(config, objects, rng) {
                Ok(layout) => {
                    debug!(attempt, objects, "grid generated");
                    return Ok(layout);
                }
                Err(failure) => debug!(attempt, objects, %failure, "generation attempt rejected"),
            }
        }

        warn!(
            attempts = self.settings.max_attempts,
            size = config.size(),
            "generation budget exhausted"
        );
        Err(GenerationError::Exhausted {
            attempts: self.settings.max_attempts,
        })
    }

    fn attempt<R: Rng + ?Sized>(
        &self,
        config: &GridConfiguration,
        objects: u32,
        rng: &mut R,
    ) -> Result<Layout, AttemptFailure> {
        let size = config.size();
        let (entry, heading) = random_entry(size, rng);
        let exit = random_exit(size, entry, rng).ok_or(AttemptFailure::NoExit { entry })?;

        let layout = Search::new(config, rng, entry, exit, self.settings.search_budget)
            .run(heading, objects)
            .ok_or(AttemptFailure::SearchExhausted { objects })?;

        validate(config, exit, layout)
    }
}

/// Object counts in the configured range that the allowed kinds can fill.
fn realisable_counts(config: &GridConfiguration) -> Vec<u32> {
    let paired_only = config.allowed() == [ObjectKind::Teleporter];
    (config.min_objects()..=config.max_objects())
        .filter(|count| !paired_only || count % 2 == 0)
        .collect()
}

/// Non-corner border cells in a stable order.
fn border_cells(size: u32) -> Vec<CellCoord> {
    let last = size - 1;
    (1..last)
        .flat_map(|offset| {
            [
                CellCoord::new(0, offset),
                CellCoord::new(last, offset),
                CellCoord::new(offset, 0),
                CellCoord::new(offset, last),
            ]
        })
        .collect()
}

fn random_entry<R: Rng + ?Sized>(size: u32, rng: &mut R) -> (CellCoord, Direction) {
    let last = size - 1;
    let offset = rng.gen_range(1..last);
    match rng.gen_range(0..4) {
        0 => (CellCoord::new(0, offset), Direction::Down),
        1 => (CellCoord::new(last, offset), Direction::Up),
        2 => (CellCoord::new(offset, 0), Direction::Right),
        _ => (CellCoord::new(offset, last), Direction::Left),
    }
}

fn random_exit<R: Rng + ?Sized>(size: u32, entry: CellCoord, rng: &mut R) -> Option<CellCoord> {
    let minimum = (size / 2).max(2);
    let candidates: Vec<CellCoord> = border_cells(size)
        .into_iter()
        .filter(|cell| *cell != entry && cell.manhattan_distance(entry) >= minimum)
        .collect();
    candidates.choose(rng).copied()
}

/// Replays a finished layout and checks every layout invariant.
fn validate(
    config: &GridConfiguration,
    exit: CellCoord,
    mut layout: Layout,
) -> Result<Layout, AttemptFailure> {
    let trajectory = replay(layout.view())?;
    if trajectory.exit() != exit {
        return Err(AttemptFailure::WrongExit {
            expected: exit,
            actual: trajectory.exit(),
        });
    }

    let objects = layout.object_count();
    if objects < config.min_objects() || objects > config.max_objects() {
        return Err(AttemptFailure::ObjectCount { objects });
    }

    let mut pairs: BTreeMap<PairId, u32> = BTreeMap::new();
    for (cell, content) in layout.view().iter() {
        let Some(kind) = content.object_kind() else {
            continue;
        };
        if !config.allows(kind) {
            return Err(AttemptFailure::Disallowed { kind });
        }
        if !trajectory.visits(cell) {
            return Err(AttemptFailure::Unvisited { cell });
        }
        if let Some(pair) = content.pair() {
            *pairs.entry(pair).or_default() += 1;
        }
    }
    if let Some((pair, count)) = pairs.into_iter().find(|(_, count)| *count != 2) {
        return Err(AttemptFailure::BrokenPair {
            pair: pair.get(),
            count,
        });
    }

    layout.set_path(trajectory.cells().to_vec());
    Ok(layout)
}

/// Owns one grid and regenerates it on demand.
///
/// The board is allocated once for the configured size and overwritten in
/// place by every successful [`GridEngine::generate`]. Until the first success
/// every cell reads as [`CellType::Empty`].
#[derive(Debug)]
pub struct GridEngine<R = ChaCha8Rng> {
    config: GridConfiguration,
    board: Board,
    generator: Generator,
    rng: R,
}

impl GridEngine<ChaCha8Rng> {
    /// Creates an engine seeded from operating system entropy.
    #[must_use]
    pub fn new(config: GridConfiguration) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy(), GenerationSettings::default())
    }

    /// Validates the raw parameters and creates an entropy-seeded engine.
    pub fn create(
        size: u32,
        min_objects: u32,
        max_objects: u32,
        allowed: impl IntoIterator<Item = ObjectKind>,
    ) -> Result<Self, ConfigurationError> {
        GridConfiguration::new(size, min_objects, max_objects, allowed).map(Self::new)
    }

    /// Creates an engine whose grids are reproducible from `seed`.
    #[must_use]
    pub fn with_seed(config: GridConfiguration, seed: u64) -> Self {
        Self::with_rng(
            config,
            ChaCha8Rng::seed_from_u64(seed),
            GenerationSettings::default(),
        )
    }
}

impl<R: Rng> GridEngine<R> {
    /// Creates an engine drawing from the provided random source.
    #[must_use]
    pub fn with_rng(config: GridConfiguration, rng: R, settings: GenerationSettings) -> Self {
        let board = Board::new(config.size());
        Self {
            config,
            board,
            generator: Generator::new(settings),
            rng,
        }
    }

    /// Replaces the current grid with a freshly generated one.
    ///
    /// On failure the previously generated grid stays in place.
    pub fn generate(&mut self) -> Result<(), GenerationError> {
        let layout = self.generator.generate(&self.config, &mut self.rng)?;

        let mut events = Vec::new();
        world::apply(
            &mut self.board,
            Command::CommitLayout { layout },
            &mut events,
        );
        for event in events {
            if let Event::LayoutRejected { reason } = event {
                return Err(GenerationError::Rejected { reason });
            }
        }
        Ok(())
    }

    /// Resets every cell to empty, as before the first generation.
    pub fn clear(&mut self) {
        let mut events = Vec::new();
        world::apply(&mut self.board, Command::ClearBoard, &mut events);
    }

    /// Configuration fixed at construction.
    #[must_use]
    pub fn configuration(&self) -> &GridConfiguration {
        &self.config
    }

    /// Budgets used by [`GridEngine::generate`].
    #[must_use]
    pub fn settings(&self) -> GenerationSettings {
        self.generator.settings()
    }

    /// Read-only access to the owned board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Content of the cell at `(row, column)`.
    pub fn cell(&self, row: u32, column: u32) -> Result<Cell, QueryError> {
        query::cell(&self.board, row, column)
    }

    /// Semantic type of the cell at `(row, column)`.
    pub fn cell_type(&self, row: u32, column: u32) -> Result<CellType, QueryError> {
        query::cell_type(&self.board, row, column)
    }

    /// Orientation of the cell at `(row, column)`.
    pub fn orientation(&self, row: u32, column: u32) -> Result<Orientation, QueryError> {
        query::orientation(&self.board, row, column)
    }

    /// Pairing index of the teleporter at `(row, column)`, zero otherwise.
    pub fn teleporter_index(&self, row: u32, column: u32) -> Result<u32, QueryError> {
        query::teleporter_index(&self.board, row, column)
    }

    /// Replays the ball over the current grid; `None` before a grid exists.
    #[must_use]
    pub fn solution(&self) -> Option<Trajectory> {
        if !query::is_generated(&self.board) {
            return None;
        }
        replay(query::grid_view(&self.board)).ok()
    }

    /// Plain-text rendering of the current grid. Path cells read as empty.
    #[must_use]
    pub fn render(&self) -> String {
        render::to_ascii(&self.board)
    }

    /// Plain-text rendering with the solution path drawn in.
    #[must_use]
    pub fn render_solution(&self) -> String {
        render::to_ascii_with_path(&self.board)
    }
}
