#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pinball Panic grid engine.
//!
//! This crate defines the vocabulary that connects the authoritative board,
//! the pure trajectory and generation systems, and the adapters. Systems
//! produce [`Layout`] values and submit them to the board as [`Command`]
//! values; the board executes those commands via its `apply` entry point and
//! reports what changed through [`Event`] values. Read access always goes
//! through the borrowed [`GridView`].

mod layout;

pub use layout::{GridView, Layout};

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Smallest grid that still leaves an interior cell for the ball to turn in.
pub const MIN_GRID_SIZE: u32 = 3;

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets every cell of the board to [`Cell::Empty`].
    ClearBoard,
    /// Overwrites the board with a complete, validated layout.
    CommitLayout {
        /// Layout produced by the generation system.
        layout: Layout,
    },
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that every cell was reset to empty.
    BoardCleared,
    /// Confirms that a layout now occupies the board.
    LayoutCommitted {
        /// Cell the ball enters from.
        entry: CellCoord,
        /// Cell the ball leaves through.
        exit: CellCoord,
        /// Number of object cells the layout placed.
        objects: u32,
    },
    /// Reports that a layout could not be committed; the board is unchanged.
    LayoutRejected {
        /// Specific reason the layout was refused.
        reason: LayoutRejection,
    },
}

/// Reasons the board refuses to commit a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutRejection {
    /// The layout was built for a different grid size.
    SizeMismatch {
        /// Edge length of the board.
        expected: u32,
        /// Edge length of the submitted layout.
        actual: u32,
    },
    /// The layout has no entry cell.
    MissingEntry,
    /// The layout has no exit cell.
    MissingExit,
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the neighbouring cell in `direction`, or `None` when it would
    /// fall outside a `size`×`size` grid.
    #[must_use]
    pub fn step(self, direction: Direction, size: u32) -> Option<CellCoord> {
        let (row, column) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.column),
            Direction::Down => (self.row.checked_add(1)?, self.column),
            Direction::Left => (self.row, self.column.checked_sub(1)?),
            Direction::Right => (self.row, self.column.checked_add(1)?),
        };
        let next = CellCoord::new(row, column);
        next.is_within(size).then_some(next)
    }

    /// Reports whether the cell lies inside a `size`×`size` grid.
    #[must_use]
    pub const fn is_within(&self, size: u32) -> bool {
        self.row < size && self.column < size
    }

    /// Reports whether the cell sits on the outer ring of the grid.
    #[must_use]
    pub fn is_border(&self, size: u32) -> bool {
        self.is_within(size)
            && (self.row == 0
                || self.column == 0
                || self.row + 1 == size
                || self.column + 1 == size)
    }

    /// Reports whether the cell is one of the four grid corners.
    #[must_use]
    pub fn is_corner(&self, size: u32) -> bool {
        let last = size.saturating_sub(1);
        self.is_within(size)
            && (self.row == 0 || self.row == last)
            && (self.column == 0 || self.column == last)
    }

    /// Reports whether the cell lies strictly inside the border ring.
    #[must_use]
    pub fn is_interior(&self, size: u32) -> bool {
        self.is_within(size) && !self.is_border(size)
    }

    /// Heading that carries a ball from this border cell into the grid.
    ///
    /// Corner and interior cells have no unambiguous inward heading.
    #[must_use]
    pub fn inward_heading(&self, size: u32) -> Option<Direction> {
        if !self.is_border(size) || self.is_corner(size) {
            return None;
        }

        let last = size - 1;
        if self.row == 0 {
            Some(Direction::Down)
        } else if self.row == last {
            Some(Direction::Up)
        } else if self.column == 0 {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    }

    /// Row-major buffer index of the cell in a `size`×`size` grid.
    #[must_use]
    pub fn index(&self, size: u32) -> Option<usize> {
        if !self.is_within(size) {
            return None;
        }
        let row = usize::try_from(self.row).ok()?;
        let column = usize::try_from(self.column).ok()?;
        let width = usize::try_from(size).ok()?;
        Some(row * width + column)
    }

    /// Inverse of [`CellCoord::index`].
    #[must_use]
    pub fn from_index(index: usize, size: u32) -> Option<CellCoord> {
        let width = usize::try_from(size).ok().filter(|width| *width > 0)?;
        let row = u32::try_from(index / width).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let coord = CellCoord::new(row, column);
        coord.is_within(size).then_some(coord)
    }
}

/// Orthogonal headings a ball may travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every heading in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Heading pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether the heading runs along a column.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// The two headings at right angles to this one.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        if self.is_vertical() {
            [Self::Left, Self::Right]
        } else {
            [Self::Up, Self::Down]
        }
    }

    /// Dense index used by per-heading lookup tables.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// Diagonal mirror shape shared by bumpers and activated bumpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorOrientation {
    /// Mirror rising to the right, drawn `╱`.
    UpRight,
    /// Mirror falling to the right, drawn `╲`.
    DownRight,
}

impl MirrorOrientation {
    /// Every mirror orientation in a stable order.
    pub const ALL: [MirrorOrientation; 2] = [Self::UpRight, Self::DownRight];
}

/// Axis along which a tunnel may be traversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TunnelAxis {
    /// Tunnel open to the left and right.
    Horizontal,
    /// Tunnel open upward and downward.
    Vertical,
}

impl TunnelAxis {
    /// Every tunnel axis in a stable order.
    pub const ALL: [TunnelAxis; 2] = [Self::Horizontal, Self::Vertical];

    /// Reports whether a ball travelling along `heading` may pass.
    #[must_use]
    pub const fn admits(self, heading: Direction) -> bool {
        match self {
            Self::Horizontal => !heading.is_vertical(),
            Self::Vertical => heading.is_vertical(),
        }
    }
}

/// Corner a directional bumper's right angle points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Right angle in the top-right corner, drawn `◹`.
    TopRight,
    /// Right angle in the top-left corner, drawn `◸`.
    TopLeft,
    /// Right angle in the bottom-right corner, drawn `◿`.
    BottomRight,
    /// Right angle in the bottom-left corner, drawn `◺`.
    BottomLeft,
}

impl Corner {
    /// Every corner in a stable order.
    pub const ALL: [Corner; 4] = [
        Self::TopRight,
        Self::TopLeft,
        Self::BottomRight,
        Self::BottomLeft,
    ];
}

/// Identifier shared by exactly two teleporter cells.
///
/// Identifiers start at one so that zero can stand for "no teleporter" on the
/// flat integer boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairId(u32);

impl<'de> Deserialize<'de> for PairId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Self::new(value).ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Unsigned(0), &"a pair identifier of at least 1")
        })
    }
}

impl PairId {
    /// Creates a pairing identifier, rejecting zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// First identifier handed out by a fresh generation pass.
    #[must_use]
    pub const fn first() -> Self {
        Self(1)
    }

    /// Identifier allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Special objects a generated layout may place on the ball's path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Diagonal mirror that reflects the ball.
    Bumper,
    /// Passage that may only be entered along its axis.
    Tunnel,
    /// Paired portal that relocates the ball to its partner.
    Teleporter,
    /// Mirror-shaped kicker that forces a vertical heading.
    ActivatedBumper,
    /// Corner kicker that forces a fixed heading.
    DirectionalBumper,
}

impl ObjectKind {
    /// Every object kind in ordinal order.
    pub const ALL: [ObjectKind; 5] = [
        Self::Bumper,
        Self::Tunnel,
        Self::Teleporter,
        Self::ActivatedBumper,
        Self::DirectionalBumper,
    ];

    /// Cell type produced when this object is placed.
    #[must_use]
    pub const fn cell_type(self) -> CellType {
        match self {
            Self::Bumper => CellType::Bumper,
            Self::Tunnel => CellType::Tunnel,
            Self::Teleporter => CellType::Teleporter,
            Self::ActivatedBumper => CellType::ActivatedBumper,
            Self::DirectionalBumper => CellType::DirectionalBumper,
        }
    }

    /// Resolves an object kind from its cell type ordinal (`4..=8`).
    #[must_use]
    pub fn from_ordinal(value: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.cell_type().ordinal() == value)
    }
}

/// Semantic cell type with the stable ordinals of the flat boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// Cell the ball never visits.
    Empty = 0,
    /// Cell the ball starts from.
    Entry = 1,
    /// Cell the ball leaves through.
    Exit = 2,
    /// Plain cell the ball rolls across.
    InPath = 3,
    /// Diagonal mirror.
    Bumper = 4,
    /// Axis-restricted passage.
    Tunnel = 5,
    /// Paired portal.
    Teleporter = 6,
    /// Mirror-shaped kicker.
    ActivatedBumper = 7,
    /// Corner kicker.
    DirectionalBumper = 8,
}

impl CellType {
    /// Every cell type in ordinal order.
    pub const ALL: [CellType; 9] = [
        Self::Empty,
        Self::Entry,
        Self::Exit,
        Self::InPath,
        Self::Bumper,
        Self::Tunnel,
        Self::Teleporter,
        Self::ActivatedBumper,
        Self::DirectionalBumper,
    ];

    /// Stable integer ordinal.
    #[must_use]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// Resolves a cell type from its ordinal.
    #[must_use]
    pub fn from_ordinal(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.ordinal() == value)
    }
}

/// Flattened orientation with the stable ordinals of the flat boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Mirror falling to the right.
    DownRight = 0,
    /// Mirror rising to the right.
    UpRight = 1,
    /// Vertical tunnel.
    Vertical = 2,
    /// Horizontal tunnel.
    Horizontal = 3,
    /// Directional bumper pointing into the top-right corner.
    TopRight = 4,
    /// Directional bumper pointing into the top-left corner.
    TopLeft = 5,
    /// Directional bumper pointing into the bottom-right corner.
    BottomRight = 6,
    /// Directional bumper pointing into the bottom-left corner.
    BottomLeft = 7,
    /// Sentinel for cells without an orientation.
    None = 8,
}

impl Orientation {
    /// Stable integer ordinal.
    #[must_use]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }
}

impl From<MirrorOrientation> for Orientation {
    fn from(value: MirrorOrientation) -> Self {
        match value {
            MirrorOrientation::UpRight => Self::UpRight,
            MirrorOrientation::DownRight => Self::DownRight,
        }
    }
}

impl From<TunnelAxis> for Orientation {
    fn from(value: TunnelAxis) -> Self {
        match value {
            TunnelAxis::Horizontal => Self::Horizontal,
            TunnelAxis::Vertical => Self::Vertical,
        }
    }
}

impl From<Corner> for Orientation {
    fn from(value: Corner) -> Self {
        match value {
            Corner::TopRight => Self::TopRight,
            Corner::TopLeft => Self::TopLeft,
            Corner::BottomRight => Self::BottomRight,
            Corner::BottomLeft => Self::BottomLeft,
        }
    }
}

/// Content of a single grid cell, carrying its orientation or pairing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Cell the ball never visits.
    #[default]
    Empty,
    /// Cell the ball starts from.
    Entry,
    /// Cell the ball leaves through.
    Exit,
    /// Plain cell the ball rolls across.
    InPath,
    /// Diagonal mirror.
    Bumper(MirrorOrientation),
    /// Axis-restricted passage.
    Tunnel(TunnelAxis),
    /// Portal linked to the other cell sharing its identifier.
    Teleporter(PairId),
    /// Mirror-shaped kicker.
    ActivatedBumper(MirrorOrientation),
    /// Corner kicker.
    DirectionalBumper(Corner),
}

impl Cell {
    /// Semantic type of the cell.
    #[must_use]
    pub const fn cell_type(&self) -> CellType {
        match self {
            Self::Empty => CellType::Empty,
            Self::Entry => CellType::Entry,
            Self::Exit => CellType::Exit,
            Self::InPath => CellType::InPath,
            Self::Bumper(_) => CellType::Bumper,
            Self::Tunnel(_) => CellType::Tunnel,
            Self::Teleporter(_) => CellType::Teleporter,
            Self::ActivatedBumper(_) => CellType::ActivatedBumper,
            Self::DirectionalBumper(_) => CellType::DirectionalBumper,
        }
    }

    /// Flattened orientation, [`Orientation::None`] for unoriented cells.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        match *self {
            Self::Bumper(mirror) | Self::ActivatedBumper(mirror) => mirror.into(),
            Self::Tunnel(axis) => axis.into(),
            Self::DirectionalBumper(corner) => corner.into(),
            Self::Empty | Self::Entry | Self::Exit | Self::InPath | Self::Teleporter(_) => {
                Orientation::None
            }
        }
    }

    /// Pairing identifier of a teleporter cell.
    #[must_use]
    pub const fn pair(&self) -> Option<PairId> {
        match self {
            Self::Teleporter(pair) => Some(*pair),
            _ => None,
        }
    }

    /// Object kind occupying the cell, if any.
    #[must_use]
    pub const fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            Self::Bumper(_) => Some(ObjectKind::Bumper),
            Self::Tunnel(_) => Some(ObjectKind::Tunnel),
            Self::Teleporter(_) => Some(ObjectKind::Teleporter),
            Self::ActivatedBumper(_) => Some(ObjectKind::ActivatedBumper),
            Self::DirectionalBumper(_) => Some(ObjectKind::DirectionalBumper),
            Self::Empty | Self::Entry | Self::Exit | Self::InPath => None,
        }
    }

    /// Reports whether the cell holds a special object.
    #[must_use]
    pub const fn is_object(&self) -> bool {
        self.object_kind().is_some()
    }
}

/// Reasons a grid configuration is rejected at construction.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConfigurationError {
    /// The grid leaves no interior cell to turn in.
    #[error("invalid configuration: grid size {size} is below the minimum of {minimum}")]
    GridTooSmall {
        /// Requested edge length.
        size: u32,
        /// Smallest accepted edge length.
        minimum: u32,
    },
    /// The lower object bound exceeds the upper one.
    #[error("invalid configuration: minimum objects {min} exceeds maximum objects {max}")]
    ObjectBoundsInverted {
        /// Requested lower bound.
        min: u32,
        /// Requested upper bound.
        max: u32,
    },
    /// The grid cannot hold the requested objects next to entry and exit.
    #[error("invalid configuration: {max} objects exceed the grid capacity of {capacity}")]
    TooManyObjects {
        /// Requested upper bound.
        max: u32,
        /// Cells left once entry and exit are placed.
        capacity: u32,
    },
    /// No object kind was allowed.
    #[error("invalid configuration: at least one object type must be allowed")]
    NoObjectTypes,
}

/// Caller-supplied parameters fixed for the lifetime of a grid engine.
///
/// Deserialised values pass through [`GridConfiguration::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridConfiguration {
    size: u32,
    min_objects: u32,
    max_objects: u32,
    allowed: Vec<ObjectKind>,
}

impl<'de> Deserialize<'de> for GridConfiguration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fields {
            size: u32,
            min_objects: u32,
            max_objects: u32,
            allowed: Vec<ObjectKind>,
        }

        let fields = Fields::deserialize(deserializer)?;
        Self::new(
            fields.size,
            fields.min_objects,
            fields.max_objects,
            fields.allowed,
        )
        .map_err(de::Error::custom)
    }
}

impl GridConfiguration {
    /// Validates and captures a grid configuration.
    ///
    /// Duplicate object kinds are collapsed and the allowed set is kept in
    /// ordinal order so that equal configurations compare equal.
    pub fn new(
        size: u32,
        min_objects: u32,
        max_objects: u32,
        allowed: impl IntoIterator<Item = ObjectKind>,
    ) -> Result<Self, ConfigurationError> {
        if size < MIN_GRID_SIZE {
            return Err(ConfigurationError::GridTooSmall {
                size,
                minimum: MIN_GRID_SIZE,
            });
        }

        if min_objects > max_objects {
            return Err(ConfigurationError::ObjectBoundsInverted {
                min: min_objects,
                max: max_objects,
            });
        }

        let capacity = size.saturating_mul(size).saturating_sub(2);
        if max_objects > capacity {
            return Err(ConfigurationError::TooManyObjects {
                max: max_objects,
                capacity,
            });
        }

        let mut allowed: Vec<ObjectKind> = allowed.into_iter().collect();
        allowed.sort_unstable();
        allowed.dedup();
        if allowed.is_empty() {
            return Err(ConfigurationError::NoObjectTypes);
        }

        Ok(Self {
            size,
            min_objects,
            max_objects,
            allowed,
        })
    }

    /// Edge length of the square grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Inclusive lower bound on placed object cells.
    #[must_use]
    pub const fn min_objects(&self) -> u32 {
        self.min_objects
    }

    /// Inclusive upper bound on placed object cells.
    #[must_use]
    pub const fn max_objects(&self) -> u32 {
        self.max_objects
    }

    /// Object kinds a layout may use, in ordinal order.
    #[must_use]
    pub fn allowed(&self) -> &[ObjectKind] {
        &self.allowed
    }

    /// Reports whether `kind` may be placed.
    #[must_use]
    pub fn allows(&self, kind: ObjectKind) -> bool {
        self.allowed.contains(&kind)
    }
}
