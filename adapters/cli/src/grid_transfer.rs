use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use pinball_panic_core::{Cell, Layout};
use pinball_panic_world::{query, Board};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "grid";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded grid payload.
pub(crate) const TRANSFER_HEADER: &str = "grid:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Every cell of a square grid, ready to travel as a single line of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GridSnapshot {
    /// Edge length of the grid.
    pub(crate) size: u32,
    /// Row-major cell contents.
    pub(crate) cells: Vec<Cell>,
}

impl GridSnapshot {
    /// Captures the current contents of a board.
    #[must_use]
    pub(crate) fn capture(board: &Board) -> Self {
        Self {
            size: query::size(board),
            cells: query::grid_view(board).iter().map(|(_, cell)| cell).collect(),
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, GridTransferError> {
        let payload = SerializablePayload {
            cells: self.cells.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(GridTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{TRANSFER_HEADER}:{0}x{0}:{encoded}", self.size))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, GridTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GridTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(GridTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(GridTransferError::MissingVersion)?;
        let dimensions = parts.next().ok_or(GridTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(GridTransferError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(GridTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(GridTransferError::UnsupportedVersion(version.to_owned()));
        }

        let size = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(GridTransferError::InvalidEncoding)?;
        let decoded: SerializablePayload =
            serde_json::from_slice(&bytes).map_err(GridTransferError::InvalidPayload)?;

        let expected = usize::try_from(size)
            .ok()
            .and_then(|width| width.checked_mul(width))
            .unwrap_or(usize::MAX);
        if decoded.cells.len() != expected {
            return Err(GridTransferError::CellCountMismatch {
                expected,
                actual: decoded.cells.len(),
            });
        }

        Ok(Self {
            size,
            cells: decoded.cells,
        })
    }

    /// Converts the snapshot into a layout the board can commit.
    pub(crate) fn into_layout(self) -> Result<Layout, GridTransferError> {
        let actual = self.cells.len();
        let size = self.size;
        Layout::from_cells(size, self.cells).ok_or(GridTransferError::CellCountMismatch {
            expected: usize::try_from(size.saturating_mul(size)).unwrap_or(usize::MAX),
            actual,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SerializablePayload {
    cells: Vec<Cell>,
}

/// Errors that can occur while encoding or decoding grid transfer strings.
#[derive(Debug, Error)]
pub(crate) enum GridTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("grid string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded grid.
    #[error("grid string is missing the prefix")]
    MissingPrefix,
    /// The encoded grid did not contain a version segment.
    #[error("grid string is missing the version")]
    MissingVersion,
    /// The encoded grid did not include its dimensions.
    #[error("grid string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded grid did not include the payload segment.
    #[error("grid string is missing the payload")]
    MissingPayload,
    /// The encoded grid used an unexpected prefix segment.
    #[error("grid prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded grid used an unsupported version identifier.
    #[error("grid version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed or were not square.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode grid payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be (de)serialised.
    #[error("could not parse grid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The payload holds a different number of cells than the dimensions imply.
    #[error("grid payload holds {actual} cells, expected {expected}")]
    CellCountMismatch {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells found in the payload.
        actual: usize,
    },
}

fn parse_dimensions(dimensions: &str) -> Result<u32, GridTransferError> {
    let invalid = || GridTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || columns != rows {
        return Err(invalid());
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinball_panic_core::{CellCoord, Command, MirrorOrientation, PairId, TunnelAxis};
    use pinball_panic_world::apply;

    fn populated_board() -> Board {
        let mut layout = Layout::new(5);
        let cells = [
            (CellCoord::new(0, 2), Cell::Entry),
            (CellCoord::new(2, 2), Cell::Bumper(MirrorOrientation::DownRight)),
            (CellCoord::new(2, 3), Cell::Tunnel(TunnelAxis::Horizontal)),
            (CellCoord::new(1, 1), Cell::Teleporter(PairId::first())),
            (CellCoord::new(2, 4), Cell::Exit),
        ];
        for (coord, cell) in cells {
            let _ = layout.set(coord, cell);
        }
        let mut board = Board::new(5);
        let mut events = Vec::new();
        apply(&mut board, Command::CommitLayout { layout }, &mut events);
        board
    }

    #[test]
    fn round_trip_empty_grid() {
        let snapshot = GridSnapshot::capture(&Board::new(4));
        let encoded = snapshot.encode().expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:4x4:")));

        let decoded = GridSnapshot::decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn round_trip_populated_grid() {
        let snapshot = GridSnapshot::capture(&populated_board());
        let encoded = snapshot.encode().expect("snapshot encodes");
        let decoded = GridSnapshot::decode(&format!("  {encoded}\n")).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);

        let layout = decoded.into_layout().expect("layout rebuilds");
        assert_eq!(
            layout.cell(CellCoord::new(1, 1)),
            Some(Cell::Teleporter(PairId::first()))
        );
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(
            GridSnapshot::decode("   "),
            Err(GridTransferError::EmptyPayload)
        ));
        assert!(matches!(
            GridSnapshot::decode("board:v1:4x4:AAAA"),
            Err(GridTransferError::InvalidPrefix(prefix)) if prefix == "board"
        ));
        assert!(matches!(
            GridSnapshot::decode("grid:v2:4x4:AAAA"),
            Err(GridTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            GridSnapshot::decode("grid:v1:4x5:AAAA"),
            Err(GridTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            GridSnapshot::decode("grid:v1:4x4"),
            Err(GridTransferError::MissingPayload)
        ));
        assert!(matches!(
            GridSnapshot::decode("grid:v1:4x4:***"),
            Err(GridTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn mismatched_cell_counts_are_rejected() {
        let snapshot = GridSnapshot::capture(&Board::new(3));
        let encoded = snapshot.encode().expect("snapshot encodes");
        let resized = encoded.replacen(":3x3:", ":4x4:", 1);
        assert!(matches!(
            GridSnapshot::decode(&resized),
            Err(GridTransferError::CellCountMismatch {
                expected: 16,
                actual: 9
            })
        ));
    }

    fn encoded_with_centre(centre: &str) -> String {
        let mut cells = vec!["\"Empty\""; 9];
        cells[4] = centre;
        let json = format!("{{\"cells\":[{}]}}", cells.join(","));
        format!("{TRANSFER_HEADER}:3x3:{}", STANDARD_NO_PAD.encode(json))
    }

    #[test]
    fn zero_teleporter_index_is_rejected() {
        assert!(matches!(
            GridSnapshot::decode(&encoded_with_centre("{\"Teleporter\":0}")),
            Err(GridTransferError::InvalidPayload(_))
        ));

        let decoded = GridSnapshot::decode(&encoded_with_centre("{\"Teleporter\":1}"))
            .expect("snapshot decodes");
        assert_eq!(decoded.cells[4], Cell::Teleporter(PairId::first()));
    }
}
