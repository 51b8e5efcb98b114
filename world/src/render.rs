//! Plain-text rendering of boards for terminals and logs.

use pinball_panic_core::{Cell, Corner, GridView, MirrorOrientation, TunnelAxis};

use crate::{query, Board};

/// Glyph drawn for solution path cells when the path is revealed.
pub const PATH_SYMBOL: char = '·';

/// Glyph drawn for a single cell. Path cells look empty.
#[must_use]
pub fn symbol(cell: Cell) -> char {
    match cell {
        Cell::Empty | Cell::InPath => '.',
        Cell::Entry => 'E',
        Cell::Exit => 'X',
        Cell::Bumper(MirrorOrientation::UpRight) => '╱',
        Cell::Bumper(MirrorOrientation::DownRight) => '╲',
        Cell::Tunnel(TunnelAxis::Horizontal) => '=',
        Cell::Tunnel(TunnelAxis::Vertical) => '‖',
        Cell::Teleporter(_) => '*',
        Cell::ActivatedBumper(MirrorOrientation::UpRight) => '⧄',
        Cell::ActivatedBumper(MirrorOrientation::DownRight) => '⧅',
        Cell::DirectionalBumper(Corner::TopRight) => '◹',
        Cell::DirectionalBumper(Corner::TopLeft) => '◸',
        Cell::DirectionalBumper(Corner::BottomRight) => '◿',
        Cell::DirectionalBumper(Corner::BottomLeft) => '◺',
    }
}

/// Renders any grid view, one line per row with cells separated by spaces.
#[must_use]
pub fn view_to_ascii(view: GridView<'_>) -> String {
    render(view, false)
}

/// Renders the board's current cells.
#[must_use]
pub fn to_ascii(board: &Board) -> String {
    view_to_ascii(query::grid_view(board))
}

/// Renders the board with the solution path drawn in.
#[must_use]
pub fn to_ascii_with_path(board: &Board) -> String {
    render(query::grid_view(board), true)
}

fn render(view: GridView<'_>, show_path: bool) -> String {
    let size = usize::try_from(view.size()).unwrap_or(0);
    let mut out = String::with_capacity(size * (size * 2 + 1));
    for (coord, cell) in view.iter() {
        out.push(match cell {
            Cell::InPath if show_path => PATH_SYMBOL,
            _ => symbol(cell),
        });
        if coord.column() + 1 == view.size() {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{symbol, to_ascii, to_ascii_with_path, view_to_ascii};
    use crate::{apply, Board};
    use pinball_panic_core::{Cell, CellCoord, Command, Layout, PairId, TunnelAxis};

    #[test]
    fn empty_board_renders_dots() {
        let board = Board::new(3);
        assert_eq!(to_ascii(&board), ". . .\n. . .\n. . .\n");
    }

    #[test]
    fn objects_render_with_their_glyphs() {
        let mut layout = Layout::new(3);
        let _ = layout.set(CellCoord::new(0, 1), Cell::Entry);
        let _ = layout.set(CellCoord::new(1, 1), Cell::Tunnel(TunnelAxis::Vertical));
        let _ = layout.set(CellCoord::new(2, 1), Cell::Exit);

        assert_eq!(view_to_ascii(layout.view()), ". E .\n. ‖ .\n. X .\n");
    }

    #[test]
    fn teleporters_share_a_glyph() {
        let first = PairId::first();
        assert_eq!(symbol(Cell::Teleporter(first)), symbol(Cell::Teleporter(first.next())));
    }

    #[test]
    fn path_cells_stay_hidden_unless_requested() {
        let mut layout = Layout::new(3);
        let _ = layout.set(CellCoord::new(1, 0), Cell::Entry);
        let _ = layout.set(CellCoord::new(1, 1), Cell::InPath);
        let _ = layout.set(CellCoord::new(1, 2), Cell::Exit);
        let mut board = Board::new(3);
        let mut events = Vec::new();
        apply(&mut board, Command::CommitLayout { layout }, &mut events);

        assert_eq!(symbol(Cell::InPath), symbol(Cell::Empty));
        assert_eq!(to_ascii(&board), ". . .\nE . X\n. . .\n");
        assert_eq!(to_ascii_with_path(&board), ". . .\nE · X\n. . .\n");
    }
}
