//! Randomised depth-first construction of a single candidate layout.
//!
//! The search grows the ball's path from the entry as straight runs through
//! free interior cells. Every run ends on an object that sends the ball onward,
//! and the final run must land exactly on the exit. Cells claimed by a branch
//! are recorded on the path so a failed branch can hand them back.

use pinball_panic_core::{
    Cell, CellCoord, Direction, GridConfiguration, Layout, ObjectKind, PairId,
};
use pinball_panic_system_trajectory::placement;
use rand::{seq::SliceRandom, Rng};

/// Partner cells sampled for each teleporter position.
const PARTNER_SAMPLES: usize = 2;

#[derive(Clone, Copy, Debug)]
enum Move {
    Place {
        offset: usize,
        cell: Cell,
        outgoing: Direction,
    },
    Teleport {
        offset: usize,
        partner: CellCoord,
    },
}

/// Single search attempt over a fixed entry and exit.
pub(crate) struct Search<'a, R: ?Sized> {
    rng: &'a mut R,
    layout: Layout,
    path: Vec<CellCoord>,
    entry: CellCoord,
    exit: CellCoord,
    kinds: Vec<ObjectKind>,
    teleports: bool,
    budget: u32,
    next_pair: PairId,
}

impl<'a, R: Rng + ?Sized> Search<'a, R> {
    /// Prepares an empty layout holding only the entry and the exit.
    pub(crate) fn new(
        config: &GridConfiguration,
        rng: &'a mut R,
        entry: CellCoord,
        exit: CellCoord,
        budget: u32,
    ) -> Self {
        let mut layout = Layout::new(config.size());
        let _ = layout.set(entry, Cell::Entry);
        let _ = layout.set(exit, Cell::Exit);
        let kinds = config
            .allowed()
            .iter()
            .copied()
            .filter(|kind| *kind != ObjectKind::Teleporter)
            .collect();

        Self {
            rng,
            layout,
            path: vec![entry],
            entry,
            exit,
            kinds,
            teleports: config.allows(ObjectKind::Teleporter),
            budget,
            next_pair: PairId::first(),
        }
    }

    /// Searches for a path that places exactly `objects` object cells.
    pub(crate) fn run(mut self, heading: Direction, objects: u32) -> Option<Layout> {
        if !self.extend(self.entry, heading, objects) {
            return None;
        }
        let Self {
            mut layout, path, ..
        } = self;
        layout.set_path(path);
        Some(layout)
    }

    fn extend(&mut self, from: CellCoord, heading: Direction, remaining: u32) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;

        let (ray, reaches_exit) = self.ray(from, heading);
        if remaining == 0 {
            if !reaches_exit {
                return false;
            }
            self.occupy_run(&ray);
            self.path.push(self.exit);
            return true;
        }

        let mut moves = self.candidate_moves(&ray, heading, remaining);
        moves.shuffle(&mut *self.rng);
        let mut ranked = Vec::with_capacity(moves.len());
        for candidate in moves {
            let priority = self.priority(&ray, heading, candidate);
            ranked.push((priority, candidate));
        }
        ranked.sort_by_key(|(priority, _)| *priority);

        for (_, candidate) in ranked {
            if self.budget == 0 {
                break;
            }
            let mark = self.path.len();
            let pair = self.next_pair;
            let (resume, outgoing, cost) = self.apply(&ray, heading, candidate);
            if self.extend(resume, outgoing, remaining - cost) {
                return true;
            }
            self.rewind(mark, pair);
        }
        false
    }

    /// Free interior cells ahead of `from`, and whether the run stops on the exit.
    fn ray(&self, from: CellCoord, heading: Direction) -> (Vec<CellCoord>, bool) {
        let size = self.layout.size();
        let mut ray = Vec::new();
        let mut cursor = from;
        loop {
            match cursor.step(heading, size) {
                Some(next)
                    if next.is_interior(size) && self.layout.cell(next) == Some(Cell::Empty) =>
                {
                    ray.push(next);
                    cursor = next;
                }
                Some(next) => return (ray, next == self.exit),
                None => return (ray, false),
            }
        }
    }

    fn candidate_moves(
        &mut self,
        ray: &[CellCoord],
        heading: Direction,
        remaining: u32,
    ) -> Vec<Move> {
        let [left, right] = heading.perpendicular();
        let partners = if self.teleports && remaining >= 2 {
            self.partner_cells(ray, heading)
        } else {
            Vec::new()
        };

        let mut moves = Vec::new();
        for offset in 0..ray.len() {
            for outgoing in [left, right, heading] {
                let options: Vec<Cell> = self
                    .kinds
                    .iter()
                    .filter_map(|kind| placement(*kind, heading, outgoing))
                    .collect();
                if let Some(cell) = options.choose(&mut *self.rng) {
                    moves.push(Move::Place {
                        offset,
                        cell: *cell,
                        outgoing,
                    });
                }
            }

            for partner in partners.choose_multiple(&mut *self.rng, PARTNER_SAMPLES) {
                moves.push(Move::Teleport {
                    offset,
                    partner: *partner,
                });
            }
        }
        moves
    }

    /// Free interior cells off the current run that the ball can leave with `heading`.
    fn partner_cells(&self, ray: &[CellCoord], heading: Direction) -> Vec<CellCoord> {
        let size = self.layout.size();
        let free = |coord: CellCoord| {
            coord.is_interior(size)
                && self.layout.cell(coord) == Some(Cell::Empty)
                && !ray.contains(&coord)
        };

        self.layout
            .view()
            .iter()
            .map(|(coord, _)| coord)
            .filter(|coord| free(*coord))
            .filter(|coord| {
                coord
                    .step(heading, size)
                    .is_some_and(|next| next == self.exit || free(next))
            })
            .collect()
    }

    /// Lower values are tried first: closeness to the exit plus jitter.
    fn priority(&mut self, ray: &[CellCoord], heading: Direction, candidate: Move) -> u32 {
        let size = self.layout.size();
        let lead = match candidate {
            Move::Place {
                offset, outgoing, ..
            } => ray[offset].step(outgoing, size),
            Move::Teleport { partner, .. } => partner.step(heading, size),
        };
        let distance = lead.map_or(size.saturating_mul(2), |cell| {
            cell.manhattan_distance(self.exit)
        });
        distance + self.rng.gen_range(0..=size)
    }

    fn apply(
        &mut self,
        ray: &[CellCoord],
        heading: Direction,
        candidate: Move,
    ) -> (CellCoord, Direction, u32) {
        match candidate {
            Move::Place {
                offset,
                cell,
                outgoing,
            } => {
                self.occupy_run(&ray[..offset]);
                let at = ray[offset];
                self.claim(at, cell);
                (at, outgoing, 1)
            }
            Move::Teleport { offset, partner } => {
                self.occupy_run(&ray[..offset]);
                let pair = self.next_pair;
                self.next_pair = pair.next();
                self.claim(ray[offset], Cell::Teleporter(pair));
                self.claim(partner, Cell::Teleporter(pair));
                (partner, heading, 2)
            }
        }
    }

    fn occupy_run(&mut self, run: &[CellCoord]) {
        for coord in run {
            self.claim(*coord, Cell::InPath);
        }
    }

    fn claim(&mut self, coord: CellCoord, cell: Cell) {
        let _ = self.layout.set(coord, cell);
        self.path.push(coord);
    }

    /// Hands back every cell claimed after `mark`.
    fn rewind(&mut self, mark: usize, pair: PairId) {
        for coord in self.path.drain(mark..) {
            let _ = self.layout.set(coord, Cell::Empty);
        }
        self.next_pair = pair;
    }
}
