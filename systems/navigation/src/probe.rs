//! Passability probes for single-cell and wide footprints.

use burrow_core::{Footprint, Heading, Position, Surroundings, Tile};

/// Cells a 3×3 agent newly covers when stepping in each compass heading,
/// relative to its centre. Rows follow [`Heading::COMPASS`]; diagonal rows
/// hold the L-shaped corner triple.
const FRONTAL_PROBES: [[(i32, i32); 3]; 8] = [
    [(-1, -2), (0, -2), (1, -2)],
    [(1, -2), (2, -2), (2, -1)],
    [(2, -1), (2, 0), (2, 1)],
    [(2, 1), (2, 2), (1, 2)],
    [(1, 2), (0, 2), (-1, 2)],
    [(-1, 2), (-2, 2), (-2, 1)],
    [(-2, 1), (-2, 0), (-2, -1)],
    [(-2, -1), (-2, -2), (-1, -2)],
];

/// What lies one step away in a heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The step can be taken now.
    Clear,
    /// Removable terrain the agent is allowed to clear before stepping.
    Diggable(Position),
    /// Terrain is passable but another agent stands in the way.
    Crowded,
    /// Terrain blocks the step.
    Blocked {
        /// The step would leave the grid.
        off_grid: bool,
    },
}

impl Probe {
    pub(crate) const fn is_enterable(self) -> bool {
        matches!(self, Self::Clear | Self::Diggable(_))
    }
}

/// Classifies the step from `origin` in `heading` for the host's footprint.
pub(crate) fn probe<S>(host: &S, origin: Position, heading: Heading, dig_allowed: bool) -> Probe
where
    S: Surroundings + ?Sized,
{
    let Some(index) = heading.index() else {
        return Probe::Blocked { off_grid: false };
    };
    match host.footprint() {
        Footprint::Single => probe_cell(host, origin.offset(heading), dig_allowed),
        Footprint::Wide => probe_front(host, origin, FRONTAL_PROBES[index]),
    }
}

fn probe_cell<S>(host: &S, cell: Position, dig_allowed: bool) -> Probe
where
    S: Surroundings + ?Sized,
{
    if !host.grid_size().contains(cell) {
        return Probe::Blocked { off_grid: true };
    }
    match host.tile(cell) {
        None | Some(Tile::Wall) => Probe::Blocked { off_grid: false },
        Some(Tile::RemovableObstacle) if dig_allowed => Probe::Diggable(cell),
        Some(Tile::RemovableObstacle) => Probe::Blocked { off_grid: false },
        Some(Tile::Open | Tile::ResourceNode) if host.is_occupied(cell) => Probe::Crowded,
        Some(Tile::Open | Tile::ResourceNode) => Probe::Clear,
    }
}

fn probe_front<S>(host: &S, origin: Position, offsets: [(i32, i32); 3]) -> Probe
where
    S: Surroundings + ?Sized,
{
    let size = host.grid_size();
    let cells = offsets.map(|(dx, dy)| origin.translate(dx, dy));

    if cells.iter().any(|cell| !size.contains(*cell)) {
        return Probe::Blocked { off_grid: true };
    }
    let terrain_clear = cells
        .iter()
        .all(|cell| host.tile(*cell).map_or(false, Tile::is_traversable));
    if !terrain_clear {
        return Probe::Blocked { off_grid: false };
    }
    if cells.iter().any(|cell| host.is_occupied(*cell)) {
        Probe::Crowded
    } else {
        Probe::Clear
    }
}


#[cfg(test)]
mod tests {
    use super::fixture::Grid;
    use super::*;

    #[test]
    fn frontal_probes_are_new_cells_only() {
        let origin = Position::new(0, 0);
        for heading in Heading::COMPASS {
            let index = heading.index().expect("compass heading");
            let next = origin.offset(heading);
            for (dx, dy) in FRONTAL_PROBES[index] {
                let cell = origin.translate(dx, dy);
                assert!(
                    !Footprint::Wide.cells(origin).any(|covered| covered == cell),
                    "{heading:?} probes an already covered cell"
                );
                assert!(
                    Footprint::Wide.cells(next).any(|covered| covered == cell),
                    "{heading:?} probes a cell outside the next footprint"
                );
            }
        }
    }

    #[test]
    fn single_cell_probe_classification() {
        let grid = Grid::parse(&["#A%", ".p."], Footprint::Single);
        let origin = grid.position;

        assert_eq!(
            probe(&grid, origin, Heading::West, false),
            Probe::Blocked { off_grid: false }
        );
        assert_eq!(
            probe(&grid, origin, Heading::North, false),
            Probe::Blocked { off_grid: true }
        );
        assert_eq!(
            probe(&grid, origin, Heading::East, false),
            Probe::Blocked { off_grid: false }
        );
        assert_eq!(
            probe(&grid, origin, Heading::East, true),
            Probe::Diggable(Position::new(2, 0))
        );
        assert_eq!(probe(&grid, origin, Heading::South, false), Probe::Crowded);
        assert_eq!(probe(&grid, origin, Heading::SouthEast, false), Probe::Clear);
        assert_eq!(
            probe(&grid, origin, Heading::Center, false),
            Probe::Blocked { off_grid: false }
        );
    }

    #[test]
    fn wide_probe_separates_terrain_from_crowding() {
        let grid = Grid::parse(
            &[
                ".......", //
                ".......", //
                "...A...", //
                ".......", //
                "..p..%.", //
            ],
            Footprint::Wide,
        );
        let origin = grid.position;

        assert_eq!(probe(&grid, origin, Heading::North, true), Probe::Clear);
        assert_eq!(probe(&grid, origin, Heading::South, true), Probe::Crowded);
        assert_eq!(
            probe(&grid, origin, Heading::SouthEast, true),
            Probe::Blocked { off_grid: false }
        );
        assert_eq!(
            probe(&grid, Position::new(1, 2), Heading::West, true),
            Probe::Blocked { off_grid: true }
        );
    }
}
