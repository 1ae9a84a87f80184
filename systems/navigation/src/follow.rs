//! Obstacle boundary tracing.

use burrow_core::{Footprint, Heading, Position, RotationSense, Surroundings};

use crate::probe::{probe, Probe};

/// Result of one bounded trace around the remembered obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Trace {
    /// Found an enterable heading.
    Step {
        heading: Heading,
        probe: Probe,
        obstacle: Position,
        sense: RotationSense,
    },
    /// A wide agent met peers before any terrain opening.
    Yield(Heading),
    /// No heading opened up within the probe limit.
    Stuck,
}

/// Picks the sense whose first opening lies closer to the target.
///
/// Each sense rotates away from `blocked` for at most `limit` headings. Equal
/// distances resolve to [`RotationSense::Left`].
pub(crate) fn choose_sense<S>(
    host: &S,
    blocked: Heading,
    target: Position,
    limit: u32,
    dig_allowed: bool,
) -> Option<RotationSense>
where
    S: Surroundings + ?Sized,
{
    let position = host.position();
    let opening = |sense: RotationSense| {
        let mut heading = blocked;
        for _ in 0..limit {
            heading = sense.rotate(heading);
            if probe(host, position, heading, dig_allowed).is_enterable() {
                return Some(position.offset(heading).distance_squared(target));
            }
        }
        None
    };

    match (opening(RotationSense::Left), opening(RotationSense::Right)) {
        (Some(left), Some(right)) if right < left => Some(RotationSense::Right),
        (Some(_), _) => Some(RotationSense::Left),
        (None, Some(_)) => Some(RotationSense::Right),
        (None, None) => None,
    }
}

/// Direct heading, when it is open and beats the best distance so far.
pub(crate) fn leave_heading<S>(
    host: &S,
    target: Position,
    best_distance: Option<u32>,
    dig_allowed: bool,
) -> Option<(Heading, Probe)>
where
    S: Surroundings + ?Sized,
{
    let position = host.position();
    let direct = position.heading_to(target);
    if direct == Heading::Center {
        return None;
    }
    let ahead = probe(host, position, direct, dig_allowed);
    let closer = best_distance
        .map_or(true, |best| position.offset(direct).distance_squared(target) < best);
    (ahead.is_enterable() && closer).then_some((direct, ahead))
}

/// Rotates from the heading toward `obstacle` until a heading opens up.
///
/// Every blocked cell passed on the way becomes the new obstacle, so the
/// next trace starts against the boundary it just hugged. Leaving the grid
/// flips the sense and continues the sweep from the same heading.
pub(crate) fn trace<S>(
    host: &S,
    obstacle: Position,
    sense: RotationSense,
    target: Position,
    limit: u32,
    dig_allowed: bool,
) -> Trace
where
    S: Surroundings + ?Sized,
{
    let position = host.position();
    let mut heading = match position.heading_to(obstacle) {
        Heading::Center => position.heading_to(target),
        heading => heading,
    };
    if heading == Heading::Center {
        return Trace::Stuck;
    }

    let mut obstacle = obstacle;
    let mut sense = sense;
    for _ in 0..limit {
        match probe(host, position, heading, dig_allowed) {
            found if found.is_enterable() => {
                return Trace::Step {
                    heading,
                    probe: found,
                    obstacle,
                    sense,
                };
            }
            Probe::Crowded if host.footprint() == Footprint::Wide => {
                return Trace::Yield(heading);
            }
            Probe::Blocked { off_grid: true } => sense = sense.flipped(),
            _ => obstacle = position.offset(heading),
        }
        heading = sense.rotate(heading);
    }
    Trace::Stuck
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::fixture::Grid;

    #[test]
    fn sense_prefers_the_opening_nearer_the_target() {
        let grid = Grid::parse(
            &[
                "...#...", //
                "...#...", //
                "..A#...", //
                "...#...", //
                "###.#..", //
            ],
            Footprint::Single,
        );
        // Clockwise opens to the south, which ends nearer than the north.
        assert_eq!(
            choose_sense(&grid, Heading::East, Position::new(6, 3), 8, false),
            Some(RotationSense::Right)
        );
    }

    #[test]
    fn symmetric_openings_choose_left() {
        let grid = Grid::parse(&["...", "A#.", "..."], Footprint::Single);
        assert_eq!(
            choose_sense(&grid, Heading::East, Position::new(2, 1), 8, false),
            Some(RotationSense::Left)
        );
    }

    #[test]
    fn boxed_in_agent_has_no_sense() {
        let grid = Grid::parse(&["###", "#A#", "###"], Footprint::Single);
        assert_eq!(
            choose_sense(&grid, Heading::East, Position::new(2, 1), 8, false),
            None
        );
        assert_eq!(
            trace(&grid, Position::new(2, 1), RotationSense::Left, Position::new(2, 1), 16, false),
            Trace::Stuck
        );
    }

    #[test]
    fn trace_hugs_the_wall_and_remembers_the_last_blocked_cell() {
        let grid = Grid::parse(&["....", ".A#.", ".##."], Footprint::Single);
        let traced = trace(
            &grid,
            Position::new(2, 1),
            RotationSense::Right,
            Position::new(3, 2),
            16,
            false,
        );
        // Clockwise from east: south-east and south are walls, south-west opens.
        assert_eq!(
            traced,
            Trace::Step {
                heading: Heading::SouthWest,
                probe: Probe::Clear,
                obstacle: Position::new(1, 2),
                sense: RotationSense::Right,
            }
        );
    }

    #[test]
    fn grid_edge_flips_the_sense() {
        let grid = Grid::parse(&["A#.", ".#.", "..."], Footprint::Single);
        let traced = trace(
            &grid,
            Position::new(1, 0),
            RotationSense::Left,
            Position::new(2, 0),
            16,
            false,
        );
        // Counter-clockwise from east reaches north-east, which is off the
        // grid, so the sweep turns clockwise and finds south.
        assert_eq!(
            traced,
            Trace::Step {
                heading: Heading::South,
                probe: Probe::Clear,
                obstacle: Position::new(1, 1),
                sense: RotationSense::Right,
            }
        );
    }

    #[test]
    fn leaving_requires_beating_the_best_distance() {
        let grid = Grid::parse(&["A...."], Footprint::Single);
        let target = Position::new(4, 0);
        assert_eq!(
            leave_heading(&grid, target, Some(16), false),
            Some((Heading::East, Probe::Clear))
        );
        assert_eq!(leave_heading(&grid, target, Some(9), false), None);
        assert_eq!(
            leave_heading(&grid, target, None, false),
            Some((Heading::East, Probe::Clear))
        );
    }

    #[test]
    fn wide_trace_yields_to_peers() {
        let grid = Grid::parse(
            &[
                "......", //
                ".A.#..", //
                "...p..", //
                "......", //
                "......", //
            ],
            Footprint::Wide,
        );
        let traced = trace(
            &grid,
            Position::new(3, 1),
            RotationSense::Right,
            Position::new(5, 1),
            16,
            false,
        );
        assert_eq!(traced, Trace::Yield(Heading::SouthEast));
    }
}
