//! Direct movement toward the target.

use burrow_core::{Footprint, Heading, Position, Surroundings};

use crate::probe::{probe, Probe};

/// Decision of the greedy planner for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GreedyPlan {
    /// Take the step described by the probe.
    Step { heading: Heading, probe: Probe },
    /// A wide agent is held up by peers only.
    Crowded(Heading),
    /// Neither the direct heading nor its neighbours make progress.
    Stalled,
}

/// Tries the direct heading, then the two headings 45° to either side.
///
/// A side heading is taken only when it is enterable and strictly closer to
/// the target than both the current cell and the other side.
pub(crate) fn plan<S>(host: &S, target: Position, dig_allowed: bool) -> GreedyPlan
where
    S: Surroundings + ?Sized,
{
    let position = host.position();
    let direct = position.heading_to(target);
    if direct == Heading::Center {
        return GreedyPlan::Stalled;
    }

    let ahead = probe(host, position, direct, dig_allowed);
    if ahead.is_enterable() {
        return GreedyPlan::Step {
            heading: direct,
            probe: ahead,
        };
    }
    if ahead == Probe::Crowded && host.footprint() == Footprint::Wide {
        return GreedyPlan::Crowded(direct);
    }

    let current = position.distance_squared(target);
    let candidate = |heading: Heading| {
        let found = probe(host, position, heading, dig_allowed);
        found.is_enterable().then(|| {
            let distance = position.offset(heading).distance_squared(target);
            (heading, found, distance)
        })
    };

    match (candidate(direct.rotate_left()), candidate(direct.rotate_right())) {
        (Some(left), Some(right)) if left.2 < right.2 && left.2 < current => step(left),
        (Some(left), Some(right)) if right.2 < left.2 && right.2 < current => step(right),
        (Some(only), None) | (None, Some(only)) if only.2 < current => step(only),
        _ => GreedyPlan::Stalled,
    }
}

fn step((heading, probe, _): (Heading, Probe, u32)) -> GreedyPlan {
    GreedyPlan::Step { heading, probe }
}
