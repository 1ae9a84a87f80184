#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Local greedy-then-wall-follow navigator.
//!
//! Each agent owns one [`Navigator`]. Every tick the strategic layer may
//! update the target, then calls [`Navigator::go_to`] with the agent's
//! [`Locomotion`] handle. The navigator walks straight toward the target
//! while it can, traces obstacle boundaries once it cannot, leaves the
//! boundary as soon as it beats its best approach, and resets itself when it
//! notices that it is orbiting. All loops are bounded by [`NavConfig`], so a
//! tick never costs more than a few dozen probes.

mod follow;
mod gate;
mod greedy;
mod probe;
mod state;

use burrow_core::{
    ConfigError, Footprint, Heading, Locomotion, MoveOutcome, NavConfig, NavEvent, NavTarget,
    Position, ResetCause, RotationSense, Surroundings, Tile,
};
use tracing::{debug, trace};

use crate::follow::Trace;
use crate::greedy::GreedyPlan;
use crate::probe::{probe, Probe};
use crate::state::ClearedCell;

pub use state::{NavigationState, Signature};

/// Per-agent navigator holding the target, tracing memory and pending events.
#[derive(Clone, Debug)]
pub struct Navigator {
    config: NavConfig,
    target: Option<NavTarget>,
    state: NavigationState,
    events: Vec<NavEvent>,
}

impl Navigator {
    /// Creates a navigator without a target.
    pub fn new(config: NavConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            target: None,
            state: NavigationState::default(),
            events: Vec::new(),
        })
    }

    /// Configuration the navigator was built with.
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Target currently pursued.
    #[must_use]
    pub fn target(&self) -> Option<NavTarget> {
        self.target
    }

    /// Read-only view of the navigation memory.
    #[must_use]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Moves every event recorded since the last drain into `out`.
    pub fn drain_events(&mut self, out: &mut Vec<NavEvent>) {
        out.append(&mut self.events);
    }

    /// Accepts a target from the strategic layer.
    ///
    /// An unchanged location keeps all memory. A shift below the reset
    /// threshold rebases the best distance onto the new location; anything
    /// larger, or a first target, discards the tracing context.
    pub fn set_target(&mut self, target: NavTarget) {
        let location = target.location;
        self.target = Some(target);

        match self.state.previous_target {
            Some(previous) if previous == location => {}
            Some(previous)
                if previous.distance_squared(location) < self.config.reset_threshold_squared =>
            {
                if let Some(best_distance) = self.state.soft_reset(location) {
                    debug!(?location, best_distance, "soft navigation reset");
                    self.events.push(NavEvent::SoftReset { best_distance });
                }
            }
            _ => self.full_reset(ResetCause::TargetChanged),
        }
        self.state.previous_target = Some(location);
    }

    /// Withdraws the target and discards all tracing memory.
    pub fn clear_target(&mut self) {
        if self.target.take().is_some() {
            self.full_reset(ResetCause::TargetCleared);
        }
        self.state.previous_target = None;
    }

    /// Reports whether the current target no longer needs movement.
    ///
    /// Exact targets are reached on the cell itself, or next to it when the
    /// cell cannot be entered. Wide agents only need the target inside their
    /// footprint. Approximate targets are reached as soon as the cell is
    /// sensed. Without a target there is nothing left to do.
    #[must_use]
    pub fn has_arrived<S>(&self, host: &S) -> bool
    where
        S: Surroundings + ?Sized,
    {
        let Some(target) = self.target else {
            return true;
        };
        let position = host.position();
        let goal = target.location;
        if position == goal {
            return true;
        }
        if !target.exact {
            return host.tile(goal).is_some();
        }
        match host.footprint() {
            Footprint::Wide => position.chebyshev_distance(goal) <= 1,
            Footprint::Single => {
                position.is_adjacent_to(goal)
                    && (host.is_occupied(goal)
                        || !host.tile(goal).map_or(false, Tile::is_traversable))
            }
        }
    }

    /// Runs one navigation tick against the agent's host.
    pub fn go_to<L>(&mut self, host: &mut L) -> MoveOutcome
    where
        L: Locomotion + ?Sized,
    {
        let Some(target) = self.target else {
            return MoveOutcome::NoAction;
        };
        if self.has_arrived(&*host) {
            return MoveOutcome::NoAction;
        }
        let goal = target.location;
        self.state.visits.prepare(host.grid_size());
        let dig_allowed = gate::dig_allowed(&self.config.dig, host);

        if let Some(outcome) = self.resume_committed(host) {
            return outcome;
        }
        if !host.can_move() {
            return self.hold_position(host, goal, dig_allowed);
        }

        let position = host.position();
        if self.state.is_following() {
            self.check_health(position);
        }
        self.state.record_progress(position, goal);

        if !self.state.is_following() {
            match greedy::plan(&*host, goal, dig_allowed) {
                GreedyPlan::Step { heading, probe } => return self.execute(host, heading, probe),
                GreedyPlan::Crowded(heading) => return self.yield_to_peers(heading),
                GreedyPlan::Stalled => {
                    if !self.begin_follow(&*host, goal, dig_allowed) {
                        return MoveOutcome::NoAction;
                    }
                }
            }
        } else if let Some((heading, probe)) =
            follow::leave_heading(&*host, goal, self.state.best_distance, dig_allowed)
        {
            debug!(?position, ?heading, "leaving obstacle boundary");
            self.state.end_follow();
            self.events.push(NavEvent::FollowEnded);
            return self.execute(host, heading, probe);
        }

        self.trace_boundary(host, goal, dig_allowed)
    }

    fn full_reset(&mut self, cause: ResetCause) {
        self.state.full_reset();
        debug!(?cause, epoch = self.state.epoch, "full navigation reset");
        self.events.push(NavEvent::FullReset { cause });
    }

    /// Resets after orbiting or pressing, remembering to trace the other way.
    fn break_loop(&mut self, cause: ResetCause) {
        let sense = self.state.sense;
        self.full_reset(cause);
        self.state.sense_hint = sense.map(RotationSense::flipped);
    }

    fn check_health(&mut self, position: Position) {
        if self.state.visit(position) {
            let signature = self.state.signature();
            debug!(?position, ?signature, "navigation cycle detected");
            self.events.push(NavEvent::CycleDetected { cell: position });
            self.break_loop(ResetCause::CycleDetected);
        } else if self.state.ticks_pressing >= self.config.max_pressing_ticks {
            debug!(
                ?position,
                ticks = self.state.ticks_pressing,
                "pressing against obstacle for too long"
            );
            self.break_loop(ResetCause::Escalated);
        }
    }

    fn begin_follow<S>(&mut self, host: &S, goal: Position, dig_allowed: bool) -> bool
    where
        S: Surroundings + ?Sized,
    {
        let position = host.position();
        let direct = position.heading_to(goal);
        let chosen = self.state.sense_hint.take().or(self.state.sense).or_else(|| {
            follow::choose_sense(
                host,
                direct,
                goal,
                self.config.sense_probe_limit,
                dig_allowed,
            )
        });
        let Some(sense) = chosen else {
            trace!(?position, "no heading to trace from");
            return false;
        };

        let obstacle = position.offset(direct);
        self.state.begin_follow(obstacle, sense);
        if self.state.visit(position) {
            debug!(?position, ?sense, "re-entered boundary under same signature");
            self.events.push(NavEvent::CycleDetected { cell: position });
            self.full_reset(ResetCause::CycleDetected);
            self.state.begin_follow(obstacle, sense.flipped());
            self.state.record_progress(position, goal);
            self.state.stamp(position);
        }

        let sense = self.state.sense.unwrap_or(sense);
        debug!(?position, ?obstacle, ?sense, "following obstacle boundary");
        self.events.push(NavEvent::FollowStarted { sense });
        true
    }

    fn trace_boundary<L>(&mut self, host: &mut L, goal: Position, dig_allowed: bool) -> MoveOutcome
    where
        L: Locomotion + ?Sized,
    {
        let (Some(obstacle), Some(sense)) = (self.state.obstacle, self.state.sense) else {
            return MoveOutcome::NoAction;
        };

        match follow::trace(
            &*host,
            obstacle,
            sense,
            goal,
            self.config.trace_probe_limit,
            dig_allowed,
        ) {
            Trace::Step {
                heading,
                probe,
                obstacle,
                sense: traced,
            } => {
                if traced != sense {
                    trace!(?traced, "grid edge flipped rotation sense");
                }
                self.state.note_obstacle(obstacle, traced);
                self.execute(host, heading, probe)
            }
            Trace::Yield(heading) => self.yield_to_peers(heading),
            Trace::Stuck => {
                self.state.ticks_pressing = self.state.ticks_pressing.saturating_add(1);
                trace!(?obstacle, "no opening around obstacle");
                MoveOutcome::NoAction
            }
        }
    }

    /// Steps into a freshly cleared cell before planning anything else.
    fn resume_committed<L>(&mut self, host: &mut L) -> Option<MoveOutcome>
    where
        L: Locomotion + ?Sized,
    {
        let mut cleared = self.state.cleared.take()?;
        let position = host.position();
        if cleared.ticks_left == 0 || !position.is_adjacent_to(cleared.cell) {
            return None;
        }

        let heading = position.heading_to(cleared.cell);
        if host.can_move()
            && probe(&*host, position, heading, false) == Probe::Clear
            && host.step(heading)
        {
            trace!(cell = ?cleared.cell, "entered cleared cell");
            return Some(MoveOutcome::Moved { heading });
        }
        cleared.ticks_left -= 1;
        self.state.cleared = Some(cleared);
        None
    }

    /// Spends the tick without moving: dig straight ahead or face the target.
    fn hold_position<L>(&mut self, host: &mut L, goal: Position, dig_allowed: bool) -> MoveOutcome
    where
        L: Locomotion + ?Sized,
    {
        let position = host.position();
        let direct = position.heading_to(goal);
        if let Probe::Diggable(cell) = probe(&*host, position, direct, dig_allowed) {
            return self.dig(host, direct, cell);
        }
        if direct != Heading::Center && host.heading() != direct && host.turn(direct) {
            return MoveOutcome::Turned { heading: direct };
        }
        MoveOutcome::NoAction
    }

    fn execute<L>(&mut self, host: &mut L, heading: Heading, probe: Probe) -> MoveOutcome
    where
        L: Locomotion + ?Sized,
    {
        match probe {
            Probe::Clear if host.step(heading) => MoveOutcome::Moved { heading },
            Probe::Diggable(cell) => self.dig(host, heading, cell),
            Probe::Clear | Probe::Crowded | Probe::Blocked { .. } => MoveOutcome::NoAction,
        }
    }

    fn dig<L>(&mut self, host: &mut L, heading: Heading, cell: Position) -> MoveOutcome
    where
        L: Locomotion + ?Sized,
    {
        let cleared = host
            .terrain_mutator()
            .map_or(false, |mutator| mutator.clear(cell));
        if !cleared {
            return MoveOutcome::NoAction;
        }

        self.events.push(NavEvent::TerrainCleared { cell });
        let advanced = host.can_move() && host.step(heading);
        debug!(?cell, advanced, "cleared removable terrain");
        if !advanced {
            self.state.cleared = Some(ClearedCell {
                cell,
                ticks_left: self.config.dig.commit_ticks,
            });
        }
        MoveOutcome::DugTerrain { cell, advanced }
    }

    fn yield_to_peers(&mut self, heading: Heading) -> MoveOutcome {
        trace!(?heading, "holding behind peers");
        self.events.push(NavEvent::Yielded { heading });
        MoveOutcome::Yielded { heading }
    }
}
