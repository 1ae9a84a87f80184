#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic per-agent navigation statistics.
//!
//! The analytics system never touches the world. Drivers feed it the
//! [`MoveOutcome`] of every navigation tick together with the navigator's
//! drained [`NavEvent`]s and the world [`Event`]s the tick produced.

mod metrics;

use std::collections::BTreeMap;

use burrow_core::{AgentId, Event, MoveOutcome, NavEvent, Position, ResetCause};
use serde::Serialize;

pub use metrics::{detour_steps, path_efficiency_bps};

/// Pure analytics system accumulating one report per agent.
#[derive(Debug, Default)]
pub struct Analytics {
    reports: BTreeMap<AgentId, NavigationReport>,
}

impl Analytics {
    /// Creates an analytics system without reports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one navigation tick of `agent` into its report.
    ///
    /// World events that concern other agents are ignored, so the same batch
    /// can be handed to every agent's call.
    pub fn handle(
        &mut self,
        agent: AgentId,
        outcome: MoveOutcome,
        nav_events: &[NavEvent],
        world_events: &[Event],
    ) {
        let report = self.reports.entry(agent).or_default();
        report.ticks = report.ticks.saturating_add(1);
        report.record_outcome(outcome);
        for event in nav_events {
            report.record_nav_event(*event);
        }
        for event in world_events {
            if let Event::AgentMoved {
                agent: mover,
                from,
                to,
            } = event
            {
                if *mover == agent {
                    report.record_step(*from, *to);
                }
            }
        }
    }

    /// Marks the agent as having reached its target after its recorded ticks.
    pub fn record_arrival(&mut self, agent: AgentId) {
        let report = self.reports.entry(agent).or_default();
        if report.arrived_after.is_none() {
            report.arrived_after = Some(report.ticks);
        }
    }

    /// Report of a single agent, if it ever navigated.
    #[must_use]
    pub fn report(&self, agent: AgentId) -> Option<&NavigationReport> {
        self.reports.get(&agent)
    }

    /// Every report ordered by agent identifier.
    pub fn reports(&self) -> impl Iterator<Item = (AgentId, &NavigationReport)> {
        self.reports.iter().map(|(agent, report)| (*agent, report))
    }
}

/// Counters describing how one agent navigated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavigationReport {
    /// Navigation ticks observed.
    pub ticks: u32,
    /// Ticks that ended with a plain step.
    pub moves: u32,
    /// Ticks spent turning in place.
    pub turns: u32,
    /// Ticks that cleared removable terrain.
    pub digs: u32,
    /// Ticks a wide agent spent waiting behind peers.
    pub yields: u32,
    /// Ticks without any effect.
    pub idle: u32,
    /// Target nudges absorbed without discarding tracing memory.
    pub soft_resets: u32,
    /// Full resets caused by target changes or withdrawals.
    pub target_resets: u32,
    /// Full resets forced by the cycle detector.
    pub cycles_broken: u32,
    /// Full resets forced by pressing against one obstacle for too long.
    pub escalations: u32,
    /// Times the agent started tracing an obstacle boundary.
    pub follow_phases: u32,
    /// Centre cell before the first recorded step.
    pub start: Option<Position>,
    /// Centre cell after the last recorded step.
    pub position: Option<Position>,
    /// Cells stepped through.
    pub steps: u32,
    /// Ticks taken to reach the target, once it was reached.
    pub arrived_after: Option<u32>,
}

impl NavigationReport {
    fn record_outcome(&mut self, outcome: MoveOutcome) {
        let counter = match outcome {
            MoveOutcome::Moved { .. } => &mut self.moves,
            MoveOutcome::Turned { .. } => &mut self.turns,
            MoveOutcome::DugTerrain { .. } => &mut self.digs,
            MoveOutcome::Yielded { .. } => &mut self.yields,
            MoveOutcome::NoAction => &mut self.idle,
        };
        *counter = counter.saturating_add(1);
    }

    fn record_nav_event(&mut self, event: NavEvent) {
        let counter = match event {
            NavEvent::SoftReset { .. } => &mut self.soft_resets,
            NavEvent::FullReset {
                cause: ResetCause::TargetChanged | ResetCause::TargetCleared,
            } => &mut self.target_resets,
            NavEvent::FullReset {
                cause: ResetCause::CycleDetected,
            } => &mut self.cycles_broken,
            NavEvent::FullReset {
                cause: ResetCause::Escalated,
            } => &mut self.escalations,
            NavEvent::FollowStarted { .. } => &mut self.follow_phases,
            NavEvent::FollowEnded
            | NavEvent::CycleDetected { .. }
            | NavEvent::TerrainCleared { .. }
            | NavEvent::Yielded { .. } => return,
        };
        *counter = counter.saturating_add(1);
    }

    fn record_step(&mut self, from: Position, to: Position) {
        if self.start.is_none() {
            self.start = Some(from);
        }
        self.position = Some(to);
        self.steps = self.steps.saturating_add(1);
    }
}
