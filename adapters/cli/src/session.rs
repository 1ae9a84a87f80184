use anyhow::{anyhow, Context, Result};
use burrow_core::{AgentId, Command, Event, NavTarget, Position, Team};
use burrow_rendering::{Presentation, RenderingBackend, Scene, SceneAgent};
use burrow_system_analytics::{detour_steps, path_efficiency_bps, Analytics, NavigationReport};
use burrow_system_navigation::Navigator;
use burrow_system_scenario::Layout;
use burrow_world::{self as world, query, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::settings::Settings;

/// Outcome of driving a layout to completion or to the tick limit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) target: Position,
    pub(crate) ticks: u32,
    pub(crate) all_arrived: bool,
    pub(crate) agents: Vec<AgentSummary>,
}

/// Report of one driven agent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct AgentSummary {
    pub(crate) agent: AgentId,
    pub(crate) position: Option<Position>,
    pub(crate) path_efficiency_bps: Option<u32>,
    pub(crate) detour_steps: Option<u32>,
    pub(crate) report: NavigationReport,
}

/// World, navigators and analytics for one layout run.
struct Session {
    world: World,
    target: Position,
    navigators: Vec<(AgentId, Navigator)>,
    trail: Vec<Position>,
    analytics: Analytics,
}

impl Session {
    fn new(layout: &Layout, settings: &Settings) -> Result<Self> {
        let target = layout
            .target()
            .ok_or_else(|| anyhow!("layout does not mark a target cell"))?;

        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureSensing {
                radius_squared: settings.world.sense_radius_squared,
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::ConfigureDigCost {
                cost: settings.world.dig_cost,
            },
            &mut events,
        );
        for command in layout.commands(settings.world.starting_resources) {
            world::apply(&mut world, command, &mut events);
        }
        for event in &events {
            if let Event::SpawnRejected { cell, reason } = event {
                info!(?cell, ?reason, "layout agent was not placed");
            }
        }

        let mut navigators = Vec::new();
        for agent in query::agents(&world) {
            if agent.team != Team::Red {
                continue;
            }
            let mut navigator = Navigator::new(settings.navigation.clone())
                .context("navigation settings are invalid")?;
            navigator.set_target(NavTarget::exact(target));
            navigators.push((agent.id, navigator));
        }
        if navigators.is_empty() {
            return Err(anyhow!("layout places no red agent to drive"));
        }

        Ok(Self {
            world,
            target,
            navigators,
            trail: Vec::new(),
            analytics: Analytics::new(),
        })
    }

    /// Runs one navigation tick for every driven agent, then advances time.
    /// Returns whether every agent had already arrived.
    fn tick(&mut self) -> bool {
        let mut all_arrived = true;
        for (agent, navigator) in &mut self.navigators {
            let mut world_events = Vec::new();
            let outcome = {
                let Some(mut turn) = world::agent_turn(&mut self.world, *agent, &mut world_events)
                else {
                    continue;
                };
                if navigator.has_arrived(&turn) {
                    None
                } else {
                    Some(navigator.go_to(&mut turn))
                }
            };
            let Some(outcome) = outcome else {
                self.analytics.record_arrival(*agent);
                continue;
            };
            all_arrived = false;

            let mut nav_events = Vec::new();
            navigator.drain_events(&mut nav_events);
            debug!(?agent, ?outcome, events = nav_events.len(), "agent navigated");
            self.analytics
                .handle(*agent, outcome, &nav_events, &world_events);
            for event in &world_events {
                if let Event::AgentMoved { from, .. } = event {
                    self.trail.push(*from);
                }
            }
        }

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick, &mut events);
        all_arrived
    }

    fn scene(&self) -> Result<Scene> {
        let size = query::grid_size(&self.world);
        let tiles = size
            .positions()
            .map(|cell| {
                query::tile(&self.world, cell)
                    .ok_or_else(|| anyhow!("world has no tile at {cell:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut scene = Scene::new(size, tiles)?;
        scene.agents = query::agents(&self.world)
            .into_iter()
            .map(|agent| SceneAgent {
                id: agent.id,
                team: agent.team,
                footprint: agent.footprint,
                position: agent.position,
                heading: agent.heading,
            })
            .collect();
        scene.targets = vec![self.target];
        scene.trail = self.trail.clone();
        Ok(scene)
    }

    fn summary(&self, ticks: u32, all_arrived: bool) -> RunSummary {
        let agents = self
            .navigators
            .iter()
            .map(|(agent, _)| {
                let report = self.analytics.report(*agent).cloned().unwrap_or_default();
                AgentSummary {
                    agent: *agent,
                    position: query::agent(&self.world, *agent).map(|snapshot| snapshot.position),
                    path_efficiency_bps: path_efficiency_bps(&report),
                    detour_steps: detour_steps(&report),
                    report,
                }
            })
            .collect();
        RunSummary {
            target: self.target,
            ticks,
            all_arrived,
            agents,
        }
    }
}

/// Drives every red agent of the layout toward its first target.
///
/// When a backend is supplied, a frame is presented before the first tick
/// and after every tick.
pub(crate) fn run(
    layout: &Layout,
    settings: &Settings,
    mut backend: Option<&mut dyn RenderingBackend>,
) -> Result<RunSummary> {
    let mut session = Session::new(layout, settings)?;
    let max_ticks = settings.world.max_ticks;
    info!(
        agents = session.navigators.len(),
        target = ?session.target,
        max_ticks,
        "starting navigation run"
    );

    if let Some(backend) = backend.as_deref_mut() {
        backend.present(&Presentation::new("tick 0", session.scene()?))?;
    }

    let mut ticks = 0;
    let mut all_arrived = false;
    while ticks < max_ticks {
        if session.tick() {
            all_arrived = true;
            break;
        }
        ticks += 1;
        if let Some(backend) = backend.as_deref_mut() {
            let title = format!("tick {ticks}");
            backend.present(&Presentation::new(title, session.scene()?))?;
        }
    }

    info!(ticks, all_arrived, "navigation run finished");
    Ok(session.summary(ticks, all_arrived))
}

#[cfg(test)]
mod tests {
    use burrow_rendering::TextBackend;

    use super::*;

    const SINGLE_WALL: &str = "
        ...........
        .....#.....
        .....#.....
        .A...#...T.
        .....#.....
        .....#.....
        ...........
    ";

    #[test]
    fn single_wall_run_arrives() {
        let layout = Layout::parse(SINGLE_WALL).expect("layout parses");
        let summary = run(&layout, &Settings::default(), None).expect("run succeeds");

        assert!(summary.all_arrived);
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.agents.len(), 1);
        let agent = &summary.agents[0];
        assert_eq!(agent.position, Some(Position::new(9, 3)));
        assert_eq!(agent.report.arrived_after, Some(10));
        assert_eq!(agent.report.cycles_broken, 0);
    }

    #[test]
    fn tick_limit_stops_the_run() {
        let layout = Layout::parse(SINGLE_WALL).expect("layout parses");
        let mut settings = Settings::default();
        settings.world.max_ticks = 4;

        let summary = run(&layout, &settings, None).expect("run succeeds");

        assert!(!summary.all_arrived);
        assert_eq!(summary.ticks, 4);
        assert_eq!(summary.agents[0].report.ticks, 4);
    }

    #[test]
    fn frames_are_presented_every_tick() {
        let layout = Layout::parse("A..T").expect("layout parses");
        let mut backend = TextBackend::new(Vec::new());

        let summary =
            run(&layout, &Settings::default(), Some(&mut backend)).expect("run succeeds");
        let written = String::from_utf8(backend.into_inner()).expect("frames are utf-8");

        assert_eq!(summary.ticks, 3);
        assert_eq!(
            written,
            "-- tick 0 --\nA..T\n-- tick 1 --\n*A.T\n-- tick 2 --\n**AT\n-- tick 3 --\n***A\n"
        );
    }

    #[test]
    fn layouts_need_a_target_and_a_red_agent() {
        let untargeted = Layout::parse("A..").expect("layout parses");
        assert!(run(&untargeted, &Settings::default(), None).is_err());

        let unmanned = Layout::parse("H.T").expect("layout parses");
        assert!(run(&unmanned, &Settings::default(), None).is_err());
    }
}
