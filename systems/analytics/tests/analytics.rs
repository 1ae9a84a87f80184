use burrow_core::{AgentId, Command, MoveOutcome, NavConfig, NavTarget, Position, Team};
use burrow_system_analytics::{detour_steps, path_efficiency_bps, Analytics, NavigationReport};
use burrow_system_navigation::Navigator;
use burrow_system_scenario::Layout;
use burrow_world::{self as world, query, World};

const SINGLE_WALL: &str = "
    ...........
    .....#.....
    .....#.....
    .A...#...T.
    .....#.....
    .....#.....
    ...........
";

const ENCLOSED_TARGET: &str = "
    .......
    .......
    ..###..
    ..#T#..
    ..###..
    .......
    A......
";

/// Drives the red agent of a layout and folds every tick into analytics.
fn observe(text: &str, max_ticks: usize) -> (Analytics, AgentId, Position) {
    let layout = Layout::parse(text).expect("layout parses");
    let mut world = World::new();
    let mut events = Vec::new();
    for command in layout.commands(0) {
        world::apply(&mut world, command, &mut events);
    }
    let agent = query::agents(&world)
        .into_iter()
        .find(|agent| agent.team == Team::Red)
        .map(|agent| agent.id)
        .expect("layout places a red agent");
    let target = layout.target().expect("layout marks a target");

    let mut navigator = Navigator::new(NavConfig::default()).expect("default config is valid");
    navigator.set_target(NavTarget::exact(target));
    let mut analytics = Analytics::new();

    for _ in 0..max_ticks {
        let mut world_events = Vec::new();
        let outcome: Option<MoveOutcome> = {
            let mut turn =
                world::agent_turn(&mut world, agent, &mut world_events).expect("agent exists");
            if navigator.has_arrived(&turn) {
                None
            } else {
                Some(navigator.go_to(&mut turn))
            }
        };
        let Some(outcome) = outcome else {
            analytics.record_arrival(agent);
            break;
        };
        let mut nav_events = Vec::new();
        navigator.drain_events(&mut nav_events);
        analytics.handle(agent, outcome, &nav_events, &world_events);
        world::apply(&mut world, Command::Tick, &mut world_events);
    }

    (analytics, agent, target)
}

#[test]
fn rounding_a_wall_is_summarised() {
    let (analytics, agent, target) = observe(SINGLE_WALL, 40);
    let report = analytics.report(agent).expect("agent navigated");

    assert_eq!(report.arrived_after, Some(10));
    assert_eq!(report.ticks, 10);
    assert_eq!(
        report.moves + report.turns + report.digs + report.yields + report.idle,
        report.ticks
    );
    assert_eq!(report.steps, report.moves);
    assert_eq!(report.start, Some(Position::new(1, 3)));
    assert_eq!(report.position, Some(target));
    assert_eq!(report.follow_phases, 1);
    assert_eq!(report.target_resets, 1);
    assert_eq!(report.cycles_broken, 0);
    assert_eq!(report.digs, 0);

    let detour = detour_steps(report).expect("agent stepped");
    assert_eq!(detour, report.steps - 8);
    let efficiency = path_efficiency_bps(report).expect("agent stepped");
    assert!(efficiency <= 10_000);
    assert_eq!(efficiency, 8 * 10_000 / report.steps);
}

#[test]
fn enclosed_target_reports_broken_cycles() {
    let (analytics, agent, _) = observe(ENCLOSED_TARGET, 49);
    let report = analytics.report(agent).expect("agent navigated");

    assert_eq!(report.arrived_after, None);
    assert_eq!(report.ticks, 49);
    assert!(report.cycles_broken >= 1);
    assert!(report.follow_phases >= 2);
}

#[test]
fn replayed_reports_match() {
    let replay = || {
        let (analytics, _, _) = observe(ENCLOSED_TARGET, 60);
        analytics
            .reports()
            .map(|(agent, report)| (agent, report.clone()))
            .collect::<Vec<(AgentId, NavigationReport)>>()
    };
    assert_eq!(replay(), replay(), "replay diverged between runs");
}
