use burrow_core::{Command, Event, Footprint, Position, Team, Tile};
use burrow_system_scenario::{generate, GeneratorConfig, Layout};
use burrow_world::{self as world, query, World};
use proptest::prelude::*;

fn build(layout: &Layout, resources: u32) -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    for command in layout.commands(resources) {
        world::apply(&mut world, command, &mut events);
    }
    (world, events)
}

#[test]
fn layout_commands_rebuild_the_layout() {
    let layout = Layout::parse(
        "
        .........
        .W....%H.
        .....$...
        ...#....T
        ",
    )
    .expect("layout parses");
    let (world, events) = build(&layout, 30);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SpawnRejected { .. })));
    assert_eq!(query::grid_size(&world), layout.size());
    for cell in layout.size().positions() {
        assert_eq!(query::tile(&world, cell), layout.tile(cell), "{cell:?}");
    }

    let agents = query::agents(&world);
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0].footprint, Footprint::Wide);
    assert_eq!(agents[0].position, Position::new(1, 1));
    assert_eq!(agents[1].team, Team::Blue);
    assert_eq!(query::resources(&world, Team::Red), 30);
    assert_eq!(query::resources(&world, Team::Blue), 30);
}

#[test]
fn overlapping_wide_agents_are_rejected_by_the_world() {
    let layout = Layout::parse("...\n.WA\n...").expect("layout parses");
    let (world, events) = build(&layout, 0);

    assert_eq!(query::agents(&world).len(), 1);
    assert!(events.contains(&Event::SpawnRejected {
        cell: Position::new(2, 1),
        reason: burrow_core::SpawnError::Obstructed,
    }));
}

#[test]
fn generated_layouts_start_with_configure_grid() {
    let layout = generate(&GeneratorConfig::default()).expect("defaults are valid");
    let commands = layout.commands(0);
    assert_eq!(
        commands.first(),
        Some(&Command::ConfigureGrid {
            size: layout.size()
        })
    );
    assert!(commands
        .iter()
        .all(|command| !matches!(command, Command::PaintTile { tile: Tile::Open, .. })));
}

proptest! {
    #[test]
    fn generated_layouts_survive_ascii(
        seed in any::<u64>(),
        width in 2u32..30,
        height in 1u32..20,
        wall in 0.0f64..0.5,
        dirt in 0.0f64..0.5,
    ) {
        let config = GeneratorConfig {
            width,
            height,
            seed,
            wall_density: wall,
            dirt_density: dirt,
        };
        let layout = generate(&config).expect("parameters are in range");
        let reparsed = Layout::parse(&layout.to_string()).expect("rendered layout parses");
        prop_assert_eq!(reparsed, layout);
    }
}
