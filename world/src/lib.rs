#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid world hosting navigating agents.
//!
//! The world owns terrain, occupancy, agents and team resource pools. It is
//! mutated either through [`apply`] with a [`Command`], or by an agent during
//! its own turn through an [`AgentTurn`] handle, which implements the
//! capability traits the navigator consumes.

use burrow_core::{
    AgentId, Command, Event, Footprint, GridSize, Heading, Locomotion, Position, SpawnError,
    Surroundings, Team, TerrainMutator, Tile,
};
use tracing::debug;

const DEFAULT_GRID_SIZE: GridSize = GridSize::new(10, 10);
const DEFAULT_SENSE_RADIUS_SQUARED: u32 = 20;
const DEFAULT_DIG_COST: u32 = 10;

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    size: GridSize,
    tiles: Vec<Tile>,
    occupancy: OccupancyGrid,
    agents: Vec<Agent>,
    pools: [u32; 2],
    sense_radius_squared: u32,
    dig_cost: u32,
    tick: u64,
    next_agent_id: u32,
}

impl World {
    /// Creates an open 10×10 world without agents.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            tiles: vec![Tile::Open; DEFAULT_GRID_SIZE.cell_count()],
            occupancy: OccupancyGrid::new(DEFAULT_GRID_SIZE),
            agents: Vec::new(),
            pools: [0; 2],
            sense_radius_squared: DEFAULT_SENSE_RADIUS_SQUARED,
            dig_cost: DEFAULT_DIG_COST,
            tick: 0,
            next_agent_id: 0,
        }
    }

    fn reset_grid(&mut self, size: GridSize) {
        self.size = size;
        self.tiles = vec![Tile::Open; size.cell_count()];
        self.occupancy = OccupancyGrid::new(size);
        self.agents.clear();
        self.pools = [0; 2];
        self.next_agent_id = 0;
    }

    fn tile_at(&self, cell: Position) -> Option<Tile> {
        self.size
            .index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    fn agent_index(&self, agent: AgentId) -> Option<usize> {
        self.agents.iter().position(|candidate| candidate.id == agent)
    }

    fn footprint_clear(&self, agent: Option<AgentId>, footprint: Footprint, center: Position) -> bool {
        footprint.cells(center).all(|cell| {
            let traversable = self.tile_at(cell).map_or(false, Tile::is_traversable);
            let free = match self.occupancy.occupant(cell) {
                None => true,
                Some(occupant) => Some(occupant) == agent,
            };
            traversable && free
        })
    }

    fn footprint_in_bounds(&self, footprint: Footprint, center: Position) -> bool {
        footprint.cells(center).all(|cell| self.size.contains(cell))
    }

    fn spawn(
        &mut self,
        team: Team,
        footprint: Footprint,
        cell: Position,
        heading: Heading,
        out_events: &mut Vec<Event>,
    ) {
        if !self.footprint_in_bounds(footprint, cell) {
            debug!(?cell, ?footprint, "spawn rejected: out of bounds");
            out_events.push(Event::SpawnRejected {
                cell,
                reason: SpawnError::OutOfBounds,
            });
            return;
        }
        if !self.footprint_clear(None, footprint, cell) {
            debug!(?cell, ?footprint, "spawn rejected: obstructed");
            out_events.push(Event::SpawnRejected {
                cell,
                reason: SpawnError::Obstructed,
            });
            return;
        }

        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.saturating_add(1);
        self.occupancy.occupy(id, footprint, cell);
        self.agents.push(Agent {
            id,
            team,
            footprint,
            position: cell,
            heading,
            move_ready: true,
            action_ready: true,
        });
        out_events.push(Event::AgentSpawned {
            agent: id,
            team,
            cell,
        });
    }

    fn pool(&self, team: Team) -> u32 {
        self.pools[team_slot(team)]
    }

    fn pool_mut(&mut self, team: Team) -> &mut u32 {
        &mut self.pools[team_slot(team)]
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { size } => {
            world.reset_grid(size);
            out_events.push(Event::GridConfigured { size });
        }
        Command::ConfigureSensing { radius_squared } => {
            world.sense_radius_squared = radius_squared;
        }
        Command::ConfigureDigCost { cost } => {
            world.dig_cost = cost;
        }
        Command::PaintTile { cell, tile } => {
            let Some(index) = world.size.index(cell) else {
                debug!(?cell, "paint ignored: out of bounds");
                return;
            };
            world.tiles[index] = tile;
            out_events.push(Event::TilePainted { cell, tile });
        }
        Command::SpawnAgent {
            team,
            footprint,
            cell,
            heading,
        } => world.spawn(team, footprint, cell, heading, out_events),
        Command::DespawnAgent { agent } => {
            let Some(index) = world.agent_index(agent) else {
                return;
            };
            let removed = world.agents.remove(index);
            world.occupancy.vacate(removed.footprint, removed.position);
            out_events.push(Event::AgentDespawned { agent });
        }
        Command::GrantResources { team, amount } => {
            let pool = world.pool_mut(team);
            *pool = pool.saturating_add(amount);
            let total = *pool;
            out_events.push(Event::ResourcesGranted { team, total });
        }
        Command::Tick => {
            world.tick = world.tick.saturating_add(1);
            for agent in &mut world.agents {
                agent.move_ready = true;
                agent.action_ready = true;
            }
            out_events.push(Event::TimeAdvanced { tick: world.tick });
        }
    }
}

/// Opens the turn of a single agent, or `None` when the agent does not exist.
///
/// Events produced by the agent's actions are appended to `out_events`.
pub fn agent_turn<'w>(
    world: &'w mut World,
    agent: AgentId,
    out_events: &'w mut Vec<Event>,
) -> Option<AgentTurn<'w>> {
    let index = world.agent_index(agent)?;
    Some(AgentTurn {
        world,
        index,
        events: out_events,
    })
}

/// Exclusive handle over one agent for the duration of its turn.
#[derive(Debug)]
pub struct AgentTurn<'w> {
    world: &'w mut World,
    index: usize,
    events: &'w mut Vec<Event>,
}

impl AgentTurn<'_> {
    fn agent(&self) -> &Agent {
        &self.world.agents[self.index]
    }

    fn agent_mut(&mut self) -> &mut Agent {
        &mut self.world.agents[self.index]
    }

    /// Identifier of the agent taking its turn.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.agent().id
    }

    fn senses(&self, cell: Position) -> bool {
        self.agent().position.distance_squared(cell) <= self.world.sense_radius_squared
    }
}

impl Surroundings for AgentTurn<'_> {
    fn grid_size(&self) -> GridSize {
        self.world.size
    }

    fn position(&self) -> Position {
        self.agent().position
    }

    fn heading(&self) -> Heading {
        self.agent().heading
    }

    fn footprint(&self) -> Footprint {
        self.agent().footprint
    }

    fn can_act(&self) -> bool {
        self.agent().action_ready
    }

    fn can_move(&self) -> bool {
        self.agent().move_ready
    }

    fn tile(&self, cell: Position) -> Option<Tile> {
        if !self.senses(cell) {
            return None;
        }
        self.world.tile_at(cell)
    }

    fn is_occupied(&self, cell: Position) -> bool {
        let id = self.agent().id;
        self.world
            .occupancy
            .occupant(cell)
            .map_or(false, |occupant| occupant != id)
    }

    fn sensed_hostiles(&self) -> u32 {
        let own = self.agent();
        let count = self
            .world
            .agents
            .iter()
            .filter(|other| other.team != own.team)
            .filter(|other| {
                own.position.distance_squared(other.position) <= self.world.sense_radius_squared
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn resources(&self) -> u32 {
        self.world.pool(self.agent().team)
    }
}

impl Locomotion for AgentTurn<'_> {
    fn step(&mut self, heading: Heading) -> bool {
        if heading == Heading::Center || !self.agent().move_ready {
            return false;
        }

        let Agent {
            id,
            footprint,
            position: from,
            ..
        } = *self.agent();
        let to = from.offset(heading);
        if !self.world.footprint_clear(Some(id), footprint, to) {
            return false;
        }

        self.world.occupancy.vacate(footprint, from);
        self.world.occupancy.occupy(id, footprint, to);
        let agent = self.agent_mut();
        agent.position = to;
        agent.heading = heading;
        agent.move_ready = false;
        self.events.push(Event::AgentMoved {
            agent: id,
            from,
            to,
        });
        true
    }

    fn turn(&mut self, heading: Heading) -> bool {
        if heading == Heading::Center {
            return false;
        }
        let agent = self.agent_mut();
        agent.heading = heading;
        let id = agent.id;
        self.events.push(Event::AgentTurned { agent: id, heading });
        true
    }

    fn terrain_mutator(&mut self) -> Option<&mut dyn TerrainMutator> {
        Some(self)
    }
}

impl TerrainMutator for AgentTurn<'_> {
    fn clear(&mut self, cell: Position) -> bool {
        let Agent {
            id,
            team,
            footprint,
            position,
            action_ready,
            ..
        } = *self.agent();
        if !action_ready {
            return false;
        }
        let reach = u32::try_from(footprint.radius() + 1).unwrap_or(1);
        if position.chebyshev_distance(cell) > reach {
            return false;
        }
        if self.world.tile_at(cell) != Some(Tile::RemovableObstacle) {
            return false;
        }
        let cost = self.world.dig_cost;
        if self.world.pool(team) < cost {
            return false;
        }
        let Some(index) = self.world.size.index(cell) else {
            return false;
        };

        self.world.tiles[index] = Tile::Open;
        *self.world.pool_mut(team) -= cost;
        self.agent_mut().action_ready = false;
        self.events.push(Event::TerrainCleared { agent: id, cell });
        true
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use burrow_core::{AgentId, Footprint, GridSize, Heading, Position, Team, Tile};

    use super::World;

    /// Dimensions of the grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.size
    }

    /// Terrain of a cell, ignoring sensing limits.
    #[must_use]
    pub fn tile(world: &World, cell: Position) -> Option<Tile> {
        world.tile_at(cell)
    }

    /// Agent covering the cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: Position) -> Option<AgentId> {
        world.occupancy.occupant(cell)
    }

    /// Resources held in a team's pool.
    #[must_use]
    pub fn resources(world: &World, team: Team) -> u32 {
        world.pool(team)
    }

    /// Index of the current tick.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Snapshot of a single agent.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        world
            .agent_index(agent)
            .map(|index| snapshot(&world.agents[index]))
    }

    /// Snapshots of every agent ordered by identifier.
    #[must_use]
    pub fn agents(world: &World) -> Vec<AgentSnapshot> {
        let mut snapshots: Vec<AgentSnapshot> =
            world.agents.iter().map(snapshot).collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Immutable representation of a single agent's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AgentSnapshot {
        /// Unique identifier assigned to the agent.
        pub id: AgentId,
        /// Team of the agent.
        pub team: Team,
        /// Cells covered by the agent.
        pub footprint: Footprint,
        /// Centre cell of the agent.
        pub position: Position,
        /// Current facing.
        pub heading: Heading,
    }

    fn snapshot(agent: &super::Agent) -> AgentSnapshot {
        AgentSnapshot {
            id: agent.id,
            team: agent.team,
            footprint: agent.footprint,
            position: agent.position,
            heading: agent.heading,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Agent {
    id: AgentId,
    team: Team,
    footprint: Footprint,
    position: Position,
    heading: Heading,
    move_ready: bool,
    action_ready: bool,
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    size: GridSize,
    cells: Vec<Option<AgentId>>,
}

impl OccupancyGrid {
    fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
        }
    }

    fn occupant(&self, cell: Position) -> Option<AgentId> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, agent: AgentId, footprint: Footprint, center: Position) {
        for cell in footprint.cells(center) {
            if let Some(slot) = self.size.index(cell).and_then(|i| self.cells.get_mut(i)) {
                *slot = Some(agent);
            }
        }
    }

    fn vacate(&mut self, footprint: Footprint, center: Position) {
        for cell in footprint.cells(center) {
            if let Some(slot) = self.size.index(cell).and_then(|i| self.cells.get_mut(i)) {
                *slot = None;
            }
        }
    }
}

const fn team_slot(team: Team) -> usize {
    match team {
        Team::Red => 0,
        Team::Blue => 1,
    }
}
