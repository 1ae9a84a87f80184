#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Burrow navigation workspace.
//!
//! This crate defines the value types and message surface that connect the
//! authoritative grid world, the local navigator, and the adapters. Adapters
//! and scenarios submit [`Command`] values describing desired world
//! mutations, the world executes them via its `apply` entry point and
//! broadcasts [`Event`] values. Agents interact with the world through the
//! [`Surroundings`], [`Locomotion`] and [`TerrainMutator`] capabilities,
//! which is all the navigator ever sees of its host.

mod config;

use serde::{Deserialize, Serialize};

pub use config::{ConfigError, DigPolicy, NavConfig};

/// Integer grid coordinate. Rows grow southward, columns grow eastward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Shifts the position by an explicit column and row delta.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Position reached by taking one step in the provided heading.
    #[must_use]
    pub const fn offset(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        self.translate(dx, dy)
    }

    /// Squared Euclidean distance, saturating at `u32::MAX`.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> u32 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        u32::try_from(dx * dx + dy * dy).unwrap_or(u32::MAX)
    }

    /// Number of king moves separating two positions.
    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether the two positions touch, including diagonally.
    #[must_use]
    pub fn is_adjacent_to(self, other: Position) -> bool {
        self.chebyshev_distance(other) == 1
    }

    /// Compass heading that best approximates the straight line to `other`.
    ///
    /// The plane is split into eight 45° sectors centred on the compass
    /// directions, so a target two columns east and one row north resolves
    /// to [`Heading::NorthEast`] while three columns east and one row north
    /// resolves to [`Heading::East`]. Returns [`Heading::Center`] when both
    /// positions coincide.
    #[must_use]
    pub fn heading_to(self, other: Position) -> Heading {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        if dx == 0 && dy == 0 {
            return Heading::Center;
        }

        let (ax, ay) = (dx.abs(), dy.abs());
        // tan(22.5°) ≈ 5 / 12
        let step_x = if ax * 12 < ay * 5 { 0 } else { dx.signum() };
        let step_y = if ay * 12 < ax * 5 { 0 } else { dy.signum() };
        Heading::from_delta(step_x as i32, step_y as i32)
    }
}

/// One of the eight compass directions, plus a "stay put" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Toward decreasing rows.
    North,
    /// Toward decreasing rows and increasing columns.
    NorthEast,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows and increasing columns.
    SouthEast,
    /// Toward increasing rows.
    South,
    /// Toward increasing rows and decreasing columns.
    SouthWest,
    /// Toward decreasing columns.
    West,
    /// Toward decreasing rows and decreasing columns.
    NorthWest,
    /// No movement.
    Center,
}

impl Heading {
    /// Compass headings in clockwise order starting from north.
    pub const COMPASS: [Heading; 8] = [
        Heading::North,
        Heading::NorthEast,
        Heading::East,
        Heading::SouthEast,
        Heading::South,
        Heading::SouthWest,
        Heading::West,
        Heading::NorthWest,
    ];

    const DELTAS: [(i32, i32); 8] = [
        (0, -1),
        (1, -1),
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
    ];

    /// Clockwise index of the heading, or `None` for [`Heading::Center`].
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::North => Some(0),
            Self::NorthEast => Some(1),
            Self::East => Some(2),
            Self::SouthEast => Some(3),
            Self::South => Some(4),
            Self::SouthWest => Some(5),
            Self::West => Some(6),
            Self::NorthWest => Some(7),
            Self::Center => None,
        }
    }

    /// Heading at the provided clockwise index, wrapping modulo eight.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::COMPASS[index % 8]
    }

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self.index() {
            Some(index) => Self::DELTAS[index],
            None => (0, 0),
        }
    }

    /// Rotates 45° counter-clockwise. The sentinel is left untouched.
    #[must_use]
    pub const fn rotate_left(self) -> Self {
        match self.index() {
            Some(index) => Self::from_index(index + 7),
            None => Self::Center,
        }
    }

    /// Rotates 45° clockwise. The sentinel is left untouched.
    #[must_use]
    pub const fn rotate_right(self) -> Self {
        match self.index() {
            Some(index) => Self::from_index(index + 1),
            None => Self::Center,
        }
    }

    /// Heading pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self.index() {
            Some(index) => Self::from_index(index + 4),
            None => Self::Center,
        }
    }

    /// Reports whether the heading moves along both axes.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    fn from_delta(dx: i32, dy: i32) -> Self {
        Self::COMPASS
            .into_iter()
            .zip(Self::DELTAS)
            .find_map(|(heading, delta)| (delta == (dx, dy)).then_some(heading))
            .unwrap_or(Self::Center)
    }
}

/// Wall-following direction chosen when the navigator meets an obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationSense {
    /// Probe headings counter-clockwise; the obstacle stays on the right.
    Left,
    /// Probe headings clockwise; the obstacle stays on the left.
    Right,
}

impl RotationSense {
    /// The other sense.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Rotates the heading 45° in this sense.
    #[must_use]
    pub const fn rotate(self, heading: Heading) -> Heading {
        match self {
            Self::Left => heading.rotate_left(),
            Self::Right => heading.rotate_right(),
        }
    }
}

/// Terrain classification of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable ground.
    Open,
    /// Permanent obstacle.
    Wall,
    /// Dirt that can be cleared into [`Tile::Open`] at a resource cost.
    RemovableObstacle,
    /// Mine. Walkable and informational only for navigation.
    ResourceNode,
}

impl Tile {
    /// Reports whether an agent may stand on the tile without clearing it.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Open | Self::ResourceNode)
    }
}

/// Fixed dimensions of a match grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the position lies within the grid.
    #[must_use]
    pub fn contains(&self, cell: Position) -> bool {
        u32::try_from(cell.x()).map_or(false, |x| x < self.width)
            && u32::try_from(cell.y()).map_or(false, |y| y < self.height)
    }

    /// Row-major index of the position, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: Position) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.y()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterates every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

/// Destination requested by the strategic layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavTarget {
    /// Cell the agent is heading for.
    pub location: Position,
    /// Whether the agent must physically reach the cell. Approximate targets
    /// are abandoned as soon as the cell becomes sensed.
    pub exact: bool,
}

impl NavTarget {
    /// Target that must be occupied or adjoined.
    #[must_use]
    pub const fn exact(location: Position) -> Self {
        Self {
            location,
            exact: true,
        }
    }

    /// Target that only needs to come into sensing range.
    #[must_use]
    pub const fn approximate(location: Position) -> Self {
        Self {
            location,
            exact: false,
        }
    }
}

/// Result of a single navigation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The agent stepped (and faced) in the heading.
    Moved {
        /// Heading of the step.
        heading: Heading,
    },
    /// The agent could not move this tick and turned to face the heading.
    Turned {
        /// Heading now faced.
        heading: Heading,
    },
    /// The agent cleared removable terrain.
    DugTerrain {
        /// Cell that was cleared.
        cell: Position,
        /// Whether the agent also stepped into the cleared cell.
        advanced: bool,
    },
    /// A wide agent held position because only peers blocked its way.
    Yielded {
        /// Heading that was held by peers.
        heading: Heading,
    },
    /// Nothing happened this tick.
    NoAction,
}

impl MoveOutcome {
    /// Reports whether the agent's position changed.
    #[must_use]
    pub const fn advanced(&self) -> bool {
        matches!(
            self,
            Self::Moved { .. } | Self::DugTerrain { advanced: true, .. }
        )
    }
}

/// Reason the navigator discarded its obstacle-tracing context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetCause {
    /// A new target arrived far from the previous one.
    TargetChanged,
    /// The strategic layer withdrew the target.
    TargetCleared,
    /// The agent revisited a cell with an identical tracing signature.
    CycleDetected,
    /// The agent kept pressing into the same obstacle cell for too long.
    Escalated,
}

/// Notable transitions inside the navigator, drained by analytics and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavEvent {
    /// Obstacle memory, rotation sense and progress tracking were discarded.
    FullReset {
        /// What triggered the reset.
        cause: ResetCause,
    },
    /// Progress tracking was rebased onto a slightly moved target.
    SoftReset {
        /// Best squared distance after rebasing.
        best_distance: u32,
    },
    /// Greedy movement failed and the agent started tracing an obstacle.
    FollowStarted {
        /// Sense chosen for tracing.
        sense: RotationSense,
    },
    /// The agent left the obstacle after beating its best distance.
    FollowEnded,
    /// The agent returned to a cell under an identical tracing signature.
    CycleDetected {
        /// Cell that closed the loop.
        cell: Position,
    },
    /// Removable terrain was converted to open ground.
    TerrainCleared {
        /// Cell that was cleared.
        cell: Position,
    },
    /// A wide agent held position behind peers.
    Yielded {
        /// Heading that was held by peers.
        heading: Heading,
    },
}

/// Number of cells an agent covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Footprint {
    /// A single cell.
    Single,
    /// A 3×3 block centred on the agent's position.
    Wide,
}

impl Footprint {
    /// Chebyshev radius of the footprint around its centre.
    #[must_use]
    pub const fn radius(self) -> i32 {
        match self {
            Self::Single => 0,
            Self::Wide => 1,
        }
    }

    /// Cells covered when centred on `center`.
    pub fn cells(self, center: Position) -> impl Iterator<Item = Position> {
        let radius = self.radius();
        (-radius..=radius)
            .flat_map(move |dy| (-radius..=radius).map(move |dx| center.translate(dx, dy)))
    }
}

/// Side an agent fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// First team.
    Red,
    /// Second team.
    Blue,
}

impl Team {
    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// Part of the footprint lies outside the grid.
    OutOfBounds,
    /// Part of the footprint is not traversable or already occupied.
    Obstructed,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the grid with an all-open grid of the provided size,
    /// removing every agent and resetting resource pools.
    ConfigureGrid {
        /// Dimensions of the new grid.
        size: GridSize,
    },
    /// Sets how far agents can sense, as a squared radius.
    ConfigureSensing {
        /// Squared sensing radius.
        radius_squared: u32,
    },
    /// Sets the resource price of clearing one removable cell.
    ConfigureDigCost {
        /// Resources deducted per cleared cell.
        cost: u32,
    },
    /// Overwrites the tile of a single cell.
    PaintTile {
        /// Cell to overwrite.
        cell: Position,
        /// New terrain.
        tile: Tile,
    },
    /// Places a new agent centred on the provided cell.
    SpawnAgent {
        /// Team the agent belongs to.
        team: Team,
        /// Cells covered by the agent.
        footprint: Footprint,
        /// Centre cell of the agent.
        cell: Position,
        /// Initial facing.
        heading: Heading,
    },
    /// Removes an agent from the world.
    DespawnAgent {
        /// Agent to remove.
        agent: AgentId,
    },
    /// Adds resources to a team's shared pool.
    GrantResources {
        /// Team receiving the resources.
        team: Team,
        /// Amount added.
        amount: u32,
    },
    /// Advances the global tick, refreshing every agent's move and action.
    Tick,
}

/// Events broadcast by the world after processing commands or agent turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The grid was replaced.
    GridConfigured {
        /// Dimensions of the new grid.
        size: GridSize,
    },
    /// A cell's terrain was overwritten.
    TilePainted {
        /// Cell that changed.
        cell: Position,
        /// New terrain.
        tile: Tile,
    },
    /// An agent entered the world.
    AgentSpawned {
        /// Identifier allocated to the agent.
        agent: AgentId,
        /// Team of the agent.
        team: Team,
        /// Centre cell of the agent.
        cell: Position,
    },
    /// A spawn request was refused.
    SpawnRejected {
        /// Requested centre cell.
        cell: Position,
        /// Why the request failed.
        reason: SpawnError,
    },
    /// An agent left the world.
    AgentDespawned {
        /// Agent that was removed.
        agent: AgentId,
    },
    /// A team's pool grew.
    ResourcesGranted {
        /// Team receiving the resources.
        team: Team,
        /// Pool size after the grant.
        total: u32,
    },
    /// The global tick advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
    },
    /// An agent stepped to a neighbouring cell.
    AgentMoved {
        /// Agent that moved.
        agent: AgentId,
        /// Centre before the step.
        from: Position,
        /// Centre after the step.
        to: Position,
    },
    /// An agent changed facing without moving.
    AgentTurned {
        /// Agent that turned.
        agent: AgentId,
        /// New facing.
        heading: Heading,
    },
    /// An agent cleared removable terrain.
    TerrainCleared {
        /// Agent that paid for the clearing.
        agent: AgentId,
        /// Cell that became open.
        cell: Position,
    },
}

/// Read-only view an agent has of itself and the grid around it.
pub trait Surroundings {
    /// Dimensions of the grid, fixed for the match.
    fn grid_size(&self) -> GridSize;

    /// Current centre cell of the agent.
    fn position(&self) -> Position;

    /// Current facing of the agent.
    fn heading(&self) -> Heading;

    /// Cells covered by the agent.
    fn footprint(&self) -> Footprint;

    /// Whether the agent still holds its action for this tick.
    fn can_act(&self) -> bool;

    /// Whether the agent still holds its movement for this tick.
    fn can_move(&self) -> bool;

    /// Terrain of a cell, or `None` when unsensed or off the grid.
    fn tile(&self, cell: Position) -> Option<Tile>;

    /// Whether another agent currently covers the cell.
    fn is_occupied(&self, cell: Position) -> bool;

    /// Number of hostile agents currently sensed.
    fn sensed_hostiles(&self) -> u32;

    /// Resources available in the shared team pool.
    fn resources(&self) -> u32;
}

/// Movement capabilities granted to an agent for the current tick.
pub trait Locomotion: Surroundings {
    /// Steps one cell in the heading and faces it. Returns whether the host
    /// accepted the move.
    fn step(&mut self, heading: Heading) -> bool;

    /// Faces the heading without moving. Returns whether the host accepted.
    fn turn(&mut self, heading: Heading) -> bool;

    /// Capability to clear removable terrain, when the host grants one.
    fn terrain_mutator(&mut self) -> Option<&mut dyn TerrainMutator> {
        None
    }
}

/// Side-effecting handle that converts removable terrain into open ground.
pub trait TerrainMutator {
    /// Clears the cell, paying its cost. Returns `false` without side effects
    /// when the cell is not removable terrain or cannot be paid for.
    fn clear(&mut self, cell: Position) -> bool;
}

#[cfg(test)]
mod tests {
    use super::{Footprint, GridSize, Heading, MoveOutcome, Position, RotationSense};

    #[test]
    fn rotations_wrap_around_the_compass() {
        assert_eq!(Heading::North.rotate_left(), Heading::NorthWest);
        assert_eq!(Heading::NorthWest.rotate_right(), Heading::North);
        assert_eq!(Heading::East.opposite(), Heading::West);
        assert_eq!(Heading::SouthWest.opposite(), Heading::NorthEast);
        assert_eq!(Heading::Center.rotate_left(), Heading::Center);
        assert_eq!(Heading::Center.opposite(), Heading::Center);
    }

    #[test]
    fn eight_rotations_return_to_start() {
        for heading in Heading::COMPASS {
            let mut left = heading;
            let mut right = heading;
            for _ in 0..8 {
                left = left.rotate_left();
                right = RotationSense::Right.rotate(right);
            }
            assert_eq!(left, heading);
            assert_eq!(right, heading);
        }
    }

    #[test]
    fn heading_to_rounds_to_nearest_sector() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.heading_to(origin), Heading::Center);
        assert_eq!(origin.heading_to(Position::new(5, 0)), Heading::North);
        assert_eq!(origin.heading_to(Position::new(7, 4)), Heading::NorthEast);
        assert_eq!(origin.heading_to(Position::new(8, 4)), Heading::East);
        assert_eq!(origin.heading_to(Position::new(2, 8)), Heading::SouthWest);
        assert_eq!(origin.heading_to(Position::new(4, 9)), Heading::South);
    }

    #[test]
    fn heading_to_always_shrinks_chebyshev_distance() {
        let origin = Position::new(0, 0);
        for x in -6..=6 {
            for y in -6..=6 {
                let target = Position::new(x, y);
                if target == origin {
                    continue;
                }
                let next = origin.offset(origin.heading_to(target));
                assert_eq!(
                    next.chebyshev_distance(target) + 1,
                    origin.chebyshev_distance(target),
                    "step toward {target:?} was not optimal"
                );
            }
        }
    }

    #[test]
    fn distances_match_expectation() {
        let a = Position::new(1, 1);
        let b = Position::new(4, 3);
        assert_eq!(a.distance_squared(b), 13);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert!(a.is_adjacent_to(Position::new(2, 2)));
        assert!(!a.is_adjacent_to(a));
    }

    #[test]
    fn grid_bounds_reject_negative_and_overflowing_cells() {
        let size = GridSize::new(4, 3);
        assert!(size.contains(Position::new(3, 2)));
        assert!(!size.contains(Position::new(4, 0)));
        assert!(!size.contains(Position::new(-1, 0)));
        assert_eq!(size.index(Position::new(1, 2)), Some(9));
        assert_eq!(size.index(Position::new(0, 3)), None);
        assert_eq!(size.positions().count(), 12);
    }

    #[test]
    fn wide_footprint_covers_nine_cells() {
        let cells: Vec<_> = Footprint::Wide.cells(Position::new(2, 2)).collect();
        assert_eq!(cells.len(), 9);
        assert!(cells.contains(&Position::new(1, 1)));
        assert!(cells.contains(&Position::new(3, 3)));
        assert_eq!(Footprint::Single.cells(Position::new(2, 2)).count(), 1);
    }

    #[test]
    fn only_real_steps_count_as_advancing() {
        assert!(MoveOutcome::Moved {
            heading: Heading::East
        }
        .advanced());
        assert!(!MoveOutcome::Yielded {
            heading: Heading::East
        }
        .advanced());
        assert!(!MoveOutcome::DugTerrain {
            cell: Position::new(0, 0),
            advanced: false,
        }
        .advanced());
    }
}
