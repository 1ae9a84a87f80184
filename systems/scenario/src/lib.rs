#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid layouts for navigation scenarios.
//!
//! Layouts are written as ASCII art, one glyph per cell:
//!
//! | Glyph | Meaning |
//! |---|---|
//! | `.` | open ground |
//! | `#` | wall |
//! | `%` | removable obstacle |
//! | `$` | resource node |
//! | `A` | red single-cell agent |
//! | `W` | red wide agent (centre cell) |
//! | `H` | blue single-cell agent |
//! | `M` | blue wide agent (centre cell) |
//! | `T` | target on open ground |
//!
//! A parsed [`Layout`] turns into the [`Command`] batch that builds it inside
//! a world.

mod generator;

use std::{fmt, str::FromStr};

use burrow_core::{Command, Footprint, GridSize, Heading, Position, Team, Tile};
use thiserror::Error;

pub use generator::{generate, GeneratorConfig};

/// Agent placed by a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentPlacement {
    /// Team of the agent.
    pub team: Team,
    /// Cells covered by the agent.
    pub footprint: Footprint,
    /// Centre cell of the agent.
    pub cell: Position,
}

/// Terrain, agents and targets of a scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    size: GridSize,
    tiles: Vec<Tile>,
    agents: Vec<AgentPlacement>,
    targets: Vec<Position>,
}

impl Layout {
    /// Parses ASCII rows. Surrounding whitespace and blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(LayoutError::Empty);
        };
        let width = first.chars().count();

        let mut glyphs = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let decoded = Glyph::decode(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    row,
                    column,
                })?;
                glyphs.push(decoded);
            }
        }

        let size = GridSize::new(
            u32::try_from(width).map_err(|_| LayoutError::Oversized)?,
            u32::try_from(rows.len()).map_err(|_| LayoutError::Oversized)?,
        );
        let mut layout = Self {
            size,
            tiles: Vec::with_capacity(glyphs.len()),
            agents: Vec::new(),
            targets: Vec::new(),
        };
        for (cell, glyph) in size.positions().zip(glyphs) {
            layout.tiles.push(glyph.tile);
            match glyph.marker {
                Some(Marker::Agent(team, footprint)) => layout.agents.push(AgentPlacement {
                    team,
                    footprint,
                    cell,
                }),
                Some(Marker::Target) => layout.targets.push(cell),
                None => {}
            }
        }
        Ok(layout)
    }

    /// Assembles a layout from raw parts, checking that everything fits the grid.
    pub fn from_parts(
        size: GridSize,
        tiles: Vec<Tile>,
        agents: Vec<AgentPlacement>,
        targets: Vec<Position>,
    ) -> Result<Self, LayoutError> {
        if size.cell_count() == 0 {
            return Err(LayoutError::Empty);
        }
        if tiles.len() != size.cell_count() {
            return Err(LayoutError::TileCount {
                expected: size.cell_count(),
                found: tiles.len(),
            });
        }
        let cells = agents.iter().map(|agent| agent.cell).chain(targets.iter().copied());
        for cell in cells {
            if !size.contains(cell) {
                return Err(LayoutError::OutOfBounds(cell));
            }
        }
        Ok(Self {
            size,
            tiles,
            agents,
            targets,
        })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Terrain of a cell, or `None` off the grid.
    #[must_use]
    pub fn tile(&self, cell: Position) -> Option<Tile> {
        self.size
            .index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Agents in row-major order of their centre cells.
    #[must_use]
    pub fn agents(&self) -> &[AgentPlacement] {
        &self.agents
    }

    /// Every marked target in row-major order.
    #[must_use]
    pub fn targets(&self) -> &[Position] {
        &self.targets
    }

    /// First marked target.
    #[must_use]
    pub fn target(&self) -> Option<Position> {
        self.targets.first().copied()
    }

    /// Commands that rebuild the layout inside a freshly configured world.
    ///
    /// Agents are spawned in layout order, so a world that starts from
    /// [`Command::ConfigureGrid`] hands out identifiers in the same order.
    /// Both teams receive `resources` when it is non-zero.
    #[must_use]
    pub fn commands(&self, resources: u32) -> Vec<Command> {
        let mut commands = vec![Command::ConfigureGrid { size: self.size }];
        commands.extend(
            self.size
                .positions()
                .zip(&self.tiles)
                .filter(|(_, tile)| **tile != Tile::Open)
                .map(|(cell, tile)| Command::PaintTile { cell, tile: *tile }),
        );
        commands.extend(self.agents.iter().map(|agent| Command::SpawnAgent {
            team: agent.team,
            footprint: agent.footprint,
            cell: agent.cell,
            heading: Heading::North,
        }));
        if resources > 0 {
            for team in [Team::Red, Team::Blue] {
                commands.push(Command::GrantResources {
                    team,
                    amount: resources,
                });
            }
        }
        commands
    }

    fn glyph_at(&self, cell: Position) -> char {
        if let Some(agent) = self.agents.iter().find(|agent| agent.cell == cell) {
            return match (agent.team, agent.footprint) {
                (Team::Red, Footprint::Single) => 'A',
                (Team::Red, Footprint::Wide) => 'W',
                (Team::Blue, Footprint::Single) => 'H',
                (Team::Blue, Footprint::Wide) => 'M',
            };
        }
        if self.targets.contains(&cell) {
            return 'T';
        }
        match self.tile(cell) {
            Some(Tile::Wall) | None => '#',
            Some(Tile::RemovableObstacle) => '%',
            Some(Tile::ResourceNode) => '$',
            Some(Tile::Open) => '.',
        }
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in self.size.positions() {
            if cell.x() == 0 && cell.y() > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", self.glyph_at(cell))?;
        }
        Ok(())
    }
}

/// Reasons a layout is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
    /// The layout has no cells.
    #[error("layout contains no rows")]
    Empty,
    /// A row is wider or narrower than the first one.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph is not part of the layout alphabet.
    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },
    /// The layout does not fit grid coordinates.
    #[error("layout exceeds the maximum grid size")]
    Oversized,
    /// The number of tiles does not match the grid.
    #[error("expected {expected} tiles, found {found}")]
    TileCount {
        /// Cells of the grid.
        expected: usize,
        /// Tiles provided.
        found: usize,
    },
    /// An agent or target lies outside the grid.
    #[error("cell {0:?} lies outside the grid")]
    OutOfBounds(Position),
    /// Generator dimensions leave no room for a start and a target.
    #[error("generated grids need at least 2x1 cells, got {width}x{height}")]
    TooSmall {
        /// Requested columns.
        width: u32,
        /// Requested rows.
        height: u32,
    },
    /// Generator densities are negative or exceed one in total.
    #[error("densities must be non-negative and sum to at most 1 (wall {wall}, dirt {dirt})")]
    InvalidDensity {
        /// Requested wall density.
        wall: f64,
        /// Requested dirt density.
        dirt: f64,
    },
}

#[derive(Clone, Copy, Debug)]
struct Glyph {
    tile: Tile,
    marker: Option<Marker>,
}

#[derive(Clone, Copy, Debug)]
enum Marker {
    Agent(Team, Footprint),
    Target,
}

impl Glyph {
    fn decode(glyph: char) -> Option<Self> {
        let (tile, marker) = match glyph {
            '.' => (Tile::Open, None),
            '#' => (Tile::Wall, None),
            '%' => (Tile::RemovableObstacle, None),
            '$' => (Tile::ResourceNode, None),
            'A' => (Tile::Open, Some(Marker::Agent(Team::Red, Footprint::Single))),
            'W' => (Tile::Open, Some(Marker::Agent(Team::Red, Footprint::Wide))),
            'H' => (Tile::Open, Some(Marker::Agent(Team::Blue, Footprint::Single))),
            'M' => (Tile::Open, Some(Marker::Agent(Team::Blue, Footprint::Wide))),
            'T' => (Tile::Open, Some(Marker::Target)),
            _ => return None,
        };
        Some(Self { tile, marker })
    }
}
