use burrow_core::{Footprint, GridSize, Position, Team, Tile};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{AgentPlacement, Layout, LayoutError};

/// Parameters of a randomly scattered layout.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Columns of the grid.
    pub width: u32,
    /// Rows of the grid.
    pub height: u32,
    /// Seed of the deterministic random stream.
    pub seed: u64,
    /// Probability of a cell becoming a wall.
    pub wall_density: f64,
    /// Probability of a cell becoming removable terrain.
    pub dirt_density: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 24,
            height: 12,
            seed: 0,
            wall_density: 0.2,
            dirt_density: 0.1,
        }
    }
}

/// Scatters walls and dirt over the grid, with a red agent on the west edge
/// and its target on the east edge of the middle row.
///
/// The same configuration always yields the same layout.
pub fn generate(config: &GeneratorConfig) -> Result<Layout, LayoutError> {
    let GeneratorConfig {
        width,
        height,
        seed,
        wall_density,
        dirt_density,
    } = *config;
    if width < 2 || height < 1 {
        return Err(LayoutError::TooSmall { width, height });
    }
    let densities_valid = wall_density >= 0.0
        && dirt_density >= 0.0
        && wall_density + dirt_density <= 1.0;
    if !densities_valid {
        return Err(LayoutError::InvalidDensity {
            wall: wall_density,
            dirt: dirt_density,
        });
    }

    let size = GridSize::new(width, height);
    let row = i32::try_from(height / 2).map_err(|_| LayoutError::Oversized)?;
    let last_column = i32::try_from(width - 1).map_err(|_| LayoutError::Oversized)?;
    let start = Position::new(0, row);
    let target = Position::new(last_column, row);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tiles = size
        .positions()
        .map(|cell| {
            let roll: f64 = rng.gen();
            if cell == start || cell == target {
                Tile::Open
            } else if roll < wall_density {
                Tile::Wall
            } else if roll < wall_density + dirt_density {
                Tile::RemovableObstacle
            } else {
                Tile::Open
            }
        })
        .collect();

    let agent = AgentPlacement {
        team: Team::Red,
        footprint: Footprint::Single,
        cell: start,
    };
    Layout::from_parts(size, tiles, vec![agent], vec![target])
}
