#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Burrow adapters.
//!
//! Adapters snapshot the world into a [`Scene`], wrap it into a
//! [`Presentation`] and hand it to a [`RenderingBackend`]. The only backend
//! shipped here draws character frames into any [`std::io::Write`] sink.

use anyhow::Result as AnyResult;
use burrow_core::{AgentId, Footprint, GridSize, Heading, Position, Team, Tile};
use std::{error::Error, fmt, io::Write};

const TRAIL_GLYPH: char = '*';
const TARGET_GLYPH: char = 'T';

/// Character used for a terrain tile.
#[must_use]
pub const fn tile_glyph(tile: Tile) -> char {
    match tile {
        Tile::Open => '.',
        Tile::Wall => '#',
        Tile::RemovableObstacle => '%',
        Tile::ResourceNode => '$',
    }
}

/// Character used for the centre cell of an agent.
///
/// Cells covered by the rest of a wide footprint use the lowercase form.
#[must_use]
pub const fn agent_glyph(team: Team, footprint: Footprint) -> char {
    match (team, footprint) {
        (Team::Red, Footprint::Single) => 'A',
        (Team::Red, Footprint::Wide) => 'W',
        (Team::Blue, Footprint::Single) => 'H',
        (Team::Blue, Footprint::Wide) => 'M',
    }
}

/// Immutable snapshot describing an agent placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneAgent {
    /// Identifier allocated to the agent by the world.
    pub id: AgentId,
    /// Team the agent belongs to.
    pub team: Team,
    /// Cells covered by the agent.
    pub footprint: Footprint,
    /// Centre cell of the agent.
    pub position: Position,
    /// Facing of the agent.
    pub heading: Heading,
}

/// Scene description combining the grid, its inhabitants and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    size: GridSize,
    tiles: Vec<Tile>,
    /// Agents currently in the world.
    pub agents: Vec<SceneAgent>,
    /// Cells agents are heading for.
    pub targets: Vec<Position>,
    /// Cells previously visited by the tracked agent.
    pub trail: Vec<Position>,
}

impl Scene {
    /// Creates a scene from row-major terrain.
    pub fn new(size: GridSize, tiles: Vec<Tile>) -> Result<Self, RenderingError> {
        let expected = size.cell_count();
        if tiles.len() != expected {
            return Err(RenderingError::TileCount {
                expected,
                received: tiles.len(),
            });
        }
        Ok(Self {
            size,
            tiles,
            agents: Vec::new(),
            targets: Vec::new(),
            trail: Vec::new(),
        })
    }

    /// Dimensions of the drawn grid.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Draws the scene. Agents cover targets, which cover the trail, which
    /// covers open ground.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let width = self.size.width() as usize;
        let mut cells: Vec<char> = self.tiles.iter().map(|tile| tile_glyph(*tile)).collect();

        let mut paint = |cell: Position, glyph: char| {
            if let Some(index) = self.size.index(cell) {
                cells[index] = glyph;
            }
        };
        for cell in &self.trail {
            if self
                .size
                .index(*cell)
                .and_then(|index| self.tiles.get(index))
                == Some(&Tile::Open)
            {
                paint(*cell, TRAIL_GLYPH);
            }
        }
        for cell in &self.targets {
            paint(*cell, TARGET_GLYPH);
        }
        for agent in &self.agents {
            let glyph = agent_glyph(agent.team, agent.footprint);
            for cell in agent.footprint.cells(agent.position) {
                paint(cell, glyph.to_ascii_lowercase());
            }
            paint(agent.position, glyph);
        }

        let rows = if width == 0 {
            Vec::new()
        } else {
            cells
                .chunks(width)
                .map(|row| row.iter().collect::<String>())
                .collect()
        };
        Frame { rows }
    }
}

/// Character rows produced from a scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    rows: Vec<String>,
}

impl Frame {
    /// Rows from the top of the grid downwards.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Caption printed above the frame.
    pub title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Burrow scenes.
pub trait RenderingBackend {
    /// Displays a single presentation.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

/// Backend writing character frames to a text sink.
#[derive(Debug)]
pub struct TextBackend<W> {
    sink: W,
}

impl<W> TextBackend<W>
where
    W: Write,
{
    /// Wraps the sink frames are written to.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Returns the wrapped sink.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W> RenderingBackend for TextBackend<W>
where
    W: Write,
{
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()> {
        writeln!(self.sink, "-- {} --", presentation.title)?;
        writeln!(self.sink, "{}", presentation.scene.frame())?;
        self.sink.flush()?;
        Ok(())
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The terrain did not cover the grid exactly.
    TileCount {
        /// Cells in the grid.
        expected: usize,
        /// Tiles supplied.
        received: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TileCount { expected, received } => {
                write!(f, "scene needs {expected} tiles (received {received})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_scene(width: u32, height: u32) -> Scene {
        let size = GridSize::new(width, height);
        Scene::new(size, vec![Tile::Open; size.cell_count()]).expect("tiles cover the grid")
    }

    #[test]
    fn scene_rejects_mismatched_terrain() {
        let error = Scene::new(GridSize::new(3, 2), vec![Tile::Open; 5])
            .expect_err("five tiles cannot cover six cells");
        assert_eq!(
            error,
            RenderingError::TileCount {
                expected: 6,
                received: 5
            }
        );
    }

    #[test]
    fn terrain_uses_layout_glyphs() {
        let size = GridSize::new(4, 1);
        let scene = Scene::new(
            size,
            vec![
                Tile::Open,
                Tile::Wall,
                Tile::RemovableObstacle,
                Tile::ResourceNode,
            ],
        )
        .expect("tiles cover the grid");

        assert_eq!(scene.frame().to_string(), ".#%$");
    }

    #[test]
    fn overlays_stack_in_order() {
        let mut scene = open_scene(5, 1);
        scene.trail = vec![Position::new(0, 0), Position::new(1, 0), Position::new(4, 0)];
        scene.targets = vec![Position::new(4, 0)];
        scene.agents = vec![SceneAgent {
            id: AgentId::new(0),
            team: Team::Red,
            footprint: Footprint::Single,
            position: Position::new(1, 0),
            heading: Heading::East,
        }];

        assert_eq!(scene.frame().to_string(), "*A..T");
    }

    #[test]
    fn wide_agents_cover_their_footprint() {
        let mut scene = open_scene(4, 3);
        scene.agents = vec![SceneAgent {
            id: AgentId::new(1),
            team: Team::Blue,
            footprint: Footprint::Wide,
            position: Position::new(1, 1),
            heading: Heading::North,
        }];

        let frame = scene.frame();
        assert_eq!(frame.rows(), ["mmm.", "mMm.", "mmm."]);
    }

    #[test]
    fn text_backend_writes_title_and_frame() {
        let presentation = Presentation::new("tick 3", open_scene(2, 2));
        let mut backend = TextBackend::new(Vec::new());
        backend
            .present(&presentation)
            .expect("writing into memory succeeds");

        let written = String::from_utf8(backend.into_inner()).expect("frames are utf-8");
        assert_eq!(written, "-- tick 3 --\n..\n..\n");
    }
}
