//! Parser for the startup description.
//!
//! ```text
//! N operationTime totalTime width height
//! <N colour tokens>
//! <2N integers: x y per agent, in agent-index order>
//! OBSTACLES
//! x y
//! TILES
//! count colour x y
//! HOLES
//! depth colour x y
//! ```
//!
//! The three sections are optional and may appear in any order. Blank lines
//! are ignored. Agent ids are their index on the colour line.

use std::path::Path;

use tileworld_types::{AgentId, Color, Hole, Position, Tile};
use tracing::debug;

use crate::error::{ScenarioError, WorldError};
use crate::state::{AgentBody, WorldState};

/// One agent from the startup description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    /// Index on the colour line.
    pub id: AgentId,
    /// Agent colour.
    pub color: Color,
    /// Starting cell.
    pub position: Position,
}

/// A `TILES` line: `count` tiles of one colour on one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileStack {
    /// Number of tiles.
    pub count: u32,
    /// Tile colour.
    pub color: Color,
    /// Cell.
    pub position: Position,
}

/// A `HOLES` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleSpec {
    /// Starting depth.
    pub depth: u32,
    /// Hole colour.
    pub color: Color,
    /// Cell.
    pub position: Position,
}

/// A parsed startup description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Executor tick interval in milliseconds.
    pub operation_time_ms: u64,
    /// Total run length in milliseconds.
    pub total_time_ms: u64,
    /// Grid width.
    pub width: i32,
    /// Grid height.
    pub height: i32,
    /// Agents in id order.
    pub agents: Vec<AgentSpec>,
    /// Obstacle cells.
    pub obstacles: Vec<Position>,
    /// Tile stacks.
    pub tiles: Vec<TileStack>,
    /// Holes.
    pub holes: Vec<HoleSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Obstacles,
    Tiles,
    Holes,
}

impl Section {
    fn from_marker(line: &str) -> Option<Self> {
        match line {
            "OBSTACLES" => Some(Self::Obstacles),
            "TILES" => Some(Self::Tiles),
            "HOLES" => Some(Self::Holes),
            _ => None,
        }
    }
}

impl Scenario {
    /// Read and parse a startup description file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] if the file cannot be read, or any
    /// parse error from [`Scenario::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a startup description.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] describing the first malformed line.
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index.saturating_add(1), line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line_no, header) = lines
            .next()
            .ok_or(ScenarioError::MissingLine { what: "header" })?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        let [count, operation_time, total_time, width, height] = fields.as_slice() else {
            return Err(syntax(line_no, "header must be `N operationTime totalTime width height`"));
        };
        let agent_count: usize = number(line_no, count, "agent count")?;
        let operation_time_ms: u64 = number(line_no, operation_time, "operationTime")?;
        let total_time_ms: u64 = number(line_no, total_time, "totalTime")?;
        let width: i32 = number(line_no, width, "width")?;
        let height: i32 = number(line_no, height, "height")?;

        let mut agents = Vec::with_capacity(agent_count);
        if agent_count > 0 {
            let (color_line_no, color_line) = lines
                .next()
                .ok_or(ScenarioError::MissingLine { what: "agent colour" })?;
            let colors = color_line
                .split_whitespace()
                .map(|token| colour(color_line_no, token))
                .collect::<Result<Vec<_>, _>>()?;
            if colors.len() != agent_count {
                return Err(syntax(
                    color_line_no,
                    &format!("expected {agent_count} colours, found {}", colors.len()),
                ));
            }

            let (pos_line_no, pos_line) = lines
                .next()
                .ok_or(ScenarioError::MissingLine { what: "agent position" })?;
            let coords = pos_line
                .split_whitespace()
                .map(|token| number::<i32>(pos_line_no, token, "coordinate"))
                .collect::<Result<Vec<_>, _>>()?;
            let expected = agent_count.saturating_mul(2);
            if coords.len() != expected {
                return Err(syntax(
                    pos_line_no,
                    &format!("expected {expected} coordinates, found {}", coords.len()),
                ));
            }

            for (index, (color, pair)) in colors.into_iter().zip(coords.chunks_exact(2)).enumerate() {
                let [x, y] = pair else {
                    continue;
                };
                let raw = u32::try_from(index)
                    .map_err(|_err| syntax(pos_line_no, "too many agents"))?;
                agents.push(AgentSpec {
                    id: AgentId::new(raw),
                    color,
                    position: Position::new(*x, *y),
                });
            }
        }

        let mut scenario = Self {
            operation_time_ms,
            total_time_ms,
            width,
            height,
            agents,
            obstacles: Vec::new(),
            tiles: Vec::new(),
            holes: Vec::new(),
        };

        let mut section: Option<Section> = None;
        for (line_no, line) in lines {
            if let Some(next) = Section::from_marker(line) {
                section = Some(next);
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            match section {
                None => return Err(syntax(line_no, "data line outside of any section")),
                Some(Section::Obstacles) => {
                    let [x, y] = fields.as_slice() else {
                        return Err(syntax(line_no, "obstacle line must be `x y`"));
                    };
                    scenario.obstacles.push(Position::new(
                        number(line_no, x, "x")?,
                        number(line_no, y, "y")?,
                    ));
                }
                Some(Section::Tiles) => {
                    let [count, color, x, y] = fields.as_slice() else {
                        return Err(syntax(line_no, "tile line must be `count colour x y`"));
                    };
                    scenario.tiles.push(TileStack {
                        count: number(line_no, count, "tile count")?,
                        color: colour(line_no, color)?,
                        position: Position::new(
                            number(line_no, x, "x")?,
                            number(line_no, y, "y")?,
                        ),
                    });
                }
                Some(Section::Holes) => {
                    let [depth, color, x, y] = fields.as_slice() else {
                        return Err(syntax(line_no, "hole line must be `depth colour x y`"));
                    };
                    scenario.holes.push(HoleSpec {
                        depth: number(line_no, depth, "hole depth")?,
                        color: colour(line_no, color)?,
                        position: Position::new(
                            number(line_no, x, "x")?,
                            number(line_no, y, "y")?,
                        ),
                    });
                }
            }
        }

        debug!(
            agents = scenario.agents.len(),
            obstacles = scenario.obstacles.len(),
            tile_stacks = scenario.tiles.len(),
            holes = scenario.holes.len(),
            "startup description parsed"
        );
        Ok(scenario)
    }

    /// Assemble the initial [`WorldState`].
    ///
    /// Obstacles are placed first so that agents, tiles, and holes on
    /// obstacle cells are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if any entity is misplaced.
    pub fn build_world(&self) -> Result<WorldState, WorldError> {
        let mut world = WorldState::new(self.width, self.height)?;
        for &position in &self.obstacles {
            world.add_obstacle(position)?;
        }
        for stack in &self.tiles {
            for _ in 0..stack.count {
                world.add_tile(stack.position, Tile::new(stack.color.clone()))?;
            }
        }
        for hole in &self.holes {
            world.add_hole(hole.position, Hole::new(hole.color.clone(), hole.depth))?;
        }
        for agent in &self.agents {
            world.add_agent(AgentBody::new(agent.id, agent.color.clone(), agent.position))?;
        }
        Ok(world)
    }
}

fn syntax(line: usize, reason: &str) -> ScenarioError {
    ScenarioError::Syntax {
        line,
        reason: reason.to_owned(),
    }
}

fn number<T: core::str::FromStr>(line: usize, token: &str, what: &str) -> Result<T, ScenarioError> {
    token
        .parse()
        .map_err(|_err| syntax(line, &format!("invalid {what} {token:?}")))
}

fn colour(line: usize, token: &str) -> Result<Color, ScenarioError> {
    Color::new(token).map_err(|source| ScenarioError::Color { line, source })
}
