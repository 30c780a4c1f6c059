//! ASCII grid rendering and the final points report.
//!
//! Cell precedence, lowest first: empty `.`, obstacle `X`, tile (colour
//! initial), hole `H`, agent (colour initial). An agent standing on a cell
//! that already shows a letter is drawn as `*`.

use tileworld_types::{AgentId, Color, Position};

use crate::state::WorldState;

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentScore {
    /// The agent.
    pub id: AgentId,
    /// The agent's colour.
    pub color: Color,
    /// Final point balance.
    pub points: u64,
}

impl core::fmt::Display for AgentScore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Agent {} points: {}", self.color, self.points)
    }
}

/// Render the grid as rows of space-separated cells.
pub fn render_grid(world: &WorldState) -> String {
    let width = usize::try_from(world.width()).unwrap_or(0);
    let height = usize::try_from(world.height()).unwrap_or(0);
    let mut cells = vec![vec!['.'; width]; height];

    for obstacle in world.obstacles() {
        put(&mut cells, obstacle, 'X');
    }
    for (position, tiles) in world.tiles() {
        if let Some(top) = tiles.last() {
            put(&mut cells, position, top.color.initial());
        }
    }
    for (position, _) in world.holes() {
        put(&mut cells, position, 'H');
    }
    for body in world.agents() {
        let position = body.position();
        let occupied = cell(&cells, position).is_some_and(char::is_alphabetic);
        let mark = if occupied { '*' } else { body.color().initial() };
        put(&mut cells, position, mark);
    }

    cells
        .iter()
        .map(|row| {
            row.iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Final points per agent, in id order.
pub fn points_report(world: &WorldState) -> Vec<AgentScore> {
    world
        .agents()
        .map(|body| AgentScore {
            id: body.id(),
            color: body.color().clone(),
            points: body.points(),
        })
        .collect()
}

fn cell(cells: &[Vec<char>], position: Position) -> Option<char> {
    let x = usize::try_from(position.x).ok()?;
    let y = usize::try_from(position.y).ok()?;
    cells.get(y).and_then(|row| row.get(x)).copied()
}

fn put(cells: &mut [Vec<char>], position: Position, mark: char) {
    let (Ok(x), Ok(y)) = (usize::try_from(position.x), usize::try_from(position.y)) else {
        return;
    };
    if let Some(slot) = cells.get_mut(y).and_then(|row| row.get_mut(x)) {
        *slot = mark;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tileworld_types::{Hole, Tile};

    use super::*;
    use crate::state::AgentBody;

    fn color(token: &str) -> Color {
        Color::new(token).unwrap()
    }

    #[test]
    fn renders_every_cell_kind() {
        let mut world = WorldState::new(4, 2).unwrap();
        world.add_obstacle(Position::new(0, 0)).unwrap();
        world
            .add_tile(Position::new(1, 0), Tile::new(color("green")))
            .unwrap();
        world
            .add_hole(Position::new(2, 0), Hole::new(color("red"), 1))
            .unwrap();
        world
            .add_agent(AgentBody::new(AgentId::new(0), color("blue"), Position::new(3, 1)))
            .unwrap();
        world
            .add_agent(AgentBody::new(AgentId::new(1), color("red"), Position::new(2, 0)))
            .unwrap();

        let grid = render_grid(&world);

        assert_eq!(grid, "X g * .\n. . . b");
    }

    #[test]
    fn overlapping_agents_render_as_star() {
        let mut world = WorldState::new(2, 1).unwrap();
        let here = Position::new(1, 0);
        world
            .add_agent(AgentBody::new(AgentId::new(0), color("R"), here))
            .unwrap();
        world
            .add_agent(AgentBody::new(AgentId::new(1), color("G"), here))
            .unwrap();

        assert_eq!(render_grid(&world), ". *");
    }

    #[test]
    fn report_lists_agents_in_id_order() {
        let mut world = WorldState::new(2, 1).unwrap();
        world
            .add_agent(AgentBody::new(AgentId::new(1), color("G"), Position::new(1, 0)))
            .unwrap();
        world
            .add_agent(
                AgentBody::new(AgentId::new(0), color("R"), Position::new(0, 0)).with_points(60),
            )
            .unwrap();

        let lines: Vec<String> = points_report(&world).iter().map(ToString::to_string).collect();

        assert_eq!(lines, vec!["Agent R points: 60", "Agent G points: 0"]);
    }
}
