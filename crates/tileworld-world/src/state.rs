//! World state: the grid and everything on it.
//!
//! [`WorldState`] is plain data. It is assembled once at bootstrap through
//! the `add_*` methods and afterwards changed only through [`WorldState::apply`],
//! which the operation executor calls for one operation at a time.
//!
//! Agent bodies (position, points, carried tile) live here rather than in the
//! agent actors, so that every mutation an operation can cause goes through
//! the same single writer.
//!
//! # Scoring
//!
//! Using a tile on a hole of the same colour awards [`MATCH_REWARD`] points,
//! or [`FILL_BONUS`] points when that use brings the hole to depth 0. A
//! mismatched tile still lowers the depth and is consumed, but awards nothing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tileworld_types::{
    AgentId, Color, Direction, Hole, Operation, OperationEffect, OperationKind, Position,
    RejectionReason, Tile,
};

use crate::error::WorldError;

/// Points for a matching tile that leaves the hole open.
pub const MATCH_REWARD: u64 = 10;

/// Points for a matching tile that fills the hole.
pub const FILL_BONUS: u64 = 50;

/// The world-side state of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBody {
    id: AgentId,
    color: Color,
    position: Position,
    points: u64,
    carried: Option<Tile>,
}

impl AgentBody {
    /// Create an agent body with no points and empty hands.
    pub const fn new(id: AgentId, color: Color, position: Position) -> Self {
        Self {
            id,
            color,
            position,
            points: 0,
            carried: None,
        }
    }

    /// Start with a point balance.
    #[must_use]
    pub const fn with_points(mut self, points: u64) -> Self {
        self.points = points;
        self
    }

    /// Start carrying a tile.
    #[must_use]
    pub fn with_carried(mut self, tile: Tile) -> Self {
        self.carried = Some(tile);
        self
    }

    /// The agent's id.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's colour.
    pub const fn color(&self) -> &Color {
        &self.color
    }

    /// Current cell.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current point balance.
    pub const fn points(&self) -> u64 {
        self.points
    }

    /// The carried tile, if any.
    pub const fn carried(&self) -> Option<&Tile> {
        self.carried.as_ref()
    }
}

/// The grid, its obstacles, tiles, holes, and agent bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    width: i32,
    height: i32,
    obstacles: BTreeSet<Position>,
    /// Tiles per cell, in arrival order. A cell with no tiles has no entry.
    tiles: BTreeMap<Position, Vec<Tile>>,
    holes: BTreeMap<Position, Hole>,
    agents: BTreeMap<AgentId, AgentBody>,
}

impl WorldState {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is not positive.
    pub fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        if width <= 0 || height <= 0 {
            return Err(WorldError::InvalidDimensions {
                width: i64::from(width),
                height: i64::from(height),
            });
        }
        Ok(Self {
            width,
            height,
            obstacles: BTreeSet::new(),
            tiles: BTreeMap::new(),
            holes: BTreeMap::new(),
            agents: BTreeMap::new(),
        })
    }

    // -------------------------------------------------------------------
    // Bootstrap
    // -------------------------------------------------------------------

    /// Mark a cell as an obstacle.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the cell is outside the grid.
    pub fn add_obstacle(&mut self, position: Position) -> Result<(), WorldError> {
        self.check_placement(position, false)?;
        self.obstacles.insert(position);
        Ok(())
    }

    /// Put a tile on a cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::OnObstacle`].
    pub fn add_tile(&mut self, position: Position, tile: Tile) -> Result<(), WorldError> {
        self.check_placement(position, true)?;
        self.tiles.entry(position).or_default().push(tile);
        Ok(())
    }

    /// Dig a hole.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`], [`WorldError::OnObstacle`], or
    /// [`WorldError::DuplicateHole`].
    pub fn add_hole(&mut self, position: Position, hole: Hole) -> Result<(), WorldError> {
        self.check_placement(position, true)?;
        if self.holes.contains_key(&position) {
            return Err(WorldError::DuplicateHole(position));
        }
        self.holes.insert(position, hole);
        Ok(())
    }

    /// Place an agent body.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`], [`WorldError::OnObstacle`], or
    /// [`WorldError::DuplicateAgent`].
    pub fn add_agent(&mut self, body: AgentBody) -> Result<(), WorldError> {
        self.check_placement(body.position, true)?;
        if self.agents.contains_key(&body.id) {
            return Err(WorldError::DuplicateAgent(body.id));
        }
        self.agents.insert(body.id, body);
        Ok(())
    }

    fn check_placement(&self, position: Position, reject_obstacle: bool) -> Result<(), WorldError> {
        if !self.in_bounds(position) {
            return Err(WorldError::OutOfBounds(position));
        }
        if reject_obstacle && self.obstacles.contains(&position) {
            return Err(WorldError::OnObstacle(position));
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Grid width.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether a cell lies inside the grid.
    pub const fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height
    }

    /// Whether a cell is an obstacle.
    pub fn is_obstacle(&self, position: Position) -> bool {
        self.obstacles.contains(&position)
    }

    /// All obstacle cells.
    pub fn obstacles(&self) -> impl Iterator<Item = Position> + '_ {
        self.obstacles.iter().copied()
    }

    /// Tiles lying on a cell, in arrival order.
    pub fn tiles_at(&self, position: Position) -> &[Tile] {
        self.tiles.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every cell that holds at least one tile.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &[Tile])> {
        self.tiles.iter().map(|(pos, list)| (*pos, list.as_slice()))
    }

    /// Number of tiles lying on the grid (carried tiles excluded).
    pub fn tile_count(&self) -> usize {
        self.tiles.values().map(Vec::len).sum()
    }

    /// The hole on a cell, if any.
    pub fn hole_at(&self, position: Position) -> Option<&Hole> {
        self.holes.get(&position)
    }

    /// All holes.
    pub fn holes(&self) -> impl Iterator<Item = (Position, &Hole)> {
        self.holes.iter().map(|(pos, hole)| (*pos, hole))
    }

    /// An agent body by id.
    pub fn agent(&self, id: AgentId) -> Option<&AgentBody> {
        self.agents.get(&id)
    }

    /// All agent bodies in id order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentBody> {
        self.agents.values()
    }

    /// Registered agent ids in ascending order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Sum of all agents' points.
    pub fn total_points(&self) -> u64 {
        self.agents
            .values()
            .fold(0_u64, |acc, body| acc.saturating_add(body.points))
    }

    // -------------------------------------------------------------------
    // Operation application
    // -------------------------------------------------------------------

    /// Apply one operation.
    ///
    /// Either the whole effect happens or nothing changes: every rejection is
    /// decided before the first mutation.
    pub fn apply(&mut self, operation: &Operation) -> Result<OperationEffect, RejectionReason> {
        let agent_id = operation.agent_id;
        match &operation.kind {
            OperationKind::Move { direction } => self.apply_move(agent_id, *direction),
            OperationKind::Pick { color } => self.apply_pick(agent_id, color),
            OperationKind::Drop => self.apply_drop(agent_id),
            OperationKind::UseTile { direction } => self.apply_use_tile(agent_id, *direction),
            OperationKind::TransferPoints { target, amount } => {
                self.apply_transfer(agent_id, *target, *amount)
            }
        }
    }

    fn apply_move(
        &mut self,
        agent_id: AgentId,
        direction: Direction,
    ) -> Result<OperationEffect, RejectionReason> {
        let from = self
            .agents
            .get(&agent_id)
            .ok_or(RejectionReason::UnknownAgent)?
            .position;
        let to = from.step(direction).ok_or(RejectionReason::OutOfBounds)?;
        if !self.in_bounds(to) {
            return Err(RejectionReason::OutOfBounds);
        }
        if self.obstacles.contains(&to) {
            return Err(RejectionReason::Obstacle);
        }
        let body = self
            .agents
            .get_mut(&agent_id)
            .ok_or(RejectionReason::UnknownAgent)?;
        body.position = to;
        Ok(OperationEffect::Moved { from, to })
    }

    fn apply_pick(
        &mut self,
        agent_id: AgentId,
        color: &Color,
    ) -> Result<OperationEffect, RejectionReason> {
        let body = self
            .agents
            .get_mut(&agent_id)
            .ok_or(RejectionReason::UnknownAgent)?;
        if body.carried.is_some() {
            return Err(RejectionReason::AlreadyCarrying);
        }
        let at = body.position;
        let list = self
            .tiles
            .get_mut(&at)
            .ok_or(RejectionReason::NoMatchingTile)?;
        let index = list
            .iter()
            .position(|tile| tile.color == *color)
            .ok_or(RejectionReason::NoMatchingTile)?;
        let tile = list.remove(index);
        if list.is_empty() {
            self.tiles.remove(&at);
        }
        let color = tile.color.clone();
        body.carried = Some(tile);
        Ok(OperationEffect::Picked { color, at })
    }

    fn apply_drop(&mut self, agent_id: AgentId) -> Result<OperationEffect, RejectionReason> {
        let body = self
            .agents
            .get_mut(&agent_id)
            .ok_or(RejectionReason::UnknownAgent)?;
        let tile = body.carried.take().ok_or(RejectionReason::NothingCarried)?;
        let at = body.position;
        let color = tile.color.clone();
        self.tiles.entry(at).or_default().push(tile);
        Ok(OperationEffect::Dropped { color, at })
    }

    fn apply_use_tile(
        &mut self,
        agent_id: AgentId,
        direction: Direction,
    ) -> Result<OperationEffect, RejectionReason> {
        let Self { agents, holes, .. } = self;
        let body = agents
            .get_mut(&agent_id)
            .ok_or(RejectionReason::UnknownAgent)?;
        let target = body
            .position
            .step(direction)
            .ok_or(RejectionReason::NoHole)?;
        let hole = holes.get_mut(&target).ok_or(RejectionReason::NoHole)?;
        if hole.is_filled() {
            return Err(RejectionReason::HoleFilled);
        }
        let Some(tile) = body.carried.as_ref() else {
            return Err(RejectionReason::NothingCarried);
        };
        let matched = tile.color == *hole.color();
        let remaining_depth = hole.fill_one().ok_or(RejectionReason::HoleFilled)?;
        body.carried = None;

        let awarded = match (matched, remaining_depth) {
            (false, _) => 0,
            (true, 0) => FILL_BONUS,
            (true, _) => MATCH_REWARD,
        };
        body.points = body.points.saturating_add(awarded);

        Ok(OperationEffect::TileUsed {
            hole: target,
            matched,
            awarded,
            remaining_depth,
        })
    }

    fn apply_transfer(
        &mut self,
        agent_id: AgentId,
        target: AgentId,
        amount: u64,
    ) -> Result<OperationEffect, RejectionReason> {
        if target == agent_id {
            return Err(RejectionReason::InvalidTarget);
        }
        let issuer_points = self
            .agents
            .get(&agent_id)
            .ok_or(RejectionReason::UnknownAgent)?
            .points;
        let target_points = self
            .agents
            .get(&target)
            .ok_or(RejectionReason::UnknownAgent)?
            .points;

        // Both balances are computed before either is written.
        let issuer_after = issuer_points
            .checked_sub(amount)
            .ok_or(RejectionReason::InsufficientPoints)?;
        let target_after = target_points
            .checked_add(amount)
            .ok_or(RejectionReason::InvalidTarget)?;

        if let Some(issuer) = self.agents.get_mut(&agent_id) {
            issuer.points = issuer_after;
        }
        if let Some(receiver) = self.agents.get_mut(&target) {
            receiver.points = target_after;
        }
        Ok(OperationEffect::PointsTransferred { target, amount })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn color(token: &str) -> Color {
        Color::new(token).unwrap()
    }

    fn tile(token: &str) -> Tile {
        Tile::new(color(token))
    }

    const A: AgentId = AgentId(0);
    const B: AgentId = AgentId(1);

    /// 5x5 grid, hole (depth 2, "R") at (3,3), agent 0 at (3,2) carrying an "R" tile.
    fn hole_scenario() -> WorldState {
        let mut world = WorldState::new(5, 5).unwrap();
        world
            .add_hole(Position::new(3, 3), Hole::new(color("R"), 2))
            .unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(3, 2)).with_carried(tile("R")))
            .unwrap();
        world
    }

    fn sorted_colors(world: &WorldState, at: Position) -> Vec<String> {
        let mut colors: Vec<String> = world
            .tiles_at(at)
            .iter()
            .map(|t| t.color.as_str().to_owned())
            .collect();
        colors.sort();
        colors
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(WorldState::new(0, 5).is_err());
        assert!(WorldState::new(5, -1).is_err());
    }

    #[test]
    fn bootstrap_validates_placement() {
        let mut world = WorldState::new(3, 3).unwrap();
        world.add_obstacle(Position::new(1, 1)).unwrap();
        assert!(matches!(
            world.add_tile(Position::new(3, 0), tile("R")),
            Err(WorldError::OutOfBounds(_))
        ));
        assert!(matches!(
            world.add_agent(AgentBody::new(A, color("R"), Position::new(1, 1))),
            Err(WorldError::OnObstacle(_))
        ));
        world
            .add_hole(Position::new(0, 0), Hole::new(color("R"), 1))
            .unwrap();
        assert!(matches!(
            world.add_hole(Position::new(0, 0), Hole::new(color("G"), 1)),
            Err(WorldError::DuplicateHole(_))
        ));
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(2, 2)))
            .unwrap();
        assert!(matches!(
            world.add_agent(AgentBody::new(A, color("G"), Position::new(2, 1))),
            Err(WorldError::DuplicateAgent(_))
        ));
    }

    #[test]
    fn use_tile_on_deep_hole_awards_match_reward() {
        let mut world = hole_scenario();
        let effect = world.apply(&Operation::use_tile(A, Direction::South)).unwrap();

        assert_eq!(
            effect,
            OperationEffect::TileUsed {
                hole: Position::new(3, 3),
                matched: true,
                awarded: MATCH_REWARD,
                remaining_depth: 1,
            }
        );
        assert_eq!(world.hole_at(Position::new(3, 3)).unwrap().depth(), 1);
        let body = world.agent(A).unwrap();
        assert_eq!(body.points(), 10);
        assert!(body.carried().is_none());
    }

    #[test]
    fn filling_the_hole_awards_fill_bonus() {
        let mut world = hole_scenario();
        world.apply(&Operation::use_tile(A, Direction::South)).unwrap();

        // Pick a fresh matching tile from the agent's own cell.
        world.add_tile(Position::new(3, 2), tile("R")).unwrap();
        world.apply(&Operation::pick(A, color("R"))).unwrap();
        let effect = world.apply(&Operation::use_tile(A, Direction::South)).unwrap();

        assert!(matches!(
            effect,
            OperationEffect::TileUsed {
                awarded: FILL_BONUS,
                remaining_depth: 0,
                ..
            }
        ));
        assert_eq!(world.agent(A).unwrap().points(), 10 + 50);
        assert!(world.hole_at(Position::new(3, 3)).unwrap().is_filled());
    }

    #[test]
    fn mismatched_tile_lowers_depth_without_points() {
        let mut world = WorldState::new(5, 5).unwrap();
        world
            .add_hole(Position::new(3, 3), Hole::new(color("R"), 1))
            .unwrap();
        world
            .add_agent(AgentBody::new(A, color("G"), Position::new(3, 2)).with_carried(tile("G")))
            .unwrap();

        let effect = world.apply(&Operation::use_tile(A, Direction::South)).unwrap();

        assert!(matches!(
            effect,
            OperationEffect::TileUsed {
                matched: false,
                awarded: 0,
                remaining_depth: 0,
                ..
            }
        ));
        let body = world.agent(A).unwrap();
        assert_eq!(body.points(), 0);
        assert!(body.carried().is_none());
    }

    #[test]
    fn filled_hole_is_inert() {
        let mut world = WorldState::new(5, 5).unwrap();
        world
            .add_hole(Position::new(3, 3), Hole::new(color("R"), 0))
            .unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(3, 2)).with_carried(tile("R")))
            .unwrap();

        let result = world.apply(&Operation::use_tile(A, Direction::South));

        assert_eq!(result, Err(RejectionReason::HoleFilled));
        assert!(world.agent(A).unwrap().carried().is_some());
    }

    #[test]
    fn use_tile_without_tile_or_hole_fails() {
        let mut world = hole_scenario();
        assert_eq!(
            world.apply(&Operation::use_tile(A, Direction::North)),
            Err(RejectionReason::NoHole)
        );
        world.apply(&Operation::drop_tile(A)).unwrap();
        assert_eq!(
            world.apply(&Operation::use_tile(A, Direction::South)),
            Err(RejectionReason::NothingCarried)
        );
        assert_eq!(world.hole_at(Position::new(3, 3)).unwrap().depth(), 2);
    }

    #[test]
    fn move_respects_bounds_and_obstacles() {
        let mut world = WorldState::new(3, 3).unwrap();
        world.add_obstacle(Position::new(1, 0)).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(0, 0)))
            .unwrap();

        assert_eq!(
            world.apply(&Operation::move_to(A, Direction::North)),
            Err(RejectionReason::OutOfBounds)
        );
        assert_eq!(
            world.apply(&Operation::move_to(A, Direction::East)),
            Err(RejectionReason::Obstacle)
        );
        assert_eq!(
            world.apply(&Operation::move_to(A, Direction::South)),
            Ok(OperationEffect::Moved {
                from: Position::new(0, 0),
                to: Position::new(0, 1),
            })
        );
        assert_eq!(world.agent(A).unwrap().position(), Position::new(0, 1));
    }

    #[test]
    fn pick_takes_first_matching_tile() {
        let mut world = WorldState::new(3, 3).unwrap();
        let here = Position::new(1, 1);
        world.add_tile(here, tile("G")).unwrap();
        world.add_tile(here, tile("R")).unwrap();
        world.add_tile(here, tile("R")).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), here))
            .unwrap();

        world.apply(&Operation::pick(A, color("R"))).unwrap();

        assert_eq!(sorted_colors(&world, here), vec!["G", "R"]);
        assert_eq!(world.agent(A).unwrap().carried(), Some(&tile("R")));
    }

    #[test]
    fn pick_while_carrying_is_rejected() {
        let mut world = WorldState::new(3, 3).unwrap();
        let here = Position::new(1, 1);
        world.add_tile(here, tile("R")).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), here).with_carried(tile("B")))
            .unwrap();

        assert_eq!(
            world.apply(&Operation::pick(A, color("R"))),
            Err(RejectionReason::AlreadyCarrying)
        );
        assert_eq!(world.tile_count(), 1);
        assert_eq!(world.agent(A).unwrap().carried(), Some(&tile("B")));
    }

    #[test]
    fn pick_without_matching_tile_fails() {
        let mut world = WorldState::new(3, 3).unwrap();
        world.add_tile(Position::new(1, 1), tile("G")).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(1, 1)))
            .unwrap();
        assert_eq!(
            world.apply(&Operation::pick(A, color("R"))),
            Err(RejectionReason::NoMatchingTile)
        );
    }

    #[test]
    fn pick_then_drop_restores_original_world() {
        let mut world = WorldState::new(3, 3).unwrap();
        let here = Position::new(2, 2);
        world.add_tile(here, tile("R")).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), here))
            .unwrap();
        let before = world.clone();

        world.apply(&Operation::pick(A, color("R"))).unwrap();
        assert!(world.tiles_at(here).is_empty());
        world.apply(&Operation::drop_tile(A)).unwrap();

        assert_eq!(world, before);
    }

    #[test]
    fn transfer_with_insufficient_points_changes_nothing() {
        let mut world = WorldState::new(3, 3).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(0, 0)).with_points(5))
            .unwrap();
        world
            .add_agent(AgentBody::new(B, color("G"), Position::new(1, 0)))
            .unwrap();

        assert_eq!(
            world.apply(&Operation::transfer_points(A, B, 10)),
            Err(RejectionReason::InsufficientPoints)
        );
        assert_eq!(world.agent(A).unwrap().points(), 5);
        assert_eq!(world.agent(B).unwrap().points(), 0);
    }

    #[test]
    fn transfer_moves_points_between_agents() {
        let mut world = WorldState::new(3, 3).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(0, 0)).with_points(25))
            .unwrap();
        world
            .add_agent(AgentBody::new(B, color("G"), Position::new(1, 0)))
            .unwrap();

        world.apply(&Operation::transfer_points(A, B, 10)).unwrap();

        assert_eq!(world.agent(A).unwrap().points(), 15);
        assert_eq!(world.agent(B).unwrap().points(), 10);
    }

    #[test]
    fn transfer_to_unknown_or_self_is_rejected() {
        let mut world = WorldState::new(3, 3).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(0, 0)).with_points(25))
            .unwrap();
        assert_eq!(
            world.apply(&Operation::transfer_points(A, AgentId(9), 1)),
            Err(RejectionReason::UnknownAgent)
        );
        assert_eq!(
            world.apply(&Operation::transfer_points(A, A, 1)),
            Err(RejectionReason::InvalidTarget)
        );
        assert_eq!(world.agent(A).unwrap().points(), 25);
    }

    #[test]
    fn unknown_issuer_is_rejected() {
        let mut world = WorldState::new(3, 3).unwrap();
        assert_eq!(
            world.apply(&Operation::drop_tile(AgentId(4))),
            Err(RejectionReason::UnknownAgent)
        );
    }

    #[test]
    fn disjoint_operations_commute() {
        let mut world = WorldState::new(6, 6).unwrap();
        world.add_tile(Position::new(0, 0), tile("R")).unwrap();
        world
            .add_agent(AgentBody::new(A, color("R"), Position::new(0, 0)))
            .unwrap();
        world
            .add_agent(AgentBody::new(B, color("G"), Position::new(5, 5)))
            .unwrap();
        let first = Operation::pick(A, color("R"));
        let second = Operation::move_to(B, Direction::West);

        let mut forward = world.clone();
        forward.apply(&first).unwrap();
        forward.apply(&second).unwrap();

        let mut backward = world;
        backward.apply(&second).unwrap();
        backward.apply(&first).unwrap();

        assert_eq!(forward, backward);
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn moves_never_leave_grid_or_enter_obstacles(
            obstacles in prop::collection::vec((0_i32..6, 0_i32..6), 0..10),
            moves in prop::collection::vec(direction_strategy(), 0..64),
        ) {
            let mut world = WorldState::new(6, 6).unwrap();
            for (x, y) in obstacles {
                if (x, y) != (0, 0) {
                    world.add_obstacle(Position::new(x, y)).unwrap();
                }
            }
            world.add_agent(AgentBody::new(A, color("R"), Position::new(0, 0))).unwrap();

            for direction in moves {
                let _ = world.apply(&Operation::move_to(A, direction));
                let at = world.agent(A).unwrap().position();
                prop_assert!(world.in_bounds(at));
                prop_assert!(!world.is_obstacle(at));
            }
        }

        #[test]
        fn pick_then_drop_keeps_colour_multiset(
            palette in prop::collection::vec(prop::sample::select(vec!["R", "G", "B"]), 1..8),
            wanted in prop::sample::select(vec!["R", "G", "B"]),
        ) {
            let here = Position::new(1, 1);
            let mut world = WorldState::new(3, 3).unwrap();
            for token in &palette {
                world.add_tile(here, tile(token)).unwrap();
            }
            world.add_agent(AgentBody::new(A, color(wanted), here)).unwrap();
            let before = sorted_colors(&world, here);

            if world.apply(&Operation::pick(A, color(wanted))).is_ok() {
                world.apply(&Operation::drop_tile(A)).unwrap();
            }

            prop_assert_eq!(sorted_colors(&world, here), before);
        }

        #[test]
        fn hole_depth_is_non_increasing(
            start_depth in 0_u32..5,
            uses in prop::collection::vec(prop::sample::select(vec!["R", "G"]), 0..10),
        ) {
            let hole_at = Position::new(1, 1);
            let mut world = WorldState::new(3, 3).unwrap();
            world.add_hole(hole_at, Hole::new(color("R"), start_depth)).unwrap();
            world.add_agent(AgentBody::new(A, color("R"), Position::new(1, 0))).unwrap();

            let mut last = start_depth;
            for token in uses {
                world.add_tile(Position::new(1, 0), tile(token)).unwrap();
                let _ = world.apply(&Operation::pick(A, color(token)));
                let _ = world.apply(&Operation::use_tile(A, Direction::South));
                let depth = world.hole_at(hole_at).unwrap().depth();
                prop_assert!(depth <= last);
                last = depth;
            }
        }

        #[test]
        fn transfers_conserve_total_points(
            balances in prop::collection::vec(0_u64..100, 2..5),
            transfers in prop::collection::vec((0_u32..5, 0_u32..5, 0_u64..150), 0..32),
        ) {
            let mut world = WorldState::new(10, 10).unwrap();
            for (index, points) in balances.iter().enumerate() {
                let raw = u32::try_from(index).unwrap();
                let body = AgentBody::new(AgentId(raw), color("R"), Position::new(i32::try_from(index).unwrap(), 0))
                    .with_points(*points);
                world.add_agent(body).unwrap();
            }
            let total = world.total_points();

            for (from, to, amount) in transfers {
                let _ = world.apply(&Operation::transfer_points(AgentId(from), AgentId(to), amount));
                prop_assert_eq!(world.total_points(), total);
            }
        }
    }
}
