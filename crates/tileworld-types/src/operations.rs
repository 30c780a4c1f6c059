//! Intents submitted by agents and the outcomes reported back to them.
//!
//! An [`Operation`] is an immutable value created by an agent, pushed onto
//! the operation queue, and consumed exactly once by the executor. The
//! executor answers every operation it applies with an [`OperationOutcome`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Color;
use crate::grid::{Direction, Position};
use crate::ids::AgentId;

/// The requested world mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Step one cell in a direction.
    Move {
        /// Direction of travel.
        direction: Direction,
    },
    /// Pick up a tile of the given colour from the current cell.
    Pick {
        /// Colour to look for.
        color: Color,
    },
    /// Put the carried tile down on the current cell.
    Drop,
    /// Put the carried tile into the hole adjacent in a direction.
    UseTile {
        /// Direction of the hole relative to the agent.
        direction: Direction,
    },
    /// Give points to another agent.
    TransferPoints {
        /// Receiving agent.
        target: AgentId,
        /// Number of points to move.
        amount: u64,
    },
}

impl OperationKind {
    /// Short upper-case label used in logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Move { .. } => "MOVE",
            Self::Pick { .. } => "PICK",
            Self::Drop => "DROP",
            Self::UseTile { .. } => "USE_TILE",
            Self::TransferPoints { .. } => "TRANSFER_POINTS",
        }
    }
}

/// An intent issued by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The issuing agent.
    pub agent_id: AgentId,
    /// What the agent wants to happen.
    pub kind: OperationKind,
    /// When the agent created the intent.
    pub submitted_at: DateTime<Utc>,
}

impl Operation {
    /// Create an operation stamped with the current time.
    pub fn new(agent_id: AgentId, kind: OperationKind) -> Self {
        Self {
            agent_id,
            kind,
            submitted_at: Utc::now(),
        }
    }

    /// `MOVE(direction)`.
    pub fn move_to(agent_id: AgentId, direction: Direction) -> Self {
        Self::new(agent_id, OperationKind::Move { direction })
    }

    /// `PICK(color)`.
    pub fn pick(agent_id: AgentId, color: Color) -> Self {
        Self::new(agent_id, OperationKind::Pick { color })
    }

    /// `DROP`.
    pub fn drop_tile(agent_id: AgentId) -> Self {
        Self::new(agent_id, OperationKind::Drop)
    }

    /// `USE_TILE(direction)`.
    pub fn use_tile(agent_id: AgentId, direction: Direction) -> Self {
        Self::new(agent_id, OperationKind::UseTile { direction })
    }

    /// `TRANSFER_POINTS(target, amount)`.
    pub fn transfer_points(agent_id: AgentId, target: AgentId, amount: u64) -> Self {
        Self::new(agent_id, OperationKind::TransferPoints { target, amount })
    }
}

/// What an applied operation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationEffect {
    /// The agent moved.
    Moved {
        /// Previous position.
        from: Position,
        /// New position.
        to: Position,
    },
    /// The agent took a tile from its cell.
    Picked {
        /// Colour of the picked tile.
        color: Color,
        /// Cell the tile was taken from.
        at: Position,
    },
    /// The agent put its tile down.
    Dropped {
        /// Colour of the dropped tile.
        color: Color,
        /// Cell the tile now lies on.
        at: Position,
    },
    /// The agent used its tile on a hole.
    TileUsed {
        /// Position of the hole.
        hole: Position,
        /// Whether the tile colour matched the hole colour.
        matched: bool,
        /// Points awarded to the agent (0 on a colour mismatch).
        awarded: u64,
        /// Hole depth after the use.
        remaining_depth: u32,
    },
    /// Points moved from the issuing agent to another agent.
    PointsTransferred {
        /// Receiving agent.
        target: AgentId,
        /// Points moved.
        amount: u64,
    },
}

/// Why an operation was not applied.
///
/// These are expected validation failures. They are reported to the issuing
/// agent and otherwise absorbed; the simulation continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is an obstacle.
    Obstacle,
    /// No tile of the requested colour lies on the agent's cell.
    NoMatchingTile,
    /// The agent already carries a tile.
    AlreadyCarrying,
    /// The agent carries nothing to drop or use.
    NothingCarried,
    /// There is no hole in the given direction.
    NoHole,
    /// The hole in the given direction has depth 0.
    HoleFilled,
    /// The agent has fewer points than it tried to transfer.
    InsufficientPoints,
    /// The issuing or target agent id is not registered.
    UnknownAgent,
    /// The transfer target is the issuing agent itself.
    InvalidTarget,
    /// The operation queue is at its configured bound.
    QueueFull,
}

/// The executor's report on one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// The issuing agent.
    pub agent_id: AgentId,
    /// Executor tick the operation was applied in (0 if it never reached the executor).
    pub tick: u64,
    /// The operation as submitted.
    pub kind: OperationKind,
    /// What happened.
    pub result: Result<OperationEffect, RejectionReason>,
}

impl OperationOutcome {
    /// Whether the operation was applied.
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The rejection reason, if the operation failed.
    pub const fn rejection(&self) -> Option<RejectionReason> {
        match self.result {
            Ok(_) => None,
            Err(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_operation_names() {
        let agent = AgentId::new(0);
        assert_eq!(Operation::move_to(agent, Direction::East).kind.label(), "MOVE");
        assert_eq!(Operation::drop_tile(agent).kind.label(), "DROP");
        assert_eq!(
            Operation::transfer_points(agent, AgentId::new(1), 5).kind.label(),
            "TRANSFER_POINTS"
        );
    }

    #[test]
    fn outcome_exposes_rejection() {
        let outcome = OperationOutcome {
            agent_id: AgentId::new(0),
            tick: 4,
            kind: OperationKind::Drop,
            result: Err(RejectionReason::NothingCarried),
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.rejection(), Some(RejectionReason::NothingCarried));
    }

    #[test]
    fn operation_kind_json_shape() {
        let kind = OperationKind::UseTile {
            direction: Direction::South,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"USE_TILE":{"direction":"SOUTH"}}"#);
    }
}
