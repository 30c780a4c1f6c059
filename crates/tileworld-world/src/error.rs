//! Error types for the `tileworld-world` crate.
//!
//! Both error types are bootstrap failures. Validation failures of agent
//! operations are not errors; they are [`RejectionReason`] values.
//!
//! [`RejectionReason`]: tileworld_types::RejectionReason

use tileworld_types::{AgentId, InvalidColor, Position};

/// Errors raised while assembling a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Width or height is not positive.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },

    /// An entity was placed outside the grid.
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    /// An entity was placed on an obstacle cell.
    #[error("position {0} is an obstacle")]
    OnObstacle(Position),

    /// A second hole was placed on the same cell.
    #[error("duplicate hole at {0}")]
    DuplicateHole(Position),

    /// An agent id was registered twice.
    #[error("duplicate agent id {0}")]
    DuplicateAgent(AgentId),
}

/// Errors raised while reading the startup description.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read startup description: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A required line is missing.
    #[error("startup description ended before the {what} line")]
    MissingLine {
        /// Which line was expected.
        what: &'static str,
    },

    /// A line could not be parsed.
    #[error("line {line}: {reason}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// A colour token was rejected.
    #[error("line {line}: {source}")]
    Color {
        /// 1-based line number.
        line: usize,
        /// The underlying validation error.
        source: InvalidColor,
    },

    /// The parsed entities do not form a valid world.
    #[error("invalid world: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}
