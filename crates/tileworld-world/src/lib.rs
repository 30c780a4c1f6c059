//! Grid, tiles, holes, and world bootstrap for the Tileworld simulation.
//!
//! This crate models the shared world the agents act on. It knows nothing
//! about threads or queues: the operation executor in `tileworld-core` owns
//! the single [`WorldState`] and is its only writer.
//!
//! # Modules
//!
//! - [`error`] -- Error types for bootstrap and startup-file parsing.
//! - [`state`] -- [`WorldState`] and the per-operation application rules.
//! - [`scenario`] -- Parser for the startup description.
//! - [`render`] -- ASCII grid rendering and the final points report.

pub mod error;
pub mod render;
pub mod scenario;
pub mod state;

// Re-export primary types at crate root.
pub use error::{ScenarioError, WorldError};
pub use render::{AgentScore, points_report, render_grid};
pub use scenario::Scenario;
pub use state::{AgentBody, FILL_BONUS, MATCH_REWARD, WorldState};
