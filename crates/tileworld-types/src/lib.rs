//! Shared type definitions for the Tileworld simulation.
//!
//! This crate is the single source of truth for the value types that flow
//! between agents, the operation executor, and the world state.
//!
//! # Modules
//!
//! - [`ids`] -- Agent and message identifiers
//! - [`grid`] -- Grid positions and compass directions
//! - [`entities`] -- Colours, tiles, and holes
//! - [`operations`] -- Intents submitted for serialized execution and their outcomes
//! - [`messages`] -- Negotiation messages exchanged between agents

pub mod entities;
pub mod grid;
pub mod ids;
pub mod messages;
pub mod operations;

// Re-export all public types at crate root for convenience.
pub use entities::{Color, Hole, InvalidColor, Tile};
pub use grid::{Direction, Position};
pub use ids::{AgentId, MessageId};
pub use messages::{Message, MessageKind};
pub use operations::{
    Operation, OperationEffect, OperationKind, OperationOutcome, RejectionReason,
};
