//! Concurrency core of the Tileworld simulation.
//!
//! Agents run as independent actor tasks. They never touch the world
//! directly: every intent goes through the [`queue`] to the single
//! [`executor`] task, which owns the [`WorldState`] and applies operations
//! one at a time. Negotiation messages travel point-to-point over the
//! [`bus`], addressed by agent id through the [`registry`].
//!
//! # Modules
//!
//! - [`agent`] -- Agent actor loop.
//! - [`bus`] -- Message delivery by receiver id.
//! - [`clock`] -- Executor tick counter and interval.
//! - [`config`] -- YAML configuration.
//! - [`control`] -- Cooperative shutdown signal.
//! - [`executor`] -- The single writer of world state.
//! - [`negotiation`] -- Per-counterpart negotiation state machine.
//! - [`policy`] -- Pluggable agent decision policy.
//! - [`queue`] -- Multi-producer operation queue.
//! - [`registry`] -- Agent id to actor handle map.
//! - [`runner`] -- Bootstrap, run, and report.
//!
//! [`WorldState`]: tileworld_world::WorldState

pub mod agent;
pub mod bus;
pub mod clock;
pub mod config;
pub mod control;
pub mod executor;
pub mod negotiation;
pub mod policy;
pub mod queue;
pub mod registry;
pub mod runner;

pub use agent::{ActorStats, AgentActor};
pub use bus::{BusError, MessageBus};
pub use clock::{ClockError, TickClock};
pub use config::{ConfigError, SimulationConfig};
pub use control::{ShutdownListener, ShutdownSignal};
pub use executor::{Executor, ExecutorReport, NoOpObserver, TickObserver, TickSummary};
pub use negotiation::{NegotiationState, Negotiations, Response};
pub use policy::{DecisionPolicy, OutcomeTally, RandomPolicy};
pub use queue::{OperationDrain, OperationSubmitter, QueueError, operation_queue};
pub use registry::{AgentHandle, AgentInbox, AgentRegistry, agent_channel};
pub use runner::{RunnerError, Simulation, SimulationReport};
