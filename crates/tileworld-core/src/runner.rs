//! Simulation bootstrap and run.
//!
//! [`Simulation::bootstrap`] wires one actor per agent body in the world,
//! the registry and bus that address them, the operation queue, and the
//! executor that takes ownership of the world. [`Simulation::run`] spawns
//! all N+1 tasks, lets them run for the configured total time, signals
//! shutdown, joins every task, and returns the final world.

use std::time::Duration;

use tileworld_types::{AgentId, Color};
use tileworld_world::{AgentScore, WorldState, points_report};
use tokio::task::JoinError;
use tracing::info;

use crate::agent::{ActorStats, AgentActor};
use crate::bus::MessageBus;
use crate::clock::{ClockError, TickClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::control::ShutdownSignal;
use crate::executor::{Executor, TickObserver};
use crate::policy::{DecisionPolicy, RandomPolicy};
use crate::queue::{OperationSubmitter, operation_queue};
use crate::registry::{AgentRegistry, agent_channel};

/// Errors that can occur while bootstrapping or running.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The executor clock failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The configuration is out of range.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A spawned task panicked or was cancelled.
    #[error("{task} task failed: {source}")]
    Join {
        /// Which task.
        task: &'static str,
        /// The join failure.
        source: JoinError,
    },
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// The world after the last tick.
    pub world: WorldState,
    /// Executor ticks completed.
    pub ticks: u64,
    /// Operations applied successfully.
    pub succeeded: u64,
    /// Operations rejected.
    pub rejected: u64,
    /// Operations still queued at shutdown.
    pub pending: usize,
    /// Per-actor counters, in id order.
    pub actors: Vec<ActorStats>,
}

impl SimulationReport {
    /// Final points per agent, in id order.
    pub fn scores(&self) -> Vec<AgentScore> {
        points_report(&self.world)
    }
}

/// A wired but not yet running simulation.
#[derive(Debug)]
pub struct Simulation {
    executor: Executor,
    actors: Vec<AgentActor>,
    submitter: OperationSubmitter,
    bus: MessageBus,
    shutdown: ShutdownSignal,
}

impl Simulation {
    /// Wire a simulation with a [`RandomPolicy`] per agent.
    ///
    /// `tick_interval` is the executor's period (the startup description's
    /// `operationTime`).
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] if `config` fails validation and
    /// [`RunnerError::Clock`] if `tick_interval` is zero.
    pub fn bootstrap(
        world: WorldState,
        tick_interval: Duration,
        config: &SimulationConfig,
    ) -> Result<Self, RunnerError> {
        let seed = config.simulation.seed;
        let agents = config.agents.clone();
        Self::bootstrap_with_policies(world, tick_interval, config, move |id, _color| -> Box<dyn DecisionPolicy> {
            Box::new(RandomPolicy::for_agent(id, seed, &agents))
        })
    }

    /// Wire a simulation with a caller-supplied policy per agent.
    ///
    /// # Errors
    ///
    /// Same as [`bootstrap`](Self::bootstrap).
    pub fn bootstrap_with_policies<F>(
        world: WorldState,
        tick_interval: Duration,
        config: &SimulationConfig,
        mut make_policy: F,
    ) -> Result<Self, RunnerError>
    where
        F: FnMut(AgentId, &Color) -> Box<dyn DecisionPolicy>,
    {
        config.validate()?;
        let clock = TickClock::new(tick_interval)?;
        let action_interval = Duration::from_millis(config.agents.action_interval_ms);

        let mut handles = Vec::new();
        let mut inboxes = Vec::new();
        for body in world.agents() {
            let (handle, inbox) = agent_channel(body.id(), body.color().clone());
            handles.push(handle);
            inboxes.push((body.id(), body.color().clone(), inbox));
        }
        let registry = AgentRegistry::new(handles);
        let bus = MessageBus::new(registry.clone());
        let (submitter, drain) = operation_queue(config.executor.max_pending);

        let actors = inboxes
            .into_iter()
            .map(|(id, color, inbox)| {
                let policy = make_policy(id, &color);
                AgentActor::new(
                    id,
                    color,
                    inbox,
                    policy,
                    submitter.clone(),
                    bus.clone(),
                    action_interval,
                )
            })
            .collect::<Vec<_>>();

        info!(
            agents = actors.len(),
            width = world.width(),
            height = world.height(),
            tick_interval_ms = tick_interval.as_millis(),
            action_interval_ms = config.agents.action_interval_ms,
            seeded = config.simulation.seed.is_some(),
            "simulation bootstrapped"
        );

        let executor = Executor::new(world, drain, registry, clock, config.executor.ops_per_tick);
        Ok(Self {
            executor,
            actors,
            submitter,
            bus,
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Install a per-tick side effect on the executor.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn TickObserver>) -> Self {
        self.executor = self.executor.with_observer(observer);
        self
    }

    /// A bus handle for delivering messages from outside any actor.
    pub fn bus(&self) -> MessageBus {
        self.bus.clone()
    }

    /// A queue handle for submitting operations from outside any actor.
    pub fn submitter(&self) -> OperationSubmitter {
        self.submitter.clone()
    }

    /// The world as bootstrapped.
    pub const fn world(&self) -> &WorldState {
        self.executor.world()
    }

    /// Spawn every actor and the executor, run for `total_time`, stop them,
    /// and collect the result.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Join`] if a task panicked and
    /// [`RunnerError::Clock`] if the executor's tick counter overflowed.
    pub async fn run(self, total_time: Duration) -> Result<SimulationReport, RunnerError> {
        let Self {
            executor,
            actors,
            shutdown,
            ..
        } = self;

        info!(
            total_time_ms = total_time.as_millis(),
            actors = actors.len(),
            "simulation starting"
        );
        let executor_task = tokio::spawn(executor.run(shutdown.subscribe()));
        let actor_tasks: Vec<_> = actors
            .into_iter()
            .map(|actor| tokio::spawn(actor.run(shutdown.subscribe())))
            .collect();

        tokio::time::sleep(total_time).await;
        shutdown.trigger();
        info!("shutdown signalled");

        let mut actor_stats = Vec::with_capacity(actor_tasks.len());
        for task in actor_tasks {
            let stats = task
                .await
                .map_err(|source| RunnerError::Join { task: "agent", source })?;
            actor_stats.push(stats);
        }
        let executor_report = executor_task
            .await
            .map_err(|source| RunnerError::Join {
                task: "executor",
                source,
            })??;

        info!(
            ticks = executor_report.ticks,
            succeeded = executor_report.succeeded,
            rejected = executor_report.rejected,
            pending = executor_report.pending,
            total_points = executor_report.world.total_points(),
            "simulation finished"
        );
        Ok(SimulationReport {
            world: executor_report.world,
            ticks: executor_report.ticks,
            succeeded: executor_report.succeeded,
            rejected: executor_report.rejected,
            pending: executor_report.pending,
            actors: actor_stats,
        })
    }
}
