//! Operation executor: the single writer of world state.
//!
//! The executor owns the [`WorldState`] by value. Nothing else holds a
//! reference to it while the simulation runs, so every mutation is
//! serialized through [`Executor::tick`] without a lock.
//!
//! Each tick pops up to `ops_per_tick` operations, applies them one at a
//! time, hands the tick's outcomes to the [`TickObserver`], and then
//! notifies each issuing agent.

use tileworld_types::{Operation, OperationOutcome, RejectionReason};
use tileworld_world::WorldState;
use tracing::{debug, info, trace, warn};

use crate::clock::{ClockError, TickClock};
use crate::control::ShutdownListener;
use crate::queue::OperationDrain;
use crate::registry::AgentRegistry;

/// Side effect run after every tick, such as printing the grid.
pub trait TickObserver: Send {
    /// Called once per tick with the world after this tick's operations.
    fn on_tick(&mut self, tick: u64, world: &WorldState, outcomes: &[OperationOutcome]);
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl TickObserver for NoOpObserver {
    fn on_tick(&mut self, _tick: u64, _world: &WorldState, _outcomes: &[OperationOutcome]) {}
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number.
    pub tick: u64,
    /// Operations applied successfully.
    pub succeeded: usize,
    /// Operations rejected.
    pub rejected: usize,
    /// Operations still waiting after this tick.
    pub pending: usize,
}

/// Final state handed back when the executor stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorReport {
    /// The world after the last tick.
    pub world: WorldState,
    /// Ticks executed.
    pub ticks: u64,
    /// Operations applied successfully over the run.
    pub succeeded: u64,
    /// Operations rejected over the run.
    pub rejected: u64,
    /// Operations left in the queue.
    pub pending: usize,
}

/// The single consumer of the operation queue.
pub struct Executor {
    world: WorldState,
    drain: OperationDrain,
    registry: AgentRegistry,
    clock: TickClock,
    ops_per_tick: usize,
    observer: Box<dyn TickObserver>,
    succeeded: u64,
    rejected: u64,
}

impl core::fmt::Debug for Executor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Executor")
            .field("clock", &self.clock)
            .field("ops_per_tick", &self.ops_per_tick)
            .field("pending", &self.drain.pending())
            .field("succeeded", &self.succeeded)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Create an executor. `ops_per_tick` below 1 is treated as 1.
    pub fn new(
        world: WorldState,
        drain: OperationDrain,
        registry: AgentRegistry,
        clock: TickClock,
        ops_per_tick: usize,
    ) -> Self {
        Self {
            world,
            drain,
            registry,
            clock,
            ops_per_tick: ops_per_tick.max(1),
            observer: Box::new(NoOpObserver),
            succeeded: 0,
            rejected: 0,
        }
    }

    /// Replace the tick observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn TickObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Read access to the world between ticks.
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Current tick number.
    pub const fn tick_number(&self) -> u64 {
        self.clock.tick()
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter is exhausted.
    pub fn tick(&mut self) -> Result<TickSummary, ClockError> {
        let tick = self.clock.advance()?;

        let mut outcomes = Vec::new();
        while outcomes.len() < self.ops_per_tick {
            let Some(operation) = self.drain.drain() else {
                break;
            };
            outcomes.push(self.execute(tick, &operation));
        }

        let succeeded = outcomes.iter().filter(|outcome| outcome.is_success()).count();
        let rejected = outcomes.len().saturating_sub(succeeded);
        self.succeeded = self.succeeded.saturating_add(count(succeeded));
        self.rejected = self.rejected.saturating_add(count(rejected));

        self.observer.on_tick(tick, &self.world, &outcomes);
        for outcome in outcomes {
            self.notify(outcome);
        }

        Ok(TickSummary {
            tick,
            succeeded,
            rejected,
            pending: self.drain.pending(),
        })
    }

    fn execute(&mut self, tick: u64, operation: &Operation) -> OperationOutcome {
        let result = self.world.apply(operation);
        match &result {
            Ok(effect) => debug!(
                tick,
                agent = %operation.agent_id,
                operation = operation.kind.label(),
                ?effect,
                "operation applied"
            ),
            Err(RejectionReason::UnknownAgent) => warn!(
                tick,
                agent = %operation.agent_id,
                operation = operation.kind.label(),
                "operation names an unknown agent"
            ),
            Err(reason) => trace!(
                tick,
                agent = %operation.agent_id,
                operation = operation.kind.label(),
                ?reason,
                "operation rejected"
            ),
        }
        OperationOutcome {
            agent_id: operation.agent_id,
            tick,
            kind: operation.kind.clone(),
            result,
        }
    }

    fn notify(&self, outcome: OperationOutcome) {
        let agent = outcome.agent_id;
        let Some(handle) = self.registry.get(agent) else {
            warn!(agent = %agent, "no actor registered for outcome");
            return;
        };
        if !handle.notify_outcome(outcome) {
            debug!(agent = %agent, "outcome dropped: actor stopped");
        }
    }

    /// Tick on the clock's interval until shutdown, then hand back the world.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter is exhausted.
    pub async fn run(mut self, mut shutdown: ShutdownListener) -> Result<ExecutorReport, ClockError> {
        info!(
            interval_ms = self.clock.interval().as_millis(),
            ops_per_tick = self.ops_per_tick,
            "executor started"
        );
        loop {
            tokio::select! {
                biased;
                () = shutdown.wait() => break,
                () = tokio::time::sleep(self.clock.interval()) => {}
            }
            self.tick()?;
        }
        let report = ExecutorReport {
            ticks: self.clock.tick(),
            succeeded: self.succeeded,
            rejected: self.rejected,
            pending: self.drain.pending(),
            world: self.world,
        };
        info!(
            ticks = report.ticks,
            succeeded = report.succeeded,
            rejected = report.rejected,
            pending = report.pending,
            "executor stopped"
        );
        Ok(report)
    }
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
