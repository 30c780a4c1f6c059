//! Agent actor.
//!
//! One actor per agent, each running as its own task. An iteration drains
//! outcome reports into the policy, maybe opens a negotiation, submits
//! MOVE, PICK, and USE_TILE, handles at most one mailbox message, and then
//! sleeps. The sleep races the shutdown listener and holds no lock.

use std::time::Duration;

use tileworld_types::{
    AgentId, Color, Message, MessageKind, Operation, OperationOutcome, RejectionReason,
};
use tracing::{debug, info, trace, warn};

use crate::bus::MessageBus;
use crate::control::ShutdownListener;
use crate::negotiation::{Negotiations, Response};
use crate::policy::DecisionPolicy;
use crate::queue::{OperationSubmitter, QueueError};
use crate::registry::AgentInbox;

/// Counters an actor returns when it stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorStats {
    /// The agent.
    pub agent_id: AgentId,
    /// Loop iterations completed.
    pub iterations: u64,
    /// Operations accepted by the queue.
    pub submitted: u64,
    /// Operations the queue refused.
    pub refused: u64,
    /// Mailbox messages handled.
    pub messages_handled: u64,
}

/// One agent's decision loop and negotiation responder.
pub struct AgentActor {
    id: AgentId,
    color: Color,
    inbox: AgentInbox,
    policy: Box<dyn DecisionPolicy>,
    negotiations: Negotiations,
    submitter: OperationSubmitter,
    bus: MessageBus,
    interval: Duration,
    last_tick: u64,
    stats: ActorStats,
}

impl core::fmt::Debug for AgentActor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AgentActor")
            .field("id", &self.id)
            .field("color", &self.color)
            .field("negotiations", &self.negotiations)
            .field("interval", &self.interval)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl AgentActor {
    /// Assemble an actor. `interval` is the pause between iterations.
    pub fn new(
        id: AgentId,
        color: Color,
        inbox: AgentInbox,
        policy: Box<dyn DecisionPolicy>,
        submitter: OperationSubmitter,
        bus: MessageBus,
        interval: Duration,
    ) -> Self {
        Self {
            id,
            color,
            inbox,
            policy,
            negotiations: Negotiations::new(),
            submitter,
            bus,
            interval,
            last_tick: 0,
            stats: ActorStats {
                agent_id: id,
                iterations: 0,
                submitted: 0,
                refused: 0,
                messages_handled: 0,
            },
        }
    }

    /// The agent's id.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Open negotiations.
    pub const fn negotiations(&self) -> &Negotiations {
        &self.negotiations
    }

    /// Counters so far.
    pub const fn stats(&self) -> ActorStats {
        self.stats
    }

    /// Loop until shutdown, then return the counters.
    pub async fn run(mut self, mut shutdown: ShutdownListener) -> ActorStats {
        info!(agent = %self.id, color = %self.color, "agent actor started");
        while !shutdown.is_triggered() {
            self.step();
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = shutdown.wait() => break,
            }
        }
        info!(
            agent = %self.id,
            iterations = self.stats.iterations,
            submitted = self.stats.submitted,
            messages = self.stats.messages_handled,
            "agent actor stopped"
        );
        self.stats
    }

    /// One loop iteration without the trailing sleep.
    pub fn step(&mut self) {
        self.drain_outcomes();
        self.maybe_request_task();

        let direction = self.policy.choose_move_direction();
        self.submit(Operation::move_to(self.id, direction));

        let color = self.policy.choose_pick_color(&self.color);
        self.submit(Operation::pick(self.id, color));

        let direction = self.policy.choose_use_direction();
        self.submit(Operation::use_tile(self.id, direction));

        self.handle_one_message();
        self.stats.iterations = self.stats.iterations.saturating_add(1);
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.inbox.outcomes.try_recv() {
            self.last_tick = self.last_tick.max(outcome.tick);
            self.policy.notify_outcome(&outcome);
        }
    }

    fn maybe_request_task(&mut self) {
        let candidates: Vec<AgentId> = self
            .bus
            .registry()
            .ids()
            .into_iter()
            .filter(|&peer| peer != self.id && self.negotiations.is_idle(peer))
            .collect();
        let Some(peer) = self.policy.choose_request_target(&candidates) else {
            return;
        };
        if !self.negotiations.begin_request(peer) {
            return;
        }
        debug!(agent = %self.id, peer = %peer, "requesting task");
        self.send(peer, MessageKind::RequestTask, "Task Request", 0);
    }

    fn handle_one_message(&mut self) {
        let Ok(message) = self.inbox.mailbox.try_recv() else {
            return;
        };
        self.stats.messages_handled = self.stats.messages_handled.saturating_add(1);
        if message.kind == MessageKind::Unknown {
            trace!(agent = %self.id, message_id = %message.id, "dropping unrecognised message");
            return;
        }
        match self.negotiations.handle(&message, self.policy.as_mut()) {
            Response::Reply {
                kind,
                content,
                points,
            } => self.send(message.sender, kind, content, points),
            Response::Transfer { target, amount } => {
                self.submit(Operation::transfer_points(self.id, target, amount));
            }
            Response::Nothing => {}
        }
    }

    fn send(&self, receiver: AgentId, kind: MessageKind, content: &str, points: u64) {
        let message = Message::new(self.id, receiver, kind, content, points);
        if let Err(err) = self.bus.deliver(message) {
            warn!(agent = %self.id, error = %err, "message not delivered");
        }
    }

    fn submit(&mut self, operation: Operation) {
        let kind = operation.kind.clone();
        match self.submitter.submit(operation) {
            Ok(()) => {
                self.stats.submitted = self.stats.submitted.saturating_add(1);
            }
            Err(QueueError::Full { limit }) => {
                self.stats.refused = self.stats.refused.saturating_add(1);
                trace!(agent = %self.id, operation = kind.label(), limit, "queue full");
                let outcome = OperationOutcome {
                    agent_id: self.id,
                    tick: self.last_tick,
                    kind,
                    result: Err(RejectionReason::QueueFull),
                };
                self.policy.notify_outcome(&outcome);
            }
            Err(QueueError::Closed) => {
                self.stats.refused = self.stats.refused.saturating_add(1);
                debug!(agent = %self.id, operation = kind.label(), "executor stopped");
            }
        }
    }
}
