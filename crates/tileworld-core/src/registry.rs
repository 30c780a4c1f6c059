//! Agent registry: agent id to actor handle.
//!
//! Built once at bootstrap and never mutated afterwards, so it is shared by
//! [`Arc`] without a lock. A handle carries channel senders only; no actor
//! can reach another actor's state through it.

use std::collections::BTreeMap;
use std::sync::Arc;

use tileworld_types::{AgentId, Color, Message, OperationOutcome};
use tokio::sync::mpsc;

use crate::bus::BusError;

/// Addressing handle for one agent actor.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    id: AgentId,
    color: Color,
    mailbox: mpsc::UnboundedSender<Message>,
    outcomes: mpsc::UnboundedSender<OperationOutcome>,
}

/// Receiving ends owned by the actor itself.
#[derive(Debug)]
pub struct AgentInbox {
    /// Negotiation messages from other agents.
    pub mailbox: mpsc::UnboundedReceiver<Message>,
    /// Executor reports on this agent's operations.
    pub outcomes: mpsc::UnboundedReceiver<OperationOutcome>,
}

/// Create the channels for one agent.
pub fn agent_channel(id: AgentId, color: Color) -> (AgentHandle, AgentInbox) {
    let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    (
        AgentHandle {
            id,
            color,
            mailbox: mailbox_tx,
            outcomes: outcome_tx,
        },
        AgentInbox {
            mailbox: mailbox_rx,
            outcomes: outcome_rx,
        },
    )
}

impl AgentHandle {
    /// The agent's id.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's colour.
    pub const fn color(&self) -> &Color {
        &self.color
    }

    /// Append a message to the agent's mailbox. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::MailboxClosed`] if the actor has stopped.
    pub fn receive(&self, message: Message) -> Result<(), BusError> {
        self.mailbox
            .send(message)
            .map_err(|_err| BusError::MailboxClosed(self.id))
    }

    /// Hand an executor outcome to the agent. Returns `false` if the actor
    /// has stopped.
    pub fn notify_outcome(&self, outcome: OperationOutcome) -> bool {
        self.outcomes.send(outcome).is_ok()
    }
}

/// Read-only id to handle map.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    handles: Arc<BTreeMap<AgentId, AgentHandle>>,
}

impl AgentRegistry {
    /// Build the registry. A later handle with a duplicate id replaces the
    /// earlier one.
    pub fn new(handles: impl IntoIterator<Item = AgentHandle>) -> Self {
        let handles = handles
            .into_iter()
            .map(|handle| (handle.id, handle))
            .collect();
        Self {
            handles: Arc::new(handles),
        }
    }

    /// Look up a handle by id.
    pub fn get(&self, id: AgentId) -> Option<&AgentHandle> {
        self.handles.get(&id)
    }

    /// All registered ids, ascending.
    pub fn ids(&self) -> Vec<AgentId> {
        self.handles.keys().copied().collect()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no agents are registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
