//! Negotiation messages exchanged directly between agents.
//!
//! Messages travel outside the operation queue, through the message bus,
//! into the receiver's mailbox. Ownership moves from the sender into the
//! mailbox; a message is never shared.

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, MessageId};

/// The negotiation step a message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Ask another agent to take on a task.
    RequestTask,
    /// Offer to do a task for a number of points.
    OfferTask,
    /// Ask the receiver to pay the carried amount to the sender.
    NegotiatePoints,
    /// Accept an offer.
    ConfirmTask,
    /// Decline an offer.
    RejectTask,
    /// Any kind this build does not understand. Receivers drop it.
    #[serde(other)]
    Unknown,
}

/// A negotiation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Correlation id.
    pub id: MessageId,
    /// Sending agent.
    pub sender: AgentId,
    /// Receiving agent.
    pub receiver: AgentId,
    /// Negotiation step.
    pub kind: MessageKind,
    /// Free-text content.
    pub content: String,
    /// Point amount attached to the step.
    pub points: u64,
}

impl Message {
    /// Create a message with a fresh id.
    pub fn new(
        sender: AgentId,
        receiver: AgentId,
        kind: MessageKind,
        content: impl Into<String>,
        points: u64,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            receiver,
            kind,
            content: content.into(),
            points,
        }
    }
}
