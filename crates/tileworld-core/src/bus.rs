//! Point-to-point message delivery.
//!
//! The bus resolves a message's receiver through the [`AgentRegistry`] and
//! enqueues it in that actor's mailbox. Delivery returns as soon as the
//! message is enqueued; the receiver handles it on its own schedule.

use tileworld_types::{AgentId, Message};
use tracing::{trace, warn};

use crate::registry::AgentRegistry;

/// Why a message could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// No agent with this id is registered.
    #[error("unknown receiver agent {0}")]
    UnknownReceiver(AgentId),

    /// The receiving actor has stopped.
    #[error("mailbox of agent {0} is closed")]
    MailboxClosed(AgentId),
}

/// Delivers negotiation messages by receiver id.
#[derive(Debug, Clone)]
pub struct MessageBus {
    registry: AgentRegistry,
}

impl MessageBus {
    /// Create a bus over a registry.
    pub const fn new(registry: AgentRegistry) -> Self {
        Self { registry }
    }

    /// Enqueue `message` in its receiver's mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnknownReceiver`] for an unregistered id and
    /// [`BusError::MailboxClosed`] if the receiver has stopped.
    pub fn deliver(&self, message: Message) -> Result<(), BusError> {
        let receiver = message.receiver;
        let Some(handle) = self.registry.get(receiver) else {
            warn!(sender = %message.sender, receiver = %receiver, "message for unknown agent");
            return Err(BusError::UnknownReceiver(receiver));
        };
        trace!(
            message_id = %message.id,
            sender = %message.sender,
            receiver = %receiver,
            kind = ?message.kind,
            points = message.points,
            "delivering message"
        );
        handle.receive(message)
    }

    /// The registry this bus routes through.
    pub const fn registry(&self) -> &AgentRegistry {
        &self.registry
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tileworld_types::{Color, MessageKind};

    use super::*;
    use crate::registry::agent_channel;

    #[test]
    fn delivers_to_exact_receiver() {
        let (zero, mut zero_inbox) = agent_channel(AgentId::new(0), Color::new("R").unwrap());
        let (one, mut one_inbox) = agent_channel(AgentId::new(1), Color::new("G").unwrap());
        let bus = MessageBus::new(AgentRegistry::new([zero, one]));

        let message = Message::new(
            AgentId::new(0),
            AgentId::new(1),
            MessageKind::RequestTask,
            "Task Request",
            0,
        );
        bus.deliver(message.clone()).unwrap();

        assert_eq!(one_inbox.mailbox.try_recv().unwrap(), message);
        assert!(zero_inbox.mailbox.try_recv().is_err());
    }

    #[test]
    fn unknown_receiver_is_an_error() {
        let bus = MessageBus::new(AgentRegistry::default());
        let message = Message::new(
            AgentId::new(0),
            AgentId::new(9),
            MessageKind::OfferTask,
            "Task Offer",
            10,
        );
        assert_eq!(
            bus.deliver(message),
            Err(BusError::UnknownReceiver(AgentId::new(9)))
        );
    }

    #[test]
    fn preserves_fifo_per_sender_receiver_pair() {
        let (handle, mut inbox) = agent_channel(AgentId::new(1), Color::new("G").unwrap());
        let bus = MessageBus::new(AgentRegistry::new([handle]));
        for points in 0..5 {
            let message = Message::new(
                AgentId::new(0),
                AgentId::new(1),
                MessageKind::NegotiatePoints,
                "",
                points,
            );
            bus.deliver(message).unwrap();
        }
        let received: Vec<u64> = std::iter::from_fn(|| inbox.mailbox.try_recv().ok())
            .map(|message| message.points)
            .collect();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }
}
