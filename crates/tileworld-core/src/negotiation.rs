//! Per-counterpart negotiation state machine.
//!
//! Each actor tracks one [`NegotiationState`] per peer. A peer with no
//! entry is [`NegotiationState::Idle`].
//!
//! | Received | Reply | Next state |
//! |---|---|---|
//! | `REQUEST_TASK` | `OFFER_TASK` with the policy's amount | `OfferSent` |
//! | `OFFER_TASK` | `CONFIRM_TASK` (accepted) or `REJECT_TASK` | `Idle` |
//! | `CONFIRM_TASK`, `REJECT_TASK` | none | `Idle` |
//! | `NEGOTIATE_POINTS` | `TRANSFER_POINTS` operation to the sender | unchanged |
//! | unknown | none | unchanged |

use std::collections::BTreeMap;

use serde::Serialize;
use tileworld_types::{AgentId, Message, MessageKind};
use tracing::debug;

use crate::policy::DecisionPolicy;

/// Where a negotiation with one peer stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum NegotiationState {
    /// Nothing open.
    #[default]
    Idle,
    /// We sent a task request and wait for an offer.
    AwaitingOffer,
    /// We answered a request with an offer of `amount` points.
    OfferSent {
        /// The offered amount.
        amount: u64,
    },
}

/// What the actor should do after handling a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Send a message back to the sender.
    Reply {
        /// Kind of the reply.
        kind: MessageKind,
        /// Free-text content.
        content: &'static str,
        /// Attached points.
        points: u64,
    },
    /// Submit a TRANSFER_POINTS operation.
    Transfer {
        /// Receiver of the points.
        target: AgentId,
        /// Points to move.
        amount: u64,
    },
    /// Nothing to do.
    Nothing,
}

/// Negotiation table of one actor.
#[derive(Debug, Clone, Default)]
pub struct Negotiations {
    open: BTreeMap<AgentId, NegotiationState>,
}

impl Negotiations {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// State with `peer`.
    pub fn state(&self, peer: AgentId) -> NegotiationState {
        self.open.get(&peer).copied().unwrap_or_default()
    }

    /// Whether nothing is open with `peer`.
    pub fn is_idle(&self, peer: AgentId) -> bool {
        !self.open.contains_key(&peer)
    }

    /// Number of open negotiations.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Record an outgoing task request. Returns `false` and changes nothing
    /// if a negotiation with `peer` is already open.
    pub fn begin_request(&mut self, peer: AgentId) -> bool {
        if !self.is_idle(peer) {
            return false;
        }
        self.open.insert(peer, NegotiationState::AwaitingOffer);
        true
    }

    /// Run one incoming message through the state machine.
    pub fn handle(&mut self, message: &Message, policy: &mut dyn DecisionPolicy) -> Response {
        let peer = message.sender;
        match message.kind {
            MessageKind::RequestTask => {
                let amount = policy.offer_amount(peer);
                self.open.insert(peer, NegotiationState::OfferSent { amount });
                debug!(peer = %peer, amount, "offering task");
                Response::Reply {
                    kind: MessageKind::OfferTask,
                    content: "Task Offer",
                    points: amount,
                }
            }
            MessageKind::OfferTask => {
                let amount = message.points;
                let accepted = policy.accept_offer(peer, amount);
                let previous = self.open.remove(&peer).unwrap_or_default();
                debug!(peer = %peer, amount, accepted, ?previous, "answering offer");
                if accepted {
                    Response::Reply {
                        kind: MessageKind::ConfirmTask,
                        content: "Task Confirmed",
                        points: amount,
                    }
                } else {
                    Response::Reply {
                        kind: MessageKind::RejectTask,
                        content: "Task Rejected",
                        points: amount,
                    }
                }
            }
            MessageKind::ConfirmTask | MessageKind::RejectTask => {
                let previous = self.open.remove(&peer).unwrap_or_default();
                debug!(peer = %peer, kind = ?message.kind, ?previous, "negotiation closed");
                Response::Nothing
            }
            MessageKind::NegotiatePoints => {
                debug!(peer = %peer, amount = message.points, "paying negotiated points");
                Response::Transfer {
                    target: peer,
                    amount: message.points,
                }
            }
            MessageKind::Unknown => Response::Nothing,
        }
    }
}
