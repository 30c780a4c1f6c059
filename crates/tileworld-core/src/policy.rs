//! Decision policy trait and the random baseline.
//!
//! An actor asks its [`DecisionPolicy`] every time it has a choice to make:
//! which way to move, which colour to pick, where to use a tile, how much
//! to offer, whether to accept an offer, and whom to ask for help. The
//! executor's outcome reports flow back through
//! [`DecisionPolicy::notify_outcome`] so a smarter policy can adapt.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tileworld_types::{AgentId, Color, Direction, OperationOutcome};
use tracing::trace;

use crate::config::AgentConfig;

/// Choices an agent actor delegates.
pub trait DecisionPolicy: Send {
    /// Direction for this iteration's MOVE.
    fn choose_move_direction(&mut self) -> Direction;

    /// Colour for this iteration's PICK. `own` is the agent's colour.
    fn choose_pick_color(&mut self, own: &Color) -> Color;

    /// Direction for this iteration's USE_TILE.
    fn choose_use_direction(&mut self) -> Direction;

    /// Points to ask for when `requester` sends a task request.
    fn offer_amount(&mut self, requester: AgentId) -> u64;

    /// Whether to accept `offerer`'s offer of `amount` points.
    fn accept_offer(&mut self, offerer: AgentId, amount: u64) -> bool;

    /// Peer to send a task request to this iteration, if any. `candidates`
    /// are peers with no open negotiation.
    fn choose_request_target(&mut self, candidates: &[AgentId]) -> Option<AgentId>;

    /// Executor report on one of this agent's operations.
    fn notify_outcome(&mut self, outcome: &OperationOutcome);
}

/// Running count of outcome reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Operations the executor applied.
    pub succeeded: u64,
    /// Operations that were rejected.
    pub rejected: u64,
}

/// Uniform random choices over a seedable [`StdRng`].
///
/// Always picks its own colour, always accepts offers, offers a fixed
/// amount, and records outcomes without adapting to them.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
    offer_points: u64,
    request_chance_percent: u8,
    tally: OutcomeTally,
}

impl RandomPolicy {
    /// Policy over an explicit random source.
    pub const fn new(rng: StdRng, settings: &AgentConfig) -> Self {
        Self {
            rng,
            offer_points: settings.offer_points,
            request_chance_percent: settings.request_chance_percent,
            tally: OutcomeTally {
                succeeded: 0,
                rejected: 0,
            },
        }
    }

    /// Policy for one agent. With a run seed, each agent gets
    /// `seed + agent id` so agents do not mirror each other; without one
    /// the source is seeded from the OS.
    pub fn for_agent(agent: AgentId, seed: Option<u64>, settings: &AgentConfig) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, |seed| {
            StdRng::seed_from_u64(seed.wrapping_add(u64::from(agent.into_inner())))
        });
        Self::new(rng, settings)
    }

    /// Outcomes seen so far.
    pub const fn tally(&self) -> OutcomeTally {
        self.tally
    }

    fn any_direction(&mut self) -> Direction {
        Direction::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::North)
    }
}

impl DecisionPolicy for RandomPolicy {
    fn choose_move_direction(&mut self) -> Direction {
        self.any_direction()
    }

    fn choose_pick_color(&mut self, own: &Color) -> Color {
        own.clone()
    }

    fn choose_use_direction(&mut self) -> Direction {
        self.any_direction()
    }

    fn offer_amount(&mut self, _requester: AgentId) -> u64 {
        self.offer_points
    }

    fn accept_offer(&mut self, _offerer: AgentId, _amount: u64) -> bool {
        true
    }

    fn choose_request_target(&mut self, candidates: &[AgentId]) -> Option<AgentId> {
        if self.request_chance_percent == 0 {
            return None;
        }
        if self.rng.random_range(0..100_u8) >= self.request_chance_percent {
            return None;
        }
        candidates.choose(&mut self.rng).copied()
    }

    fn notify_outcome(&mut self, outcome: &OperationOutcome) {
        if outcome.is_success() {
            self.tally.succeeded = self.tally.succeeded.saturating_add(1);
        } else {
            self.tally.rejected = self.tally.rejected.saturating_add(1);
        }
        trace!(
            agent = %outcome.agent_id,
            tick = outcome.tick,
            operation = outcome.kind.label(),
            rejection = ?outcome.rejection(),
            "outcome received"
        );
    }
}
