//! Multi-producer, single-consumer operation queue.
//!
//! Every agent actor holds a cloned [`OperationSubmitter`]; the executor
//! owns the one [`OperationDrain`]. Submission never blocks. Operations
//! from one submitter keep their order; operations from different
//! submitters interleave in whatever order they reached the channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tileworld_types::Operation;
use tokio::sync::mpsc;

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// A bounded queue already holds `limit` operations.
    #[error("operation queue full ({limit} pending)")]
    Full {
        /// The configured bound.
        limit: usize,
    },

    /// The executor has stopped and dropped its end of the queue.
    #[error("operation queue closed")]
    Closed,
}

/// Create a queue. `max_pending = 0` means unbounded.
pub fn operation_queue(max_pending: usize) -> (OperationSubmitter, OperationDrain) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        OperationSubmitter {
            tx,
            depth: Arc::clone(&depth),
            max_pending,
        },
        OperationDrain { rx, depth },
    )
}

/// Producer handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OperationSubmitter {
    tx: mpsc::UnboundedSender<Operation>,
    depth: Arc<AtomicUsize>,
    max_pending: usize,
}

impl OperationSubmitter {
    /// Enqueue an operation without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when a bounded queue is at capacity and
    /// [`QueueError::Closed`] once the executor has gone away.
    pub fn submit(&self, operation: Operation) -> Result<(), QueueError> {
        self.reserve()?;
        if self.tx.send(operation).is_err() {
            self.release();
            return Err(QueueError::Closed);
        }
        Ok(())
    }

    /// Operations submitted but not yet drained.
    pub fn pending(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    fn reserve(&self) -> Result<(), QueueError> {
        let limit = self.max_pending;
        self.depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| {
                if limit > 0 && depth >= limit {
                    None
                } else {
                    Some(depth.saturating_add(1))
                }
            })
            .map(|_previous| ())
            .map_err(|_current| QueueError::Full { limit })
    }

    fn release(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| {
                Some(depth.saturating_sub(1))
            });
    }
}

/// Consumer handle, owned by the executor.
#[derive(Debug)]
pub struct OperationDrain {
    rx: mpsc::UnboundedReceiver<Operation>,
    depth: Arc<AtomicUsize>,
}

impl OperationDrain {
    /// Pop the oldest operation, or `None` if the queue is empty.
    /// Never waits.
    pub fn drain(&mut self) -> Option<Operation> {
        let operation = self.rx.try_recv().ok()?;
        let _ = self
            .depth
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |depth| {
                Some(depth.saturating_sub(1))
            });
        Some(operation)
    }

    /// Operations waiting to be drained.
    pub fn pending(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use tileworld_types::{AgentId, Direction, OperationKind};

    use super::*;

    fn step(agent: u32, direction: Direction) -> Operation {
        Operation::move_to(AgentId::new(agent), direction)
    }

    #[test]
    fn empty_drain_returns_none() {
        let (_submitter, mut drain) = operation_queue(0);
        assert!(drain.drain().is_none());
        assert_eq!(drain.pending(), 0);
    }

    #[test]
    fn preserves_fifo_for_one_producer() {
        let (submitter, mut drain) = operation_queue(0);
        let sequence = [Direction::North, Direction::East, Direction::South];
        for direction in sequence {
            submitter.submit(step(0, direction)).unwrap();
        }
        assert_eq!(submitter.pending(), 3);

        let drained: Vec<OperationKind> =
            std::iter::from_fn(|| drain.drain()).map(|op| op.kind).collect();
        let expected: Vec<OperationKind> = sequence
            .iter()
            .map(|&direction| OperationKind::Move { direction })
            .collect();
        assert_eq!(drained, expected);
        assert_eq!(drain.pending(), 0);
    }

    #[test]
    fn bounded_queue_rejects_when_full() {
        let (submitter, mut drain) = operation_queue(2);
        submitter.submit(step(0, Direction::North)).unwrap();
        submitter.submit(step(0, Direction::North)).unwrap();
        assert_eq!(
            submitter.submit(step(0, Direction::North)),
            Err(QueueError::Full { limit: 2 })
        );

        drain.drain().unwrap();
        assert!(submitter.submit(step(0, Direction::West)).is_ok());
    }

    #[test]
    fn submit_after_drain_dropped_is_closed() {
        let (submitter, drain) = operation_queue(0);
        drop(drain);
        assert_eq!(
            submitter.submit(step(0, Direction::North)),
            Err(QueueError::Closed)
        );
        assert_eq!(submitter.pending(), 0);
    }

    proptest! {
        #[test]
        fn depth_tracks_submissions_minus_drains(
            bound in 0_usize..6,
            script in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let (submitter, mut drain) = operation_queue(bound);
            let mut expected = 0_usize;
            for submit in script {
                if submit {
                    let accepted = submitter.submit(step(0, Direction::North)).is_ok();
                    prop_assert_eq!(accepted, bound == 0 || expected < bound);
                    if accepted {
                        expected += 1;
                    }
                } else {
                    let popped = drain.drain().is_some();
                    prop_assert_eq!(popped, expected > 0);
                    if popped {
                        expected -= 1;
                    }
                }
                prop_assert_eq!(drain.pending(), expected);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_keep_per_producer_order() {
        const PER_AGENT: usize = 200;
        let (submitter, mut drain) = operation_queue(0);

        let mut tasks = Vec::new();
        for agent in 0..4_u32 {
            let submitter = submitter.clone();
            tasks.push(tokio::spawn(async move {
                for index in 0..PER_AGENT {
                    let direction = if index % 2 == 0 {
                        Direction::North
                    } else {
                        Direction::South
                    };
                    submitter.submit(step(agent, direction)).unwrap();
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut per_agent: BTreeMap<AgentId, Vec<OperationKind>> = BTreeMap::new();
        while let Some(operation) = drain.drain() {
            per_agent
                .entry(operation.agent_id)
                .or_default()
                .push(operation.kind);
        }

        assert_eq!(per_agent.len(), 4);
        for kinds in per_agent.values() {
            assert_eq!(kinds.len(), PER_AGENT);
            for (index, kind) in kinds.iter().enumerate() {
                let direction = if index % 2 == 0 {
                    Direction::North
                } else {
                    Direction::South
                };
                assert_eq!(*kind, OperationKind::Move { direction });
            }
        }
    }
}
