//! # Telemetry channel between collaborator callbacks and the consumer.
//!
//! [`ProgressBus`] is a thin wrapper around a bounded [`tokio::sync::mpsc`]
//! channel. Publishing never blocks: when the consumer is behind and the
//! channel is full, the update is dropped. Progress is monotone and
//! re-derivable from the aggregator's cache, and terminal error batches are
//! repeated, so a dropped update is recovered by the next one.

use tokio::sync::mpsc;

/// One aggregated progress update for a task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskProgress {
    /// Task the update belongs to.
    pub task_id: String,
    /// Error texts accompanying the telemetry batch.
    pub errs: Vec<String>,
    /// Whether the batch carried telemetry at all. `false` with empty
    /// `errs` marks completion signalling, which the consumer ignores.
    pub progress_exists: bool,
    /// Rolled-up progress in [0, 1].
    pub progress: f64,
}

/// Bounded, drop-on-full channel for [`TaskProgress`] updates.
#[derive(Clone)]
pub struct ProgressBus {
    tx: mpsc::Sender<TaskProgress>,
}

impl ProgressBus {
    /// Creates a bus with the given capacity, returning the consumer end.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TaskProgress>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Publishes an update without blocking.
    ///
    /// If the consumer is behind, the update is dropped rather than holding
    /// up the invoking collaborator.
    pub fn publish(&self, update: TaskProgress) {
        let _ = self.tx.try_send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressBus, TaskProgress};

    fn update(progress: f64) -> TaskProgress {
        TaskProgress {
            task_id: "rebalance:A".into(),
            errs: vec![],
            progress_exists: true,
            progress,
        }
    }

    #[tokio::test]
    async fn publish_drops_when_full() {
        let (bus, mut rx) = ProgressBus::new(2);

        bus.publish(update(0.1));
        bus.publish(update(0.2));
        bus.publish(update(0.3)); // over capacity, dropped

        assert_eq!(rx.recv().await.unwrap().progress, 0.1);
        assert_eq!(rx.recv().await.unwrap().progress, 0.2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_after_drain_succeeds() {
        let (bus, mut rx) = ProgressBus::new(1);

        bus.publish(update(0.1));
        assert_eq!(rx.recv().await.unwrap().progress, 0.1);
        bus.publish(update(0.9));
        assert_eq!(rx.recv().await.unwrap().progress, 0.9);
    }
}
