//! Hibernation telemetry aggregation: per-node batches reduce to their
//! arithmetic mean.

use std::collections::HashMap;

use crate::progress::bus::{ProgressBus, TaskProgress};
use crate::task::NodeId;

/// Publishes hibernation progress for one pause/resume task.
pub struct HibernationProgressSink {
    task_id: String,
    bus: ProgressBus,
}

impl HibernationProgressSink {
    pub fn new(task_id: impl Into<String>, bus: ProgressBus) -> Self {
        Self {
            task_id: task_id.into(),
            bus,
        }
    }

    /// Reduces one per-node batch to its mean and publishes it.
    ///
    /// Never blocks: the publish drops when the consumer is behind.
    pub fn observe(&self, batch: Option<&HashMap<NodeId, f64>>, errs: &[String]) {
        let progress = match batch {
            Some(nodes) if !nodes.is_empty() => {
                nodes.values().sum::<f64>() / nodes.len() as f64
            }
            _ => 0.0,
        };

        self.bus.publish(TaskProgress {
            task_id: self.task_id.clone(),
            errs: errs.to_vec(),
            progress_exists: batch.is_some(),
            progress,
        });
    }
}
