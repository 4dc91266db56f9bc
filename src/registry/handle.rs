//! Registry handles and their stop actions.

use std::time::SystemTime;

use crate::task::Task;

/// How to stop the external work behind a task.
///
/// A tagged variant interpreted by the orchestrator's cancel path instead of
/// a stop closure; the rebalance variant captures the topology revision the
/// run was started against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopAction {
    /// Nothing to stop (prepared topology-change placeholder).
    None,
    /// Stop the topology change started against this revision.
    StopRebalance {
        /// Revision handed back to the rebalancer's stop entry point.
        topology_rev: String,
    },
    /// Stop the in-flight hibernation task.
    StopHibernation {
        /// Also clear the bucket tracked for hibernation (pause/resume
        /// tasks; prepared placeholders leave tracking alone).
        reset_tracking: bool,
    },
}

/// The registry's record of a task: an immutable task value plus the stop
/// action for the underlying external work.
///
/// Handles are replaced, never mutated in place.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    /// When the task was admitted.
    pub start_time: SystemTime,
    /// The task value surfaced to the supervisor.
    pub task: Task,
    /// How to stop the underlying work.
    pub stop: StopAction,
}

impl TaskHandle {
    /// Creates a handle admitted now.
    pub fn new(task: Task, stop: StopAction) -> Self {
        Self {
            start_time: SystemTime::now(),
            task,
            stop,
        }
    }

    /// Produces the replacement handle carrying `task`, preserving the
    /// original start time and stop action.
    pub fn replaced_with(&self, task: Task) -> Self {
        Self {
            start_time: self.start_time,
            task,
            stop: self.stop.clone(),
        }
    }
}
