//! # Progress aggregation pipeline.
//!
//! Collaborator callbacks produce [`TaskProgress`] updates onto a bounded
//! [`ProgressBus`]; one dedicated consumer drains the channel and applies
//! each update to the task registry:
//!
//! ```text
//!   rebalancer ──► RebalanceProgressTracker ─┐
//!                                            ├─► ProgressBus ─► consumer ─► TaskRegistry
//!   hibernation ─► HibernationProgressSink ──┘   (cap 10,         │
//!                                                 drop on full)   └─ fresh rev per update
//! ```
//!
//! Callbacks never touch the registry mutex; only the consumer does.

mod bus;
mod hibernation;
mod rebalance;

pub use self::bus::{ProgressBus, TaskProgress};
pub use self::hibernation::HibernationProgressSink;
pub use self::rebalance::RebalanceProgressTracker;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::registry::TaskRegistry;
use crate::revision::Revision;
use crate::task::TaskStatus;

/// Spawns the single consumer that applies progress updates to the
/// registry. Runs until `token` is cancelled or the bus is dropped.
pub(crate) fn spawn_consumer(
    registry: Arc<TaskRegistry>,
    mut rx: mpsc::Receiver<TaskProgress>,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                update = rx.recv() => match update {
                    Some(update) => apply_task_progress(&registry, update).await,
                    None => break,
                }
            }
        }
    });
}

/// Applies one progress update under the registry mutex.
///
/// Updates for unknown task ids drop silently (the task was cancelled in
/// the meantime). Completion signalling — no telemetry, no errors — is a
/// no-op; terminal handle removal is the supervisor's job via cancel.
pub(crate) async fn apply_task_progress(registry: &TaskRegistry, update: TaskProgress) {
    let mut reg = registry.lock().await;

    let Some(pos) = reg
        .handles()
        .iter()
        .position(|h| h.task.id == update.task_id)
    else {
        return;
    };

    if !update.progress_exists && update.errs.is_empty() {
        return;
    }

    let rev = reg.alloc_rev(0);
    let mut task = reg.handles()[pos].task.clone();
    task.rev = Revision::encode(rev);
    task.progress = update.progress;
    task.error_message = update.errs.join("\n");
    if !update.errs.is_empty() {
        task.status = TaskStatus::Failed;
    }

    tracing::debug!(
        task_id = %update.task_id,
        rev,
        progress = update.progress,
        failed = !update.errs.is_empty(),
        "applied task progress"
    );

    let next = reg.handles()[pos].replaced_with(task);
    reg.apply(move |handles| handles[pos] = next);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::{apply_task_progress, TaskProgress};
    use crate::registry::{StopAction, TaskHandle, TaskRegistry};
    use crate::revision::Revision;
    use crate::task::{
        Task, TaskExtra, TaskKind, TaskStatus, TopologyChange, TopologyChangeKind,
    };

    fn rebalance_task(rev: u64) -> Task {
        Task {
            id: "rebalance:A".into(),
            rev: Revision::encode(rev),
            kind: TaskKind::Rebalance,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 0.0,
            detailed_progress: BTreeMap::new(),
            description: "topology change".into(),
            error_message: String::new(),
            extra: TaskExtra::TopologyChange(TopologyChange {
                id: "A".into(),
                current_topology_rev: None,
                kind: TopologyChangeKind::Rebalance,
                keep_nodes: vec![],
                eject_nodes: vec![],
            }),
        }
    }

    async fn registry_with_rebalance() -> std::sync::Arc<TaskRegistry> {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let mut guard = reg.lock().await;
        let rev = guard.alloc_rev(0);
        let task = rebalance_task(rev);
        guard.apply(|hs| {
            hs.push(TaskHandle::new(
                task,
                StopAction::StopRebalance {
                    topology_rev: "7".into(),
                },
            ))
        });
        drop(guard);
        reg
    }

    #[tokio::test]
    async fn progress_update_replaces_handle_with_fresh_rev() {
        let reg = registry_with_rebalance().await;
        let before = reg.snapshot().await;

        apply_task_progress(
            &reg,
            TaskProgress {
                task_id: "rebalance:A".into(),
                errs: vec![],
                progress_exists: true,
                progress: 0.5,
            },
        )
        .await;

        let after = reg.snapshot().await;
        assert_eq!(after.tasks[0].progress, 0.5);
        assert_eq!(after.tasks[0].status, TaskStatus::Running);
        assert!(after.tasks[0].rev.decode().unwrap() > before.tasks[0].rev.decode().unwrap());
        assert!(after.rev.decode().unwrap() > before.rev.decode().unwrap());
    }

    #[tokio::test]
    async fn errors_flip_status_and_join_messages() {
        let reg = registry_with_rebalance().await;

        apply_task_progress(
            &reg,
            TaskProgress {
                task_id: "rebalance:A".into(),
                errs: vec!["n1: feed lost".into(), "n2: disk full".into()],
                progress_exists: true,
                progress: 0.3,
            },
        )
        .await;

        let list = reg.snapshot().await;
        let task = &list.tasks[0];
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.error_message, "n1: feed lost\nn2: disk full");
    }

    #[tokio::test]
    async fn completion_signal_is_a_no_op() {
        let reg = registry_with_rebalance().await;
        let before = reg.snapshot().await;

        apply_task_progress(
            &reg,
            TaskProgress {
                task_id: "rebalance:A".into(),
                errs: vec![],
                progress_exists: false,
                progress: 0.0,
            },
        )
        .await;

        let after = reg.snapshot().await;
        assert_eq!(after.rev, before.rev);
        assert_eq!(after.tasks, before.tasks);
    }

    #[tokio::test]
    async fn unknown_task_id_drops_silently() {
        let reg = registry_with_rebalance().await;
        let before = reg.snapshot().await;

        apply_task_progress(
            &reg,
            TaskProgress {
                task_id: "rebalance:GONE".into(),
                errs: vec!["late error".into()],
                progress_exists: true,
                progress: 0.9,
            },
        )
        .await;

        assert_eq!(reg.snapshot().await.rev, before.rev);
    }
}
