//! # The task registry: versioned handles with long-poll semantics.
//!
//! All registry state lives behind a single mutex. Every mutation allocates
//! a fresh registry revision and publishes it on a watch channel; long-poll
//! waiters subscribe to the channel *before* releasing the mutex, so a
//! mutation between the revision check and the wait cannot be missed.
//!
//! ```text
//!   admission / progress consumer
//!        │ lock()
//!        ▼
//!   RegistryGuard ── apply(f) ──► revNum = alloc(revNum) ──► watch.send
//!                                                                │
//!   list(haveRev, cancel) ◄── wakes ─────────────────────────────┘
//! ```
//!
//! Waiters re-check the revision after every wakeup and fall back to the
//! current snapshot when the wait timeout elapses.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::OrchestratorError;
use crate::registry::handle::TaskHandle;
use crate::revision::{Revision, RevisionAllocator};
use crate::task::TaskList;

struct RegistryState {
    rev_num: u64,
    alloc: RevisionAllocator,
    handles: Vec<TaskHandle>,
}

/// Ordered collection of task handles with a monotone revision and
/// long-poll wait semantics.
pub struct TaskRegistry {
    wait_timeout: Duration,
    state: Mutex<RegistryState>,
    changed: watch::Sender<u64>,
}

impl TaskRegistry {
    /// Creates an empty registry at revision 0.
    pub fn new(wait_timeout: Duration) -> Arc<Self> {
        let (changed, _rx) = watch::channel(0);
        Arc::new(Self {
            wait_timeout,
            state: Mutex::new(RegistryState {
                rev_num: 0,
                alloc: RevisionAllocator::new(),
                handles: Vec::new(),
            }),
            changed,
        })
    }

    /// Acquires the registry mutex for a compound admission or progress
    /// operation.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            state: self.state.lock().await,
            changed: &self.changed,
        }
    }

    /// Returns the current snapshot without waiting.
    pub async fn snapshot(&self) -> TaskList {
        self.lock().await.snapshot()
    }

    /// Returns the task list, long-polling while `have` matches the current
    /// registry revision.
    ///
    /// Returns immediately when `have` is absent or stale. Otherwise blocks
    /// until the revision changes, `cancel` fires
    /// ([`OrchestratorError::Canceled`]), or the wait timeout elapses — in
    /// which case the *current* snapshot is returned, not an error.
    ///
    /// # Errors
    /// [`OrchestratorError::BadRevision`] when `have` does not decode.
    pub async fn list(
        &self,
        have: Option<&Revision>,
        cancel: &CancellationToken,
    ) -> Result<TaskList, OrchestratorError> {
        let Some(have) = have else {
            return Ok(self.snapshot().await);
        };
        let have_num = have.decode()?;

        let deadline = Instant::now() + self.wait_timeout;
        let mut rx = self.changed.subscribe();
        loop {
            // Subscribe-then-check under the lock: any mutation after the
            // check is observable through `rx`.
            let guard = self.lock().await;
            if guard.rev_num() != have_num {
                return Ok(guard.snapshot());
            }
            drop(guard);

            tokio::select! {
                _ = cancel.cancelled() => return Err(OrchestratorError::Canceled),
                _ = tokio::time::sleep_until(deadline) => {
                    return Ok(self.snapshot().await);
                }
                res = rx.changed() => {
                    if res.is_err() {
                        // Sender lives as long as the registry; treat a
                        // closed channel like a timeout.
                        return Ok(self.snapshot().await);
                    }
                }
            }
        }
    }
}

/// Exclusive access to the registry state.
///
/// Mutations go through [`RegistryGuard::apply`], which allocates the next
/// registry revision and wakes long-poll waiters; everything else is
/// read-only or feeds revisions to task values.
pub struct RegistryGuard<'a> {
    state: MutexGuard<'a, RegistryState>,
    changed: &'a watch::Sender<u64>,
}

impl RegistryGuard<'_> {
    /// Current registry revision number.
    pub fn rev_num(&self) -> u64 {
        self.state.rev_num
    }

    /// Handles in insertion order.
    pub fn handles(&self) -> &[TaskHandle] {
        &self.state.handles
    }

    /// Allocates the next revision number, strictly greater than `prev` and
    /// anything allocated before.
    pub fn alloc_rev(&mut self, prev: u64) -> u64 {
        self.state.alloc.alloc(prev)
    }

    /// Applies `f` to the handle list, bumps the registry revision, and
    /// wakes long-poll waiters.
    pub fn apply(&mut self, f: impl FnOnce(&mut Vec<TaskHandle>)) {
        f(&mut self.state.handles);

        let prev = self.state.rev_num;
        self.state.rev_num = self.state.alloc.alloc(prev);
        self.changed.send_replace(self.state.rev_num);
    }

    /// The task list at the current revision, order preserved.
    pub fn snapshot(&self) -> TaskList {
        TaskList {
            rev: Revision::encode(self.state.rev_num),
            tasks: self.state.handles.iter().map(|h| h.task.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::TaskRegistry;
    use crate::error::OrchestratorError;
    use crate::registry::handle::{StopAction, TaskHandle};
    use crate::revision::Revision;
    use crate::task::{
        Task, TaskExtra, TaskKind, TaskStatus, TopologyChange, TopologyChangeKind,
    };

    fn prepared_task(id: &str, rev: u64) -> Task {
        Task {
            id: format!("prepare:{id}"),
            rev: Revision::encode(rev),
            kind: TaskKind::Prepared,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 1.0,
            detailed_progress: BTreeMap::new(),
            description: "prepare topology change".into(),
            error_message: String::new(),
            extra: TaskExtra::TopologyChange(TopologyChange {
                id: id.into(),
                current_topology_rev: None,
                kind: TopologyChangeKind::Rebalance,
                keep_nodes: vec![],
                eject_nodes: vec![],
            }),
        }
    }

    #[tokio::test]
    async fn snapshot_rev_advances_on_every_mutation() {
        let reg = TaskRegistry::new(Duration::from_secs(20));

        let before = reg.snapshot().await;
        {
            let mut guard = reg.lock().await;
            let rev = guard.alloc_rev(0);
            let task = prepared_task("A", rev);
            guard.apply(|hs| hs.push(TaskHandle::new(task, StopAction::None)));
        }
        let after = reg.snapshot().await;

        assert_ne!(before.rev, after.rev);
        assert!(after.rev.decode().unwrap() > before.rev.decode().unwrap());
        assert_eq!(after.tasks.len(), 1);
    }

    #[tokio::test]
    async fn list_without_have_rev_returns_immediately() {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let cancel = CancellationToken::new();

        let list = reg.list(None, &cancel).await.unwrap();
        assert_eq!(list.rev.decode().unwrap(), 0);
        assert!(list.tasks.is_empty());
    }

    #[tokio::test]
    async fn list_with_stale_rev_returns_immediately() {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let cancel = CancellationToken::new();

        let stale = Revision::encode(7);
        let list = reg.list(Some(&stale), &cancel).await.unwrap();
        assert_eq!(list.rev.decode().unwrap(), 0);
    }

    #[tokio::test]
    async fn list_rejects_malformed_revision() {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let cancel = CancellationToken::new();

        let bad = Revision::from_raw("0x2a");
        let err = reg.list(Some(&bad), &cancel).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::BadRevision { .. }));
    }

    #[tokio::test]
    async fn long_poll_wakes_on_mutation() {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let cancel = CancellationToken::new();
        let current = reg.snapshot().await.rev;

        let waiter = {
            let reg = reg.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { reg.list(Some(&current), &cancel).await })
        };
        tokio::task::yield_now().await;

        {
            let mut guard = reg.lock().await;
            let rev = guard.alloc_rev(0);
            let task = prepared_task("A", rev);
            guard.apply(|hs| hs.push(TaskHandle::new(task, StopAction::None)));
        }

        let list = waiter.await.unwrap().unwrap();
        assert!(list.rev.decode().unwrap() > 0);
        assert_eq!(list.tasks.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn long_poll_times_out_with_current_snapshot() {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let cancel = CancellationToken::new();
        let current = reg.snapshot().await.rev;

        // No mutation ever happens; the waiter must come back with the
        // unchanged snapshot once the timeout elapses.
        let list = reg.list(Some(&current), &cancel).await.unwrap();
        assert_eq!(list.rev, current);
    }

    #[tokio::test]
    async fn long_poll_observes_cancel() {
        let reg = TaskRegistry::new(Duration::from_secs(20));
        let cancel = CancellationToken::new();
        let current = reg.snapshot().await.rev;

        let waiter = {
            let reg = reg.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { reg.list(Some(&current), &cancel).await })
        };
        tokio::task::yield_now().await;
        cancel.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err, OrchestratorError::Canceled);
    }

    #[tokio::test]
    async fn insert_then_remove_restores_contents_with_larger_rev() {
        let reg = TaskRegistry::new(Duration::from_secs(20));

        let baseline = reg.snapshot().await;
        {
            let mut guard = reg.lock().await;
            let rev = guard.alloc_rev(0);
            let task = prepared_task("A", rev);
            guard.apply(|hs| hs.push(TaskHandle::new(task, StopAction::None)));
        }
        {
            let mut guard = reg.lock().await;
            guard.apply(|hs| hs.retain(|h| h.task.id != "prepare:A"));
        }
        let restored = reg.snapshot().await;

        assert_eq!(restored.tasks, baseline.tasks);
        assert!(restored.rev.decode().unwrap() > baseline.rev.decode().unwrap());
    }
}
