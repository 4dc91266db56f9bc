//! # The orchestrator adapter.
//!
//! [`Orchestrator`] mediates between the external cluster supervisor and the
//! internal collaborators. Supervisor RPCs flow through the admission state
//! machine, which validates exclusion rules against the current handle set,
//! launches work on a collaborator, and inserts a handle on success;
//! telemetry flows back through the bounded progress channel.
//!
//! ```text
//!   supervisor RPC ──► admission (registry mutex held) ──► collaborator
//!                                                              │ callback
//!                                                              ▼
//!   TaskRegistry ◄── consumer ◄── ProgressBus (cap 10, drop on full)
//!        │
//!        └── long-poll task_list / current_topology
//! ```
//!
//! ## Exclusion rules
//!
//! | Entry | Rejects when a handle of kind exists |
//! |---|---|
//! | `prepare_topology_change` | Prepared, Rebalance |
//! | `start_topology_change` | Rebalance (requires a Prepared handle) |
//! | `prepare_pause` / `prepare_resume` | Prepared, Rebalance, BucketPause, BucketResume |
//! | `pause` / `resume` | Rebalance, BucketPause, BucketResume |
//!
//! Admission calls collaborators while holding the registry mutex, which
//! serializes admission against telemetry application; collaborators must
//! never call back into the registry synchronously.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapters::{
    ConfigStore, HibernationKind, HibernationManager, HibernationProgressFn, RebalanceMode,
    RebalanceProgressFn, RebalanceTelemetry, Rebalancer, TopologyPlan, TopologySource,
};
use crate::config::Config;
use crate::error::OrchestratorError;
use crate::hooks::{self, DefragmentedUtilization};
use crate::progress::{
    self, HibernationProgressSink, ProgressBus, RebalanceProgressTracker, TaskProgress,
};
use crate::registry::{RegistryGuard, StopAction, TaskHandle, TaskRegistry};
use crate::revision::Revision;
use crate::status::{HibernationStatus, OrchestratorStatus};
use crate::task::{
    NodeId, NodeInfo, PauseParams, ResumeParams, Task, TaskExtra, TaskKind, TaskList, TaskStatus,
    TopologyChange, TopologyChangeKind,
};
use crate::topology::{self, Topology};

/// The internal collaborators the orchestrator drives.
pub struct Collaborators {
    /// Performs partition movement.
    pub rebalancer: Arc<dyn Rebalancer>,
    /// Performs bucket pause/resume against blob storage.
    pub hibernation: Arc<dyn HibernationManager>,
    /// Authoritative current cluster topology.
    pub topology: Arc<dyn TopologySource>,
    /// Node definitions and persisted cluster state.
    pub config_store: Arc<dyn ConfigStore>,
}

/// Adapter between the cluster supervisor and the internal service.
///
/// Create with [`Orchestrator::new`], then call [`Orchestrator::run`] once
/// to start the progress consumer.
pub struct Orchestrator {
    cfg: Config,
    node_info: NodeInfo,
    collab: Collaborators,
    registry: Arc<TaskRegistry>,
    bus: ProgressBus,
    rx: StdMutex<Option<mpsc::Receiver<TaskProgress>>>,
    last_task_list: StdMutex<Option<TaskList>>,
    // Guards only the last-published topology snapshot, so topology reads
    // never contend with task operations.
    last_topology: StdMutex<Option<Topology>>,
}

fn lock_ignoring_poison<T>(mutex: &StdMutex<T>) -> StdMutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Orchestrator {
    /// Creates the orchestrator (call [`Orchestrator::run`] to start it).
    pub fn new(cfg: Config, node_info: NodeInfo, collab: Collaborators) -> Arc<Self> {
        let (bus, rx) = ProgressBus::new(cfg.progress_capacity);
        Arc::new(Self {
            registry: TaskRegistry::new(cfg.wait_timeout),
            bus,
            rx: StdMutex::new(Some(rx)),
            last_task_list: StdMutex::new(None),
            last_topology: StdMutex::new(None),
            cfg,
            node_info,
            collab,
        })
    }

    /// The configuration the orchestrator was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Starts the progress consumer. Later calls are no-ops.
    pub fn run(&self, token: CancellationToken) {
        let Some(rx) = lock_ignoring_poison(&self.rx).take() else {
            return;
        };
        progress::spawn_consumer(self.registry.clone(), rx, token);
    }

    /// Identity of the local service node.
    pub fn node_info(&self) -> &NodeInfo {
        &self.node_info
    }

    /// Terminates the process. No graceful drain of the progress channel is
    /// attempted.
    pub fn shutdown(&self) -> ! {
        tracing::info!("shutdown requested");
        std::process::exit(0);
    }

    // ---- task list ----

    /// Returns the task list, long-polling while `have` matches the current
    /// registry revision.
    ///
    /// # Errors
    /// [`OrchestratorError::BadRevision`] when `have` does not decode,
    /// [`OrchestratorError::Canceled`] when `cancel` fires first.
    pub async fn task_list(
        &self,
        have: Option<&Revision>,
        cancel: &CancellationToken,
    ) -> Result<TaskList, OrchestratorError> {
        let have = have.filter(|r| !r.is_empty());
        let list = self.registry.list(have, cancel).await.map_err(|err| {
            if err != OrchestratorError::Canceled {
                tracing::error!(error = %err, "task list failed");
            }
            err
        })?;

        let changed = {
            let mut last = lock_ignoring_poison(&self.last_task_list);
            let changed = last.as_ref().map_or(true, |prev| prev.tasks != list.tasks);
            *last = Some(list.clone());
            changed
        };
        if changed {
            tracing::debug!(rev = %list.rev, tasks = list.tasks.len(), "task list changed");
        }
        Ok(list)
    }

    /// Cancels the task with the given id, stopping its underlying work and
    /// removing the handle.
    ///
    /// # Errors
    /// [`OrchestratorError::NotFound`] when no handle matches,
    /// [`OrchestratorError::Conflict`] when `rev` is given and stale,
    /// [`OrchestratorError::NotSupported`] when the task is not cancelable.
    pub async fn cancel_task(
        &self,
        id: &str,
        rev: Option<&Revision>,
    ) -> Result<(), OrchestratorError> {
        tracing::info!(task_id = id, "cancel task");
        let mut reg = self.registry.lock().await;

        let Some(handle) = reg.handles().iter().find(|h| h.task.id == id) else {
            tracing::warn!(task_id = id, "cancel task: not found");
            return Err(OrchestratorError::NotFound { id: id.to_string() });
        };
        if let Some(expected) = rev.filter(|r| !r.is_empty()) {
            if *expected != handle.task.rev {
                tracing::warn!(task_id = id, expected = %expected, "cancel task: revision mismatch");
                return Err(OrchestratorError::conflict("task revision mismatch"));
            }
        }
        if !handle.task.is_cancelable {
            return Err(OrchestratorError::NotSupported {
                reason: format!("task {id} is not cancelable"),
            });
        }
        let stop = handle.stop.clone();

        self.dispatch_stop(&stop);

        let id = id.to_string();
        reg.apply(move |handles| handles.retain(|h| h.task.id != id));
        Ok(())
    }

    /// Stop calls are non-blocking and idempotent, so dispatching while the
    /// registry mutex is held is fine.
    fn dispatch_stop(&self, stop: &StopAction) {
        match stop {
            StopAction::None => {}
            StopAction::StopRebalance { topology_rev } => {
                tracing::info!(topology_rev = %topology_rev, "stopping topology change");
                self.collab.rebalancer.stop_change_topology(topology_rev);
            }
            StopAction::StopHibernation { reset_tracking } => {
                tracing::info!(reset_tracking, "stopping hibernation task");
                if *reset_tracking {
                    self.collab.hibernation.reset_bucket_tracked();
                }
                self.collab.hibernation.stop_hibernation_task();
            }
        }
    }

    // ---- topology ----

    /// Returns the current topology, long-polling while `have` matches the
    /// topology source's revision.
    ///
    /// # Errors
    /// [`OrchestratorError::Canceled`] when `cancel` fires first.
    pub async fn current_topology(
        &self,
        have: Option<&Revision>,
        cancel: &CancellationToken,
    ) -> Result<Topology, OrchestratorError> {
        let source = self
            .collab
            .topology
            .wait_topology(have, cancel)
            .await
            .map_err(|err| {
                if err != OrchestratorError::Canceled {
                    tracing::error!(error = %err, "current topology failed");
                }
                err
            })?;

        let balanced = topology::is_balanced(&source, self.collab.rebalancer.as_ref()).await;
        let topo = topology::build(&source, balanced);

        let changed = {
            let mut last = lock_ignoring_poison(&self.last_topology);
            let changed = last.as_ref().map_or(true, |prev| {
                prev.nodes != topo.nodes
                    || prev.is_balanced != topo.is_balanced
                    || prev.messages != topo.messages
            });
            *last = Some(topo.clone());
            changed
        };
        if changed {
            tracing::debug!(rev = %topo.rev, balanced = topo.is_balanced, "topology changed");
        }
        Ok(topo)
    }

    /// Rejects when the caller pinned a topology revision and it is stale.
    /// An absent (or empty) revision means the caller wants to force the
    /// change.
    async fn check_topology_rev(&self, have: Option<&Revision>) -> Result<(), OrchestratorError> {
        let Some(have) = have.filter(|r| !r.is_empty()) else {
            return Ok(());
        };
        let current = self.collab.topology.topology().await.rev;
        if have.as_str() != current {
            tracing::warn!(have = %have, current = %current, "topology revision mismatch");
            return Err(OrchestratorError::conflict("topology revision mismatch"));
        }
        Ok(())
    }

    // ---- topology change admission ----

    /// Admits a prepared topology-change placeholder.
    ///
    /// # Errors
    /// [`OrchestratorError::Conflict`] when a prepared or rebalance task
    /// already exists, or the pinned topology revision is stale.
    pub async fn prepare_topology_change(
        &self,
        change: TopologyChange,
    ) -> Result<(), OrchestratorError> {
        tracing::info!(change_id = %change.id, "prepare topology change");
        let result = self.admit_prepare_topology_change(change).await;
        match &result {
            Ok(()) => self.collab.topology.on_successful_prepare(true),
            Err(err) => {
                tracing::error!(error = %err, "prepare topology change failed");
            }
        }
        result
    }

    async fn admit_prepare_topology_change(
        &self,
        change: TopologyChange,
    ) -> Result<(), OrchestratorError> {
        let mut reg = self.registry.lock().await;

        self.check_topology_rev(change.current_topology_rev.as_ref())
            .await?;

        // Even a finished rebalance or preparation counts as a conflict:
        // the caller must cancel it first.
        if reg
            .handles()
            .iter()
            .any(|h| matches!(h.task.kind, TaskKind::Prepared | TaskKind::Rebalance))
        {
            return Err(OrchestratorError::conflict(
                "existing prepared or rebalance task",
            ));
        }

        let rev = reg.alloc_rev(0);
        let reregister = change
            .keep_nodes
            .iter()
            .any(|n| n.node_id == self.node_info.node_id);
        let task = Task {
            id: format!("prepare:{}", change.id),
            rev: Revision::encode(rev),
            kind: TaskKind::Prepared,
            status: TaskStatus::Running,
            is_cancelable: true,
            // Prepared placeholders are born complete.
            progress: 1.0,
            detailed_progress: BTreeMap::new(),
            description: "prepare topology change".into(),
            error_message: String::new(),
            extra: TaskExtra::TopologyChange(change),
        };
        reg.apply(|handles| handles.push(TaskHandle::new(task, StopAction::None)));

        // The local node stays a member: make sure its definition is still
        // registered upstream.
        if reregister {
            self.collab
                .topology
                .reregister_self(&self.node_info.node_id)
                .await;
        }
        Ok(())
    }

    /// Promotes the prepared placeholder into a running rebalance task.
    ///
    /// # Errors
    /// [`OrchestratorError::Conflict`] when a rebalance is already running
    /// or the pinned topology revision is stale,
    /// [`OrchestratorError::NotFound`] when no prepared task exists,
    /// [`OrchestratorError::NotSupported`] for unknown change types.
    pub async fn start_topology_change(
        &self,
        change: TopologyChange,
    ) -> Result<(), OrchestratorError> {
        tracing::info!(change_id = %change.id, "start topology change");
        let mut reg = self.registry.lock().await;

        self.check_topology_rev(change.current_topology_rev.as_ref())
            .await?;

        if reg
            .handles()
            .iter()
            .any(|h| h.task.kind == TaskKind::Rebalance)
        {
            return Err(OrchestratorError::conflict("rebalance already running"));
        }
        let Some(pos) = reg
            .handles()
            .iter()
            .position(|h| h.task.kind == TaskKind::Prepared)
        else {
            return Err(OrchestratorError::NotFound {
                id: format!("prepare:{}", change.id),
            });
        };

        let mode = match &change.kind {
            TopologyChangeKind::Rebalance => RebalanceMode::Rebalance,
            TopologyChangeKind::Failover => RebalanceMode::FailoverHard,
            TopologyChangeKind::Other(kind) => {
                tracing::warn!(kind = %kind, "unknown topology change type");
                return Err(OrchestratorError::NotSupported {
                    reason: format!("unknown topology change type: {kind}"),
                });
            }
        };
        let plan = TopologyPlan {
            rev: change
                .current_topology_rev
                .as_ref()
                .map(|r| r.as_str().to_string())
                .unwrap_or_default(),
            mode,
            member_node_uuids: change
                .keep_nodes
                .iter()
                .map(|n| n.node_id.as_str().to_string())
                .collect(),
            eject_node_uuids: change
                .eject_nodes
                .iter()
                .map(|n| n.node_id.as_str().to_string())
                .collect(),
        };

        let task_id = format!("rebalance:{}", change.id);
        let tracker = Arc::new(RebalanceProgressTracker::new(
            task_id.clone(),
            self.collab.rebalancer.clone(),
            self.bus.clone(),
        ));
        let on_progress: RebalanceProgressFn =
            Arc::new(move |telemetry: Option<&RebalanceTelemetry>, errs: &[String]| {
                tracker.observe(telemetry, errs)
            });

        self.collab.topology.set_task_orchestrator(true);
        let run = self
            .collab
            .rebalancer
            .change_topology(plan, on_progress)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "start topology change failed");
                err
            })?;

        let rev = reg.alloc_rev(reg.rev_num());
        let task = Task {
            id: task_id,
            rev: Revision::encode(rev),
            kind: TaskKind::Rebalance,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 0.0,
            detailed_progress: BTreeMap::new(),
            description: "topology change".into(),
            error_message: String::new(),
            extra: TaskExtra::TopologyChange(change),
        };
        let handle = TaskHandle::new(
            task,
            StopAction::StopRebalance {
                topology_rev: run.topology_rev,
            },
        );
        reg.apply(move |handles| handles[pos] = handle);

        tracing::info!("topology change started");
        Ok(())
    }

    // ---- hibernation admission ----

    /// Admits a prepared pause placeholder after running the hibernation
    /// manager's prepare phase.
    pub async fn prepare_pause(&self, params: PauseParams) -> Result<(), OrchestratorError> {
        tracing::info!(id = %params.id, bucket = %params.bucket, "prepare pause");
        let result = self.admit_prepare_pause(params).await;
        match &result {
            Ok(()) => self.collab.topology.on_successful_prepare(false),
            Err(err) => tracing::error!(error = %err, "prepare pause failed"),
        }
        result
    }

    async fn admit_prepare_pause(&self, params: PauseParams) -> Result<(), OrchestratorError> {
        let mut reg = self.registry.lock().await;
        check_hibernation_conflicts(&reg, true)?;

        self.collab
            .hibernation
            .prepare_util(
                HibernationKind::Hibernate,
                &params.bucket,
                &params.blob_storage_region,
                params.rate_limit,
                false,
            )
            .await
            .map_err(|err| prepare_phase_error(&params.bucket, &err))?;

        let rev = reg.alloc_rev(0);
        let task = Task {
            id: format!("prepare:{}", params.id),
            rev: Revision::encode(rev),
            kind: TaskKind::Prepared,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 1.0,
            detailed_progress: BTreeMap::new(),
            description: "prepare pause handler".into(),
            error_message: String::new(),
            extra: TaskExtra::PausePrepare(params),
        };
        reg.apply(|handles| {
            handles.push(TaskHandle::new(
                task,
                StopAction::StopHibernation {
                    reset_tracking: false,
                },
            ))
        });
        Ok(())
    }

    /// Admits a prepared resume placeholder after running the hibernation
    /// manager's prepare phase.
    ///
    /// A dry run additionally consults the remote-path validator; an invalid
    /// path admits the handle with status
    /// [`TaskStatus::CannotResume`] instead of failing admission.
    pub async fn prepare_resume(&self, params: ResumeParams) -> Result<(), OrchestratorError> {
        tracing::info!(id = %params.id, bucket = %params.bucket, dry_run = params.dry_run, "prepare resume");
        let result = self.admit_prepare_resume(params).await;
        match &result {
            Ok(()) => self.collab.topology.on_successful_prepare(false),
            Err(err) => tracing::error!(error = %err, "prepare resume failed"),
        }
        result
    }

    async fn admit_prepare_resume(&self, params: ResumeParams) -> Result<(), OrchestratorError> {
        let mut reg = self.registry.lock().await;
        check_hibernation_conflicts(&reg, true)?;

        let rev = reg.alloc_rev(0);

        self.collab
            .hibernation
            .prepare_util(
                HibernationKind::Unhibernate,
                &params.bucket,
                &params.blob_storage_region,
                params.rate_limit,
                params.dry_run,
            )
            .await
            .map_err(|err| prepare_phase_error(&params.bucket, &err))?;

        let mut task = Task {
            id: format!("prepare:{}", params.id),
            rev: Revision::encode(rev),
            kind: TaskKind::Prepared,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 1.0,
            detailed_progress: BTreeMap::new(),
            description: "prepare resume handler".into(),
            error_message: String::new(),
            extra: TaskExtra::ResumePrepare(params.clone()),
        };
        if params.dry_run && !hooks::remote_path_is_valid(&params.remote_path) {
            task.status = TaskStatus::CannotResume;
            task.error_message = "invalid remote path".into();
        }
        reg.apply(|handles| {
            handles.push(TaskHandle::new(
                task,
                StopAction::StopHibernation {
                    reset_tracking: false,
                },
            ))
        });
        Ok(())
    }

    /// Starts a bucket pause.
    ///
    /// # Errors
    /// [`OrchestratorError::Conflict`] when a rebalance or another bucket
    /// pause/resume is running; adapter errors from the hibernation manager.
    pub async fn pause(&self, mut params: PauseParams) -> Result<(), OrchestratorError> {
        tracing::info!(id = %params.id, bucket = %params.bucket, "pause");
        let mut reg = self.registry.lock().await;
        check_hibernation_conflicts(&reg, false)?;

        let kind = HibernationKind::Hibernate;
        let task_id = format!("{}:{}", kind.as_str(), params.id);
        let sink = Arc::new(HibernationProgressSink::new(task_id.clone(), self.bus.clone()));
        let on_progress: HibernationProgressFn =
            Arc::new(move |batch: Option<&HashMap<NodeId, f64>>, errs: &[String]| {
                sink.observe(batch, errs)
            });

        // The stored params carry the decorated path.
        params.remote_path = format!("{}:{}", kind.as_str(), params.remote_path);
        self.collab
            .hibernation
            .start_hibernation(false, &params.bucket, &params.remote_path, kind, on_progress)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "pause failed");
                err
            })?;

        let rev = reg.alloc_rev(reg.rev_num());
        let task = Task {
            id: task_id,
            rev: Revision::encode(rev),
            kind: TaskKind::BucketPause,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 0.0,
            detailed_progress: BTreeMap::new(),
            description: "pause change".into(),
            error_message: String::new(),
            extra: TaskExtra::Pause(params),
        };
        let handle = TaskHandle::new(
            task,
            StopAction::StopHibernation {
                reset_tracking: true,
            },
        );
        // The admitted pause replaces the whole handle set; a leftover
        // prepared placeholder is dropped with it.
        reg.apply(move |handles| {
            handles.clear();
            handles.push(handle);
        });

        tracing::info!("pause started");
        Ok(())
    }

    /// Starts a bucket resume.
    ///
    /// # Errors
    /// [`OrchestratorError::Conflict`] when a rebalance or another bucket
    /// pause/resume is running; adapter errors from the hibernation manager.
    pub async fn resume(&self, mut params: ResumeParams) -> Result<(), OrchestratorError> {
        tracing::info!(id = %params.id, bucket = %params.bucket, dry_run = params.dry_run, "resume");
        let mut reg = self.registry.lock().await;
        check_hibernation_conflicts(&reg, false)?;

        let kind = HibernationKind::Unhibernate;
        let task_id = format!("{}:{}", kind.as_str(), params.id);
        let sink = Arc::new(HibernationProgressSink::new(task_id.clone(), self.bus.clone()));
        let on_progress: HibernationProgressFn =
            Arc::new(move |batch: Option<&HashMap<NodeId, f64>>, errs: &[String]| {
                sink.observe(batch, errs)
            });

        let rev = reg.alloc_rev(reg.rev_num());

        params.remote_path = format!("{}:{}", kind.as_str(), params.remote_path);
        self.collab
            .hibernation
            .start_hibernation(
                params.dry_run,
                &params.bucket,
                &params.remote_path,
                kind,
                on_progress,
            )
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "resume failed");
                err
            })?;

        let task = Task {
            id: task_id,
            rev: Revision::encode(rev),
            kind: TaskKind::BucketResume,
            status: TaskStatus::Running,
            is_cancelable: true,
            progress: 0.0,
            detailed_progress: BTreeMap::new(),
            description: "resume change".into(),
            error_message: String::new(),
            extra: TaskExtra::Resume(params),
        };
        let handle = TaskHandle::new(
            task,
            StopAction::StopHibernation {
                reset_tracking: true,
            },
        );
        reg.apply(move |handles| {
            handles.clear();
            handles.push(handle);
        });

        tracing::info!("resume started");
        Ok(())
    }

    // ---- hooks and status ----

    /// Projects the post-balance utilization via the registered hook, or
    /// `None` when no hook is registered.
    pub async fn defragmented_utilization(
        &self,
    ) -> Result<Option<DefragmentedUtilization>, OrchestratorError> {
        let Some(hook) = hooks::defragmented_utilization_hook() else {
            return Ok(None);
        };
        let defs = self.collab.config_store.node_defs_known().await?;
        hook(&defs).map(Some)
    }

    /// Body of the orchestrator status endpoint.
    pub fn orchestrator_status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            orchestrator: self.collab.topology.is_task_orchestrator(),
            status: "ok",
        }
    }

    /// Body of the hibernation status endpoint.
    pub fn hibernation_status(&self) -> HibernationStatus {
        HibernationStatus {
            plan_phase: self.collab.hibernation.plan_in_progress(),
            task_kind: self
                .collab
                .hibernation
                .active_task_kind()
                .map(|k| k.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Rejects when any existing handle conflicts with a hibernation entry
/// point. Prepare entries also conflict with prepared placeholders; the
/// pause/resume entries allow one (and drop it on admission).
fn check_hibernation_conflicts(
    reg: &RegistryGuard<'_>,
    include_prepared: bool,
) -> Result<(), OrchestratorError> {
    for handle in reg.handles() {
        let kind = handle.task.kind;
        let conflicting = matches!(
            kind,
            TaskKind::Rebalance | TaskKind::BucketPause | TaskKind::BucketResume
        ) || (include_prepared && kind == TaskKind::Prepared);
        if conflicting {
            tracing::warn!(kind = kind.as_label(), "conflicting task");
            return Err(OrchestratorError::conflict(format!(
                "existing {} task",
                kind.as_label()
            )));
        }
    }
    Ok(())
}

fn prepare_phase_error(bucket: &str, err: &OrchestratorError) -> OrchestratorError {
    OrchestratorError::adapter(format!(
        "failed in the prepare phase for bucket {bucket}: {err}"
    ))
}
