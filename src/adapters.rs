//! # Seams to the internal collaborators.
//!
//! The orchestrator consumes four collaborators, named by capability:
//!
//! - [`Rebalancer`] — performs partition movement and reports telemetry
//!   through a caller-supplied progress callback.
//! - [`HibernationManager`] — performs bucket pause/resume against blob
//!   storage.
//! - [`TopologySource`] — the authoritative current cluster topology with
//!   its own revision token.
//! - [`ConfigStore`] — node definitions and persisted cluster state.
//!
//! ## Rules
//! - Collaborators must **not** call back into the registry synchronously
//!   from within `change_topology` / `start_hibernation` / `prepare_util`;
//!   those calls run while the registry mutex is held. Progress flows
//!   through the bounded telemetry channel instead.
//! - The `stop_*` entry points must be non-blocking and idempotent; the
//!   cancel path invokes them while holding the registry mutex.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::OrchestratorError;
use crate::revision::Revision;
use crate::task::NodeId;

/// Per-partition catch-up position: the owning feed UUID and its sequence
/// number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeqPosition {
    /// UUID of the feed the sequence number belongs to; empty means the
    /// entry carries no usable sequence data.
    pub uuid: String,
    /// Sequence number within the feed.
    pub seq: u64,
}

/// One unit of rebalance telemetry: the transfer state of a partition index
/// on one node.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferEntry {
    /// Partition index the entry describes.
    pub pindex: String,
    /// Node the partition is building on.
    pub node: NodeId,
    /// Sequence position when the movement started.
    pub init: SeqPosition,
    /// Current sequence position.
    pub curr: SeqPosition,
    /// Target sequence position.
    pub want: SeqPosition,
    /// File transfer progress in [0, 1]; 0 when no file transfer is used.
    pub transfer_progress: f64,
}

/// Nested rebalance telemetry: pindex → source partition → node → entry.
pub type RebalanceTelemetry = HashMap<String, HashMap<String, HashMap<NodeId, TransferEntry>>>;

/// Progress callback handed to [`Rebalancer::change_topology`].
///
/// `None` telemetry signals completion. The returned text is used only by
/// the rebalancer's own logging.
pub type RebalanceProgressFn =
    Arc<dyn Fn(Option<&RebalanceTelemetry>, &[String]) -> String + Send + Sync>;

/// Progress callback handed to [`HibernationManager::start_hibernation`]:
/// a flat node → progress batch plus accompanying errors.
pub type HibernationProgressFn =
    Arc<dyn Fn(Option<&HashMap<NodeId, f64>>, &[String]) + Send + Sync>;

/// Internal form of a topology change, as the rebalancer consumes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyPlan {
    /// The supervisor-visible topology revision the change was based on.
    pub rev: String,
    /// Movement mode.
    pub mode: RebalanceMode,
    /// UUIDs of nodes that are members after the change.
    pub member_node_uuids: Vec<String>,
    /// UUIDs of nodes to eject.
    pub eject_node_uuids: Vec<String>,
}

/// Movement mode of a topology change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceMode {
    /// Full partition rebalance.
    Rebalance,
    /// Hard failover: drop ejected nodes without movement.
    FailoverHard,
}

impl RebalanceMode {
    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            RebalanceMode::Rebalance => "rebalance",
            RebalanceMode::FailoverHard => "failover-hard",
        }
    }
}

/// Handle to a launched topology change; `topology_rev` is what the stop
/// path hands back to [`Rebalancer::stop_change_topology`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalanceRun {
    /// Revision of the topology the run was started against.
    pub topology_rev: String,
}

/// Last-observed state of the rebalancer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceStatus {
    NotStarted,
    Started,
    Finished,
}

/// Performs partition movement.
#[async_trait]
pub trait Rebalancer: Send + Sync {
    /// Launches a topology change. `on_progress` is invoked repeatedly with
    /// telemetry and once with `None` on completion; it must never block.
    async fn change_topology(
        &self,
        plan: TopologyPlan,
        on_progress: RebalanceProgressFn,
    ) -> Result<RebalanceRun, OrchestratorError>;

    /// Stops the change started against `topology_rev`. Non-blocking,
    /// idempotent.
    fn stop_change_topology(&self, topology_rev: &str);

    /// Status of the most recent rebalance run.
    async fn last_rebalance_status(&self) -> Result<RebalanceStatus, OrchestratorError>;

    /// Total number of partition movements planned for the current run.
    ///
    /// Set once per run before the first progress callback; used as the
    /// denominator when per-partition counting under-reports.
    fn moving_partitions_count(&self) -> usize;
}

/// Direction of a hibernation operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HibernationKind {
    /// Pause: write the bucket out to blob storage.
    Hibernate,
    /// Resume: read the bucket back from blob storage.
    Unhibernate,
}

impl HibernationKind {
    /// Wire name; also the task-id phase and the remote-path prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            HibernationKind::Hibernate => "hibernate",
            HibernationKind::Unhibernate => "unhibernate",
        }
    }
}

/// Performs bucket pause/resume against blob storage.
#[async_trait]
pub trait HibernationManager: Send + Sync {
    /// Prepare-phase utility work (tracking, quota, rate-limit setup).
    async fn prepare_util(
        &self,
        kind: HibernationKind,
        bucket: &str,
        region: &str,
        rate_limit: u64,
        dry_run: bool,
    ) -> Result<(), OrchestratorError>;

    /// Launches the pause/resume. `on_progress` is invoked with per-node
    /// batches; it must never block.
    async fn start_hibernation(
        &self,
        dry_run: bool,
        bucket: &str,
        remote_path: &str,
        kind: HibernationKind,
        on_progress: HibernationProgressFn,
    ) -> Result<(), OrchestratorError>;

    /// Stops the in-flight hibernation task. Non-blocking, idempotent.
    fn stop_hibernation_task(&self);

    /// Clears the bucket tracked for hibernation. Non-blocking, idempotent.
    fn reset_bucket_tracked(&self);

    /// Whether a hibernation plan phase is currently underway.
    fn plan_in_progress(&self) -> bool;

    /// Kind of the hibernation task currently underway, if any.
    fn active_task_kind(&self) -> Option<HibernationKind>;
}

/// A member node as reported by the topology source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberNode {
    /// Node UUID.
    pub uuid: String,
}

/// The topology source's own snapshot, from which the supervisor-facing
/// view is derived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceTopology {
    /// The source's revision token, passed through to the supervisor
    /// verbatim.
    pub rev: String,
    /// Member nodes in source order.
    pub member_nodes: Vec<MemberNode>,
    /// Warnings from the previous balance attempt, keyed by resource name.
    pub prev_warnings: HashMap<String, Vec<String>>,
    /// Errors from the previous balance attempt.
    pub prev_errs: Vec<String>,
}

/// Authoritative current cluster topology.
#[async_trait]
pub trait TopologySource: Send + Sync {
    /// Current topology snapshot.
    async fn topology(&self) -> SourceTopology;

    /// Long-polls for a topology whose revision differs from `have_rev`.
    ///
    /// # Errors
    /// [`OrchestratorError::Canceled`] when `cancel` fires first.
    async fn wait_topology(
        &self,
        have_rev: Option<&Revision>,
        cancel: &CancellationToken,
    ) -> Result<SourceTopology, OrchestratorError>;

    /// Re-registers the local node with the configuration store if its
    /// definition went missing.
    async fn reregister_self(&self, node_id: &NodeId);

    /// Notification that a prepare entry point succeeded. Not retryable.
    fn on_successful_prepare(&self, is_topology: bool);

    /// Marks or clears this node as the task orchestrator.
    fn set_task_orchestrator(&self, value: bool);

    /// Whether this node is currently the task orchestrator.
    fn is_task_orchestrator(&self) -> bool;
}

/// One node definition from the configuration store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDef {
    /// Node UUID.
    pub uuid: String,
    /// Host and port the node serves on.
    pub host_port: String,
    /// Placement container path (rack/zone).
    pub container: String,
}

/// The set of node definitions known to the configuration store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeDefs {
    /// Version UUID of the definition set.
    pub uuid: String,
    /// Definitions keyed by node UUID.
    pub node_defs: std::collections::BTreeMap<String, NodeDef>,
}

/// Node definitions and persisted cluster state.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The known node definitions.
    async fn node_defs_known(&self) -> Result<NodeDefs, OrchestratorError>;
}
