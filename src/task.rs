//! # Supervisor-facing task model.
//!
//! Tasks are **immutable values**: every mutation produces a replacement
//! carrying a fresh [`Revision`]. The registry stores them inside handles
//! and hands out snapshots as [`TaskList`]s.
//!
//! Task ids are stable strings of the form `"<phase>:<callerID>"` where the
//! phase is one of `prepare`, `rebalance`, `hibernate`, `unhibernate`.
//!
//! The [`TaskExtra`] bag carries the originating request parameters as a
//! tagged variant; the supervisor protocol only ever reads specific
//! variants, so no dynamic map is involved.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::revision::Revision;

/// Identifier of a cluster node (its UUID).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a service node as reported to the supervisor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Node UUID.
    pub node_id: NodeId,
    /// Placement priority relative to other nodes of the service.
    #[serde(default)]
    pub priority: i64,
    /// Service-private blob the supervisor round-trips unchanged.
    #[serde(default)]
    pub opaque: serde_json::Value,
}

impl NodeInfo {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            priority: 0,
            opaque: serde_json::Value::Null,
        }
    }
}

/// Classification of a registry task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Zero-work placeholder proving the caller's intent and reserving
    /// exclusion against competing prepares/rebalances.
    Prepared,
    /// A running topology change (partition movement).
    Rebalance,
    /// A running bucket pause (hibernation to blob storage).
    BucketPause,
    /// A running bucket resume (unhibernation from blob storage).
    BucketResume,
}

impl TaskKind {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskKind::Prepared => "prepared",
            TaskKind::Rebalance => "rebalance",
            TaskKind::BucketPause => "bucket_pause",
            TaskKind::BucketResume => "bucket_resume",
        }
    }
}

/// Execution status of a registry task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task is running (the only status a task is born with, except for the
    /// dry-run resume path).
    Running,
    /// Telemetry delivered at least one error; details are on
    /// `error_message`.
    Failed,
    /// Dry-run resume validation found the remote path invalid.
    CannotResume,
}

/// Kind of topology change requested by the supervisor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyChangeKind {
    /// Move partitions to match the new member set.
    Rebalance,
    /// Drop ejected nodes without data movement.
    Failover,
    /// Forward-compatibility escape hatch; admission rejects it.
    #[serde(untagged)]
    Other(String),
}

/// A topology change request from the supervisor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyChange {
    /// Caller-chosen id; task ids are derived from it.
    pub id: String,
    /// Topology revision the caller based the change on. Absent means the
    /// caller wants to force the change regardless of current topology.
    #[serde(default)]
    pub current_topology_rev: Option<Revision>,
    /// What kind of change this is.
    #[serde(rename = "type")]
    pub kind: TopologyChangeKind,
    /// Nodes that remain members after the change.
    pub keep_nodes: Vec<NodeInfo>,
    /// Nodes to remove from the cluster.
    pub eject_nodes: Vec<NodeInfo>,
}

/// Parameters of a bucket pause (hibernation) request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseParams {
    /// Caller-chosen id; task ids are derived from it.
    pub id: String,
    /// Bucket to pause.
    pub bucket: String,
    /// Blob storage path the bucket data is written to.
    pub remote_path: String,
    /// Blob storage region.
    #[serde(default)]
    pub blob_storage_region: String,
    /// Transfer rate limit in bytes per second (0 = unlimited).
    #[serde(default)]
    pub rate_limit: u64,
}

/// Parameters of a bucket resume (unhibernation) request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeParams {
    /// Caller-chosen id; task ids are derived from it.
    pub id: String,
    /// Bucket to resume.
    pub bucket: String,
    /// Blob storage path the bucket data is read from.
    pub remote_path: String,
    /// Blob storage region.
    #[serde(default)]
    pub blob_storage_region: String,
    /// Transfer rate limit in bytes per second (0 = unlimited).
    #[serde(default)]
    pub rate_limit: u64,
    /// When set, only validate that the resume could succeed.
    #[serde(default)]
    pub dry_run: bool,
}

/// Originating request parameters carried on a task.
///
/// Tagged by the protocol key the supervisor reads the bag under.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TaskExtra {
    #[serde(rename = "topologyChange")]
    TopologyChange(TopologyChange),
    #[serde(rename = "preparePause")]
    PausePrepare(PauseParams),
    #[serde(rename = "prepareResume")]
    ResumePrepare(ResumeParams),
    #[serde(rename = "pause")]
    Pause(PauseParams),
    #[serde(rename = "resume")]
    Resume(ResumeParams),
}

/// An immutable task value as surfaced to the supervisor.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable id of the form `"<phase>:<callerID>"`.
    pub id: String,
    /// Revision at last mutation; unique across the process lifetime.
    pub rev: Revision,
    /// Task classification.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Execution status.
    pub status: TaskStatus,
    /// Whether `CancelTask` may target this task.
    pub is_cancelable: bool,
    /// Progress in [0, 1]. `Prepared` tasks are pinned at 1.0 from birth.
    pub progress: f64,
    /// Per-node progress in [0, 1]; may be empty.
    pub detailed_progress: BTreeMap<NodeId, f64>,
    /// Human-readable description.
    pub description: String,
    /// Newline-joined error texts from telemetry; empty when healthy.
    pub error_message: String,
    /// Originating request parameters.
    pub extra: TaskExtra,
}

/// A versioned snapshot of the task registry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    /// Registry revision the snapshot was taken at.
    pub rev: Revision,
    /// Tasks in insertion order.
    pub tasks: Vec<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_serializes_under_protocol_keys() {
        let params = PauseParams {
            id: "p1".into(),
            bucket: "travel".into(),
            remote_path: "s3://bkt/travel".into(),
            blob_storage_region: "us-east-1".into(),
            rate_limit: 0,
        };
        let json = serde_json::to_value(TaskExtra::PausePrepare(params.clone())).unwrap();
        assert!(json.get("preparePause").is_some());

        let json = serde_json::to_value(TaskExtra::Pause(params)).unwrap();
        assert!(json.get("pause").is_some());
    }

    #[test]
    fn change_kind_keeps_unknown_types() {
        let json = serde_json::json!({
            "id": "A",
            "type": "topology-change-magic",
            "keepNodes": [],
            "ejectNodes": [],
        });
        let change: TopologyChange = serde_json::from_value(json).unwrap();
        assert_eq!(
            change.kind,
            TopologyChangeKind::Other("topology-change-magic".into())
        );
        assert!(change.current_topology_rev.is_none());
    }
}
