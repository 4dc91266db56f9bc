//! # clustervisor
//!
//! **Clustervisor** is a cluster task orchestration adapter library.
//!
//! It mediates between an external cluster-management supervisor and an
//! internal search/index service: coarse lifecycle commands (prepare a
//! topology change, start a rebalance, pause or resume a bucket, cancel a
//! task, query topology) are validated against exclusion rules, launched on
//! internal collaborators, and surfaced back as a versioned, long-pollable
//! task list.
//!
//! ## Features
//!
//! | Area | Description | Key types / traits |
//! |------|-------------|--------------------|
//! | **Task registry** | Versioned task handles with long-poll wait semantics. | [`TaskRegistry`], [`TaskList`], [`Revision`] |
//! | **Admission** | Conflict rules between prepares, rebalances, and bucket pause/resume. | [`Orchestrator`] |
//! | **Progress** | Non-blocking telemetry aggregation with bounded backpressure. | [`RebalanceProgressTracker`], [`HibernationProgressSink`] |
//! | **Topology** | Long-pollable cluster membership and balance snapshot. | [`Topology`] |
//! | **Collaborators** | Seams to the rebalancer, hibernation manager, topology source, and config store. | [`Rebalancer`], [`HibernationManager`], [`TopologySource`], [`ConfigStore`] |
//! | **Errors** | Tagged error kinds for the supervisor RPC surface. | [`OrchestratorError`] |
//!
//! ## Example
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use clustervisor::{Collaborators, Config, NodeId, NodeInfo, Orchestrator};
//! # fn collaborators() -> Collaborators { unimplemented!() }
//!
//! # async fn demo() -> Result<(), clustervisor::OrchestratorError> {
//! let orch = Orchestrator::new(
//!     Config::default(),
//!     NodeInfo::new(NodeId::new("local-node-uuid")),
//!     collaborators(),
//! );
//!
//! // Start the progress consumer, then serve supervisor RPCs.
//! let token = CancellationToken::new();
//! orch.run(token.clone());
//!
//! let cancel = CancellationToken::new();
//! let tasks = orch.task_list(None, &cancel).await?;
//! println!("tasks at rev {}: {}", tasks.rev, tasks.tasks.len());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod orchestrator;
mod progress;
mod registry;
mod revision;
mod status;
mod task;
mod topology;

pub mod adapters;
pub mod hooks;

// ---- Public re-exports ----

pub use adapters::{
    ConfigStore, HibernationKind, HibernationManager, HibernationProgressFn, MemberNode, NodeDef,
    NodeDefs, RebalanceMode, RebalanceProgressFn, RebalanceRun, RebalanceStatus,
    RebalanceTelemetry, Rebalancer, SeqPosition, SourceTopology, TopologyPlan, TopologySource,
    TransferEntry,
};
pub use config::Config;
pub use error::OrchestratorError;
pub use hooks::DefragmentedUtilization;
pub use orchestrator::{Collaborators, Orchestrator};
pub use progress::{HibernationProgressSink, ProgressBus, RebalanceProgressTracker, TaskProgress};
pub use registry::{StopAction, TaskHandle, TaskRegistry};
pub use revision::Revision;
pub use status::{HibernationStatus, OrchestratorStatus};
pub use task::{
    NodeId, NodeInfo, PauseParams, ResumeParams, Task, TaskExtra, TaskKind, TaskList, TaskStatus,
    TopologyChange, TopologyChangeKind,
};
pub use topology::Topology;
