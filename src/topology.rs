//! # Supervisor-facing topology view.
//!
//! The view is derived on demand from the [`TopologySource`]'s snapshot:
//! member UUIDs become the node list, the balance flag folds in warnings,
//! errors, and the rebalancer's last-run status, and warning texts are
//! normalized, deduplicated per resource, and sorted.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::adapters::{RebalanceStatus, Rebalancer, SourceTopology};
use crate::revision::Revision;
use crate::task::NodeId;

/// Warnings produced by the balance planner when replica constraints cannot
/// be met come in many per-node variants; they collapse to this one text.
const REPLICA_CONSTRAINT_WARNING: &str = "could not meet replication constraints";

/// A versioned snapshot of cluster membership and balance state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    /// The topology source's revision token, passed through verbatim.
    pub rev: Revision,
    /// Member node UUIDs in source order.
    pub nodes: Vec<NodeId>,
    /// Whether the cluster is balanced and quiet.
    pub is_balanced: bool,
    /// Normalized warnings (sorted) followed by errors (in source order).
    pub messages: Vec<String>,
}

/// Whether the cluster counts as balanced: no warnings, no errors from the
/// previous balance attempt, and no rebalance currently started. A failed
/// status query counts as not balanced.
pub(crate) async fn is_balanced(source: &SourceTopology, rebalancer: &dyn Rebalancer) -> bool {
    if source.prev_warnings.values().any(|w| !w.is_empty()) {
        return false;
    }
    if !source.prev_errs.is_empty() {
        return false;
    }
    !matches!(
        rebalancer.last_rebalance_status().await,
        Err(_) | Ok(RebalanceStatus::Started)
    )
}

/// Builds the supervisor-facing snapshot from the source's.
pub(crate) fn build(source: &SourceTopology, balanced: bool) -> Topology {
    let nodes = source
        .member_nodes
        .iter()
        .map(|n| NodeId::new(n.uuid.clone()))
        .collect();

    let mut messages = Vec::new();
    for (resource, warnings) in &source.prev_warnings {
        let mut aggregate = BTreeSet::new();
        for warning in warnings {
            if warning.starts_with("could not meet constraints") {
                aggregate.insert(REPLICA_CONSTRAINT_WARNING.to_string());
            } else {
                aggregate.insert(warning.clone());
            }
        }
        for warning in aggregate {
            messages.push(format!("warning: resource: {resource:?} -- {warning}"));
        }
    }
    messages.sort();

    for err in &source.prev_errs {
        messages.push(format!("error: {err}"));
    }

    Topology {
        rev: Revision::from_raw(source.rev.clone()),
        nodes,
        is_balanced: balanced,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::{build, is_balanced};
    use crate::adapters::{
        MemberNode, RebalanceProgressFn, RebalanceRun, RebalanceStatus, Rebalancer,
        SourceTopology, TopologyPlan,
    };
    use crate::error::OrchestratorError;

    struct StubRebalancer {
        status: Result<RebalanceStatus, OrchestratorError>,
    }

    #[async_trait]
    impl Rebalancer for StubRebalancer {
        async fn change_topology(
            &self,
            _plan: TopologyPlan,
            _on_progress: RebalanceProgressFn,
        ) -> Result<RebalanceRun, OrchestratorError> {
            Err(OrchestratorError::adapter("stub"))
        }

        fn stop_change_topology(&self, _topology_rev: &str) {}

        async fn last_rebalance_status(&self) -> Result<RebalanceStatus, OrchestratorError> {
            self.status.clone()
        }

        fn moving_partitions_count(&self) -> usize {
            0
        }
    }

    fn source() -> SourceTopology {
        SourceTopology {
            rev: "topo-9".into(),
            member_nodes: vec![
                MemberNode { uuid: "n1".into() },
                MemberNode { uuid: "n2".into() },
            ],
            prev_warnings: HashMap::new(),
            prev_errs: vec![],
        }
    }

    #[tokio::test]
    async fn quiet_cluster_is_balanced() {
        let reb = StubRebalancer {
            status: Ok(RebalanceStatus::NotStarted),
        };
        assert!(is_balanced(&source(), &reb).await);
    }

    #[tokio::test]
    async fn warnings_errors_or_running_rebalance_unbalance() {
        let mut warned = source();
        warned
            .prev_warnings
            .insert("idx".into(), vec!["index corrupt".into()]);
        let reb = StubRebalancer {
            status: Ok(RebalanceStatus::NotStarted),
        };
        assert!(!is_balanced(&warned, &reb).await);

        let mut errored = source();
        errored.prev_errs.push("planner failed".into());
        assert!(!is_balanced(&errored, &reb).await);

        let started = StubRebalancer {
            status: Ok(RebalanceStatus::Started),
        };
        assert!(!is_balanced(&source(), &started).await);

        let failing = StubRebalancer {
            status: Err(OrchestratorError::adapter("status query failed")),
        };
        assert!(!is_balanced(&source(), &failing).await);
    }

    #[tokio::test]
    async fn empty_warning_lists_do_not_unbalance() {
        let mut src = source();
        src.prev_warnings.insert("idx".into(), vec![]);
        let reb = StubRebalancer {
            status: Ok(RebalanceStatus::Finished),
        };
        assert!(is_balanced(&src, &reb).await);
    }

    #[test]
    fn snapshot_carries_nodes_and_source_rev() {
        let topo = build(&source(), true);
        assert_eq!(topo.rev.as_str(), "topo-9");
        assert_eq!(
            topo.nodes.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            vec!["n1", "n2"]
        );
        assert!(topo.is_balanced);
        assert!(topo.messages.is_empty());
    }

    #[test]
    fn warnings_normalize_dedup_and_sort() {
        let mut src = source();
        src.prev_warnings.insert(
            "idx".into(),
            vec![
                "could not meet constraints for N1".into(),
                "could not meet constraints for N2".into(),
                "index corrupt".into(),
            ],
        );

        let topo = build(&src, false);
        assert_eq!(
            topo.messages,
            vec![
                "warning: resource: \"idx\" -- could not meet replication constraints".to_string(),
                "warning: resource: \"idx\" -- index corrupt".to_string(),
            ]
        );
    }

    #[test]
    fn errors_append_after_sorted_warnings() {
        let mut src = source();
        src.prev_warnings
            .insert("idx".into(), vec!["zzz last warning".into()]);
        src.prev_errs.push("a planner error".into());

        let topo = build(&src, false);
        assert_eq!(
            topo.messages,
            vec![
                "warning: resource: \"idx\" -- zzz last warning".to_string(),
                "error: a planner error".to_string(),
            ]
        );
    }
}
