//! JSON payloads for the orchestrator and hibernation status endpoints.
//!
//! The HTTP surfacing itself lives outside this crate; these are the
//! response bodies it serializes.

use serde::Serialize;

/// Body of the orchestrator status endpoint:
/// `{"orchestrator": <bool>, "status": "ok"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrchestratorStatus {
    /// Whether this node is currently the task orchestrator.
    pub orchestrator: bool,
    /// Always `"ok"`; the endpoint answering at all is the health signal.
    pub status: &'static str,
}

/// Body of the hibernation status endpoint:
/// `{"hibernationPlanPhase": <bool>, "hibernationTaskType": "<string>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HibernationStatus {
    /// Whether a hibernation plan phase is underway.
    #[serde(rename = "hibernationPlanPhase")]
    pub plan_phase: bool,
    /// Kind of the in-flight hibernation task; empty when none.
    #[serde(rename = "hibernationTaskType")]
    pub task_kind: String,
}

#[cfg(test)]
mod tests {
    use super::{HibernationStatus, OrchestratorStatus};

    #[test]
    fn orchestrator_status_shape() {
        let body = OrchestratorStatus {
            orchestrator: true,
            status: "ok",
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"orchestrator":true,"status":"ok"}"#
        );
    }

    #[test]
    fn hibernation_status_shape() {
        let body = HibernationStatus {
            plan_phase: false,
            task_kind: "hibernate".into(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"hibernationPlanPhase":false,"hibernationTaskType":"hibernate"}"#
        );
    }
}
