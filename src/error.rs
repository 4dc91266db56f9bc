//! # Error types used by the orchestrator adapter.
//!
//! A single [`OrchestratorError`] enum covers the whole supervisor-facing
//! surface. Errors are tagged kinds, not exception hierarchies:
//!
//! - [`OrchestratorError::Canceled`] — a waiter's cancel signal fired.
//! - [`OrchestratorError::BadRevision`] — malformed revision token.
//! - [`OrchestratorError::NotFound`] — no task handle with the given id.
//! - [`OrchestratorError::Conflict`] — exclusion rule or optimistic
//!   revision check violated.
//! - [`OrchestratorError::NotSupported`] — uncancelable task or unknown
//!   topology change type.
//! - [`OrchestratorError::Adapter`] — wrapped failure from a collaborator.
//!
//! The type provides an `as_label` helper for logs/metrics.

use thiserror::Error;

/// Errors surfaced by the orchestrator's supervisor RPC surface.
///
/// Admission errors are returned synchronously and leave the task registry
/// untouched. Errors from a running task travel through the progress channel
/// instead and end up on the task's `error_message`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The caller's cancel signal fired while waiting.
    ///
    /// This is **not a failure** of the orchestrator; the waiter simply gave
    /// up before the long-poll completed.
    #[error("operation canceled")]
    Canceled,

    /// A revision token did not decode to an unsigned 64-bit integer.
    #[error("malformed revision: {rev:?}")]
    BadRevision {
        /// The offending token, rendered for logging.
        rev: String,
    },

    /// No task handle exists for the given id (or no prepared task was
    /// present when starting a topology change).
    #[error("task not found: {id}")]
    NotFound {
        /// The task id that failed to resolve.
        id: String,
    },

    /// An exclusion rule was violated or an optimistic revision check failed.
    #[error("conflict: {reason}")]
    Conflict {
        /// What conflicted (existing task kind or revision mismatch).
        reason: String,
    },

    /// The requested operation is not supported for this task or change.
    #[error("not supported: {reason}")]
    NotSupported {
        /// Why the operation was refused.
        reason: String,
    },

    /// A collaborator (rebalancer, hibernation manager, config store)
    /// reported a failure; the message carries the upstream text.
    #[error("adapter error: {message}")]
    Adapter {
        /// Upstream error text.
        message: String,
    },
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::Canceled => "canceled",
            OrchestratorError::BadRevision { .. } => "bad_revision",
            OrchestratorError::NotFound { .. } => "not_found",
            OrchestratorError::Conflict { .. } => "conflict",
            OrchestratorError::NotSupported { .. } => "not_supported",
            OrchestratorError::Adapter { .. } => "adapter",
        }
    }

    /// Builds a [`OrchestratorError::Conflict`] from any displayable reason.
    pub fn conflict(reason: impl Into<String>) -> Self {
        OrchestratorError::Conflict {
            reason: reason.into(),
        }
    }

    /// Builds an [`OrchestratorError::Adapter`] from any displayable message.
    pub fn adapter(message: impl Into<String>) -> Self {
        OrchestratorError::Adapter {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrchestratorError;

    #[test]
    fn labels_are_stable() {
        assert_eq!(OrchestratorError::Canceled.as_label(), "canceled");
        assert_eq!(
            OrchestratorError::BadRevision { rev: "x".into() }.as_label(),
            "bad_revision"
        );
        assert_eq!(
            OrchestratorError::conflict("rebalance running").as_label(),
            "conflict"
        );
        assert_eq!(OrchestratorError::adapter("boom").as_label(), "adapter");
    }

    #[test]
    fn adapter_message_carries_upstream_text() {
        let err = OrchestratorError::adapter("rebalancer: node down");
        assert_eq!(err.to_string(), "adapter error: rebalancer: node down");
    }
}
