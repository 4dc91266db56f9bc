//! # Process-wide registration hooks.
//!
//! Two hooks exist, each a slot settable exactly once during process
//! initialization and read-only thereafter:
//!
//! - the **defragmented-utilization hook**, which projects post-balance
//!   resource usage from the known node definitions, and
//! - the **remote-path validator**, consulted by dry-run resume admission.
//!
//! Registration after the first successful set is rejected; reads need no
//! synchronization beyond the [`OnceLock`] they live in.

use std::sync::OnceLock;

use serde::Serialize;

use crate::adapters::NodeDefs;
use crate::error::OrchestratorError;

/// Projected post-balance utilization stats, opaque to this crate.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DefragmentedUtilization(pub serde_json::Map<String, serde_json::Value>);

/// Computes the projected defragmented utilization for the service's nodes.
pub type DefragmentedUtilizationFn =
    dyn Fn(&NodeDefs) -> Result<DefragmentedUtilization, OrchestratorError> + Send + Sync;

/// Decides whether a remote blob-storage path can be resumed from.
pub type RemotePathValidFn = dyn Fn(&str) -> bool + Send + Sync;

static DEFRAG_HOOK: OnceLock<Box<DefragmentedUtilizationFn>> = OnceLock::new();
static REMOTE_PATH_HOOK: OnceLock<Box<RemotePathValidFn>> = OnceLock::new();

/// Registers the defragmented-utilization hook.
///
/// Returns `false` when a hook was already registered (the existing hook is
/// kept).
pub fn set_defragmented_utilization_hook(
    hook: impl Fn(&NodeDefs) -> Result<DefragmentedUtilization, OrchestratorError>
        + Send
        + Sync
        + 'static,
) -> bool {
    DEFRAG_HOOK.set(Box::new(hook)).is_ok()
}

/// Registers the remote-path validator.
///
/// Returns `false` when a validator was already registered.
pub fn set_remote_path_valid_hook(hook: impl Fn(&str) -> bool + Send + Sync + 'static) -> bool {
    REMOTE_PATH_HOOK.set(Box::new(hook)).is_ok()
}

/// The registered defragmented-utilization hook, if any.
pub(crate) fn defragmented_utilization_hook() -> Option<&'static DefragmentedUtilizationFn> {
    DEFRAG_HOOK.get().map(|b| b.as_ref())
}

/// Consults the registered remote-path validator. Paths are treated as
/// valid when no validator is registered.
pub(crate) fn remote_path_is_valid(path: &str) -> bool {
    match REMOTE_PATH_HOOK.get() {
        Some(hook) => hook(path),
        None => true,
    }
}
