//! # Orchestrator configuration.
//!
//! [`Config`] centralizes the tunables of the adapter: how long a long-poll
//! waiter blocks before being handed the current snapshot, and how many
//! telemetry updates the progress channel buffers before dropping.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use clustervisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.wait_timeout = Duration::from_secs(5);
//!
//! assert_eq!(cfg.progress_capacity, 10);
//! ```

use std::time::Duration;

/// Tunables for the orchestrator adapter.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time a long-poll (`task_list`, `current_topology`) blocks
    /// waiting for a revision change before returning the current snapshot.
    pub wait_timeout: Duration,
    /// Capacity of the bounded progress channel. When full, telemetry
    /// updates are dropped rather than blocking the collaborator callback.
    pub progress_capacity: usize,
}

impl Default for Config {
    /// Provides the default configuration:
    /// - `wait_timeout = 20s`
    /// - `progress_capacity = 10`
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(20),
            progress_capacity: 10,
        }
    }
}
