//! # Rebalance telemetry aggregation.
//!
//! The rebalancer invokes its progress callback with a nested telemetry
//! tree (`pindex → source partition → node → entry`). The tracker folds
//! each batch into a per-`(pindex, node)` cache and publishes one rolled-up
//! figure per batch onto the [`ProgressBus`].
//!
//! ## Per-entry percentage
//! For an entry with a non-empty target feed UUID:
//! - target already reached (`want.seq <= curr.seq`) counts as 1.0;
//! - otherwise `(curr.seq - init.seq) / (want.seq - init.seq)` when the
//!   denominator is positive;
//! - entries with no usable sequence window are skipped.
//!
//! The sequence percentage for a node averages those values across the
//! pindex's source partitions. When file transfer progress is reported it
//! contributes 80% of the partition's figure, the sequence catch-up the
//! remaining 20%.
//!
//! ## Cache
//! The cache keeps the **maximum** observed value per `(pindex, node)` and
//! skips recomputation for entries already at 1.0, so per-entry progress
//! never regresses across batches.
//!
//! ## Roll-up
//! Cached values above zero are summed and divided by
//! `max(count, moving_partitions_count)`; the hint keeps the denominator
//! honest while telemetry still under-reports the partitions in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::{RebalanceTelemetry, Rebalancer, TransferEntry};
use crate::progress::bus::{ProgressBus, TaskProgress};
use crate::task::NodeId;

type ProgressCache = HashMap<String, HashMap<NodeId, f64>>;

/// Folds rebalance telemetry into a monotone per-`(pindex, node)` cache and
/// publishes rolled-up task progress.
///
/// The cache is owned by the rebalancer's callback thread; the internal
/// mutex only makes the tracker shareable as a plain `Fn` callback.
pub struct RebalanceProgressTracker {
    task_id: String,
    rebalancer: Arc<dyn Rebalancer>,
    bus: ProgressBus,
    cache: Mutex<ProgressCache>,
}

impl RebalanceProgressTracker {
    pub fn new(task_id: impl Into<String>, rebalancer: Arc<dyn Rebalancer>, bus: ProgressBus) -> Self {
        Self {
            task_id: task_id.into(),
            rebalancer,
            bus,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Absorbs one telemetry batch and publishes the rolled-up figure.
    ///
    /// Never blocks: the publish drops when the consumer is behind. The
    /// returned text feeds the rebalancer's own logging; `None` telemetry
    /// signals completion and yields `"DONE"`.
    pub fn observe(&self, telemetry: Option<&RebalanceTelemetry>, errs: &[String]) -> String {
        let mut progress = 0.0;
        if let Some(tree) = telemetry {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            absorb(&mut cache, tree);
            progress = rolled_up(&cache, self.rebalancer.moving_partitions_count());
        }

        self.bus.publish(TaskProgress {
            task_id: self.task_id.clone(),
            errs: errs.to_vec(),
            progress_exists: telemetry.is_some(),
            progress,
        });

        match telemetry {
            None => "DONE".to_string(),
            Some(_) => format!("progress: {progress:.3}"),
        }
    }
}

fn absorb(cache: &mut ProgressCache, tree: &RebalanceTelemetry) {
    for source_partitions in tree.values() {
        for nodes in source_partitions.values() {
            for pex in nodes.values() {
                if pex.want.uuid.is_empty() {
                    continue;
                }
                // Already complete for this (pindex, node): skip the
                // recomputation entirely.
                if cache
                    .get(&pex.pindex)
                    .and_then(|m| m.get(&pex.node))
                    .is_some_and(|p| *p >= 1.0)
                {
                    continue;
                }

                let seq_pct = seq_catchup_pct(&pex.node, source_partitions).unwrap_or(0.0);
                if seq_pct > 0.0 || pex.transfer_progress > 0.0 {
                    // File transfer contributes 80% of the partition's
                    // figure, sequence catch-up the remaining 20%.
                    let value = if pex.transfer_progress > 0.0 {
                        let mut v = 0.8 * pex.transfer_progress;
                        if seq_pct > 0.0 {
                            v += 0.2 * seq_pct;
                        }
                        v
                    } else {
                        seq_pct
                    };

                    let slot = cache
                        .entry(pex.pindex.clone())
                        .or_default()
                        .entry(pex.node.clone())
                        .or_insert(0.0);
                    if *slot < value {
                        *slot = value;
                    }
                }
            }
        }
    }
}

/// Averages the per-entry sequence percentages for `node` across the
/// pindex's source partitions. `None` when no entry carries a usable
/// sequence window.
fn seq_catchup_pct(
    node: &NodeId,
    source_partitions: &HashMap<String, HashMap<NodeId, TransferEntry>>,
) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0u32;

    for nodes in source_partitions.values() {
        let Some(pex) = nodes.get(node) else { continue };
        if pex.want.uuid.is_empty() {
            continue;
        }

        if pex.want.seq <= pex.curr.seq {
            total += 1.0;
            count += 1;
            continue;
        }

        if pex.want.seq > pex.init.seq {
            let d = (pex.want.seq - pex.init.seq) as f64;
            let n = pex.curr.seq.saturating_sub(pex.init.seq) as f64;
            total += n / d;
            count += 1;
        }
    }

    (count > 0).then(|| total / f64::from(count))
}

fn rolled_up(cache: &ProgressCache, moving_partitions: usize) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for nodes in cache.values() {
        for p in nodes.values() {
            if *p > 0.0 {
                total += *p;
                count += 1;
            }
        }
    }

    let n = moving_partitions.max(count);
    if n > 0 {
        total / n as f64
    } else {
        0.0
    }
}
