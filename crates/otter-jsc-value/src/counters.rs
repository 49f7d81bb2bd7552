//! Process-wide construct/destruct counters for value handles.
//!
//! Diagnostic only. Nothing in the crate branches on these.

use std::sync::atomic::{AtomicU64, Ordering};

static CONSTRUCTED: AtomicU64 = AtomicU64::new(0);
static DESTROYED: AtomicU64 = AtomicU64::new(0);

/// Snapshot of the lifecycle counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleCounters {
    /// Handles created, including clones
    pub constructed: u64,
    /// Handles dropped
    pub destroyed: u64,
}

impl LifecycleCounters {
    /// Handles constructed but not yet dropped at snapshot time
    pub fn live(&self) -> u64 {
        self.constructed.saturating_sub(self.destroyed)
    }

    /// Counter movement between an earlier snapshot and this one
    pub fn since(&self, earlier: &LifecycleCounters) -> LifecycleCounters {
        LifecycleCounters {
            constructed: self.constructed.saturating_sub(earlier.constructed),
            destroyed: self.destroyed.saturating_sub(earlier.destroyed),
        }
    }
}

/// Read both counters
pub fn lifecycle_counters() -> LifecycleCounters {
    LifecycleCounters {
        constructed: CONSTRUCTED.load(Ordering::Relaxed),
        destroyed: DESTROYED.load(Ordering::Relaxed),
    }
}

pub(crate) fn record_construct() {
    CONSTRUCTED.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_destruct() {
    DESTROYED.fetch_add(1, Ordering::Relaxed);
}
