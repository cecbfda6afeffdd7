//! Prometheus metrics for the synchronization engine.
//!
//! Metrics are registered lazily on first access using once_cell::Lazy.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, IntCounterVec};

/// Per-key synchronization operations by kind and outcome
pub static SYNC_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "metarev_sync_operations_total",
        "Total number of per-key metadata synchronization operations",
        &["operation", "status"]
    )
    .expect("Failed to register sync operations counter")
});

/// Admin selection saves by outcome
pub static ADMIN_SAVES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "metarev_admin_saves_total",
        "Total number of admin key selection saves",
        &["status"]
    )
    .expect("Failed to register admin saves counter")
});

/// Records one per-key operation.
///
/// Successes use `snapshot_copy`, `restore_insert` or `restore_update`;
/// failures use `snapshot_copy` or `restore`.
pub fn record_sync(operation: &str, ok: bool) {
    SYNC_OPERATIONS
        .with_label_values(&[operation, if ok { "ok" } else { "error" }])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let _ = &*SYNC_OPERATIONS;
        let _ = &*ADMIN_SAVES;
    }

    #[test]
    fn test_sync_metrics_increment() {
        let before = SYNC_OPERATIONS
            .with_label_values(&["snapshot_copy", "ok"])
            .get();
        record_sync("snapshot_copy", true);
        let after = SYNC_OPERATIONS
            .with_label_values(&["snapshot_copy", "ok"])
            .get();
        assert!(after > before);

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|m| m.get_name() == "metarev_sync_operations_total"));
    }
}
