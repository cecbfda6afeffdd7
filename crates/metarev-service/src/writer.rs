//! Copies registered metadata onto newly persisted snapshots.

use std::sync::Arc;

use metarev_core::metrics::record_sync;
use metarev_core::{CoreResult, KeyRegistry, MetadataStore, OwnerId, RecordId, SnapshotId, SnapshotPersisted};

use crate::report::{KeyAction, SyncReport};

/// Handles "record persisted as snapshot" events.
///
/// The writer does not guard against being invoked twice for the same
/// snapshot: the host fires the event at most once per snapshot, and a second
/// invocation inserts every key again unless the store de-duplicates.
pub struct SnapshotWriter {
    registry: Arc<KeyRegistry>,
    store: Arc<dyn MetadataStore>,
}

impl SnapshotWriter {
    pub fn new(registry: Arc<KeyRegistry>, store: Arc<dyn MetadataStore>) -> Self {
        Self { registry, store }
    }

    /// Copies every registered, non-empty key from the source record to the
    /// snapshot. Primary saves and empty registries perform no storage calls.
    pub async fn copy_to_snapshot(&self, event: &SnapshotPersisted) -> SyncReport {
        let mut report = SyncReport::default();

        let Some(source) = event.record.snapshot_source() else {
            return report;
        };
        if !self.registry.has_keys() {
            return report;
        }

        for entry in self.registry.entries() {
            let key = entry.name();
            match self.copy_key(source, event.snapshot_id, key).await {
                Ok(true) => {
                    tracing::debug!(
                        target: "metarev::sync",
                        key,
                        snapshot_id = %event.snapshot_id,
                        record_id = %source,
                        "added metadata to snapshot"
                    );
                    record_sync(KeyAction::Copied.operation(), true);
                    report.apply(key, KeyAction::Copied);
                }
                Ok(false) => report.skip(key),
                Err(err) => {
                    tracing::warn!(
                        key,
                        snapshot_id = %event.snapshot_id,
                        record_id = %source,
                        error = %err,
                        "failed to copy metadata to snapshot"
                    );
                    record_sync(KeyAction::Copied.operation(), false);
                    report.fail(key, err);
                }
            }
        }

        report
    }

    async fn copy_key(&self, source: RecordId, snapshot: SnapshotId, key: &str) -> CoreResult<bool> {
        let value = match self.store.get_metadata(OwnerId::Record(source), key).await? {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(false),
        };

        // The snapshot is new, so this is a plain insert rather than an upsert.
        self.store
            .insert_metadata(OwnerId::Snapshot(snapshot), key, &value, false)
            .await?;
        Ok(true)
    }
}
