//! Merges snapshot metadata back into the primary record on restore.

use std::sync::Arc;

use metarev_core::metrics::record_sync;
use metarev_core::{CoreResult, KeyRegistry, MetadataStore, OwnerId, RestoreRequested};

use crate::report::{KeyAction, SyncReport};

/// Handles "restore requested" events with upsert semantics.
///
/// Restore never deletes: keys missing or empty on the snapshot leave the
/// record untouched.
pub struct RestoreMerger {
    registry: Arc<KeyRegistry>,
    store: Arc<dyn MetadataStore>,
}

impl RestoreMerger {
    pub fn new(registry: Arc<KeyRegistry>, store: Arc<dyn MetadataStore>) -> Self {
        Self { registry, store }
    }

    pub async fn restore(&self, event: &RestoreRequested) -> SyncReport {
        let mut report = SyncReport::default();
        if !self.registry.has_keys() {
            return report;
        }

        for entry in self.registry.entries() {
            let key = entry.name();
            match self.restore_key(event, key).await {
                Ok(Some(action)) => {
                    tracing::debug!(
                        target: "metarev::sync",
                        key,
                        record_id = %event.record_id,
                        snapshot_id = %event.snapshot_id,
                        "restored metadata for record from snapshot"
                    );
                    record_sync(action.operation(), true);
                    report.apply(key, action);
                }
                Ok(None) => report.skip(key),
                Err(err) => {
                    tracing::warn!(
                        key,
                        record_id = %event.record_id,
                        snapshot_id = %event.snapshot_id,
                        error = %err,
                        "failed to restore metadata from snapshot"
                    );
                    record_sync("restore", false);
                    report.fail(key, err);
                }
            }
        }

        report
    }

    async fn restore_key(&self, event: &RestoreRequested, key: &str) -> CoreResult<Option<KeyAction>> {
        let value = match self
            .store
            .get_metadata(OwnerId::Snapshot(event.snapshot_id), key)
            .await?
        {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(None),
        };

        let record = OwnerId::Record(event.record_id);
        let current = self.store.get_metadata(record, key).await?;

        if current.is_some() {
            tracing::debug!(
                target: "metarev::sync",
                key,
                record_id = %event.record_id,
                snapshot_id = %event.snapshot_id,
                "updating metadata"
            );
            self.store.update_metadata(record, key, &value).await?;
            Ok(Some(KeyAction::Updated))
        } else {
            tracing::debug!(
                target: "metarev::sync",
                key,
                record_id = %event.record_id,
                "adding metadata"
            );
            // Tracked fields are single-valued.
            if self.store.insert_metadata(record, key, &value, true).await? {
                Ok(Some(KeyAction::Inserted))
            } else {
                // An entry appeared between the read and the insert.
                self.store.update_metadata(record, key, &value).await?;
                Ok(Some(KeyAction::Updated))
            }
        }
    }
}
