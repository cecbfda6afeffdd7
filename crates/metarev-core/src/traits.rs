use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;
use crate::ids::OwnerId;
use crate::value::MetaValue;

/// Storage interface for per-owner key/value metadata.
///
/// Each call is expected to be atomic on its own; the engine never wraps a
/// sequence of calls in a transaction.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Returns the first value stored for `(owner, key)`.
    async fn get_metadata(&self, owner: OwnerId, key: &str) -> CoreResult<Option<MetaValue>>;

    /// Returns every value stored for `(owner, key)` in insertion order.
    async fn get_all_metadata(&self, owner: OwnerId, key: &str) -> CoreResult<Vec<MetaValue>>;

    /// Appends a value for `(owner, key)`.
    ///
    /// With `unique` set the insert is skipped when an entry already exists
    /// and `Ok(false)` is returned.
    async fn insert_metadata(
        &self,
        owner: OwnerId,
        key: &str,
        value: &MetaValue,
        unique: bool,
    ) -> CoreResult<bool>;

    /// Overwrites every value for `(owner, key)`, inserting one when none exists.
    async fn update_metadata(&self, owner: OwnerId, key: &str, value: &MetaValue) -> CoreResult<()>;

    /// Distinct keys across all metadata ever stored, for every owner.
    async fn list_distinct_metadata_keys(&self) -> CoreResult<BTreeSet<String>>;
}

/// Storage interface for named configuration values.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_config(&self, name: &str) -> CoreResult<Option<Value>>;

    /// Replaces the value stored under `name`.
    async fn set_config(&self, name: &str, value: &Value) -> CoreResult<()>;
}
