//! In-memory metadata and option store for testing
//!
//! Keeps every entry in insertion order, records a call history for
//! assertions and can be told to fail operations on selected keys.
//!
//! ```rust
//! use metarev_core::{MetaValue, MetadataStore, OwnerId, RecordId};
//! use metarev_metadata::MemoryMetadataStore;
//!
//! # async fn example() -> metarev_core::CoreResult<()> {
//! let store = MemoryMetadataStore::new();
//! let owner = OwnerId::Record(RecordId::new());
//! store.insert_metadata(owner, "color", &MetaValue::text("blue"), true).await?;
//!
//! store.fail_key("color");
//! assert!(store.get_metadata(owner, "color").await.is_err());
//! assert_eq!(store.writes(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use metarev_core::{ConfigStore, CoreError, CoreResult, MetaValue, MetadataStore, OwnerId};
use parking_lot::RwLock;
use serde_json::Value;

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHistoryEntry {
    /// `get`, `get_all`, `insert`, `update`, `list_keys`, `get_config`, `set_config`.
    pub operation: &'static str,

    pub owner: Option<OwnerId>,

    /// Metadata key or option name.
    pub key: Option<String>,

    pub success: bool,
}

impl CallHistoryEntry {
    fn is_write(&self) -> bool {
        matches!(self.operation, "insert" | "update" | "set_config")
    }
}

#[derive(Debug, Clone)]
struct Entry {
    owner: OwnerId,
    key: String,
    value: MetaValue,
}

/// In-memory store (for testing)
#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    entries: Arc<RwLock<Vec<Entry>>>,
    options: Arc<RwLock<HashMap<String, Value>>>,
    failing_keys: Arc<RwLock<HashSet<String>>>,
    unavailable: Arc<RwLock<bool>>,
    call_history: Arc<RwLock<Vec<CallHistoryEntry>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later operation touching `key` fail with `StorageUnavailable`.
    pub fn fail_key(&self, key: impl Into<String>) {
        self.failing_keys.write().insert(key.into());
    }

    /// Toggles failure of every operation.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write() = unavailable;
    }

    /// Get call history for assertions.
    pub fn get_call_history(&self) -> Vec<CallHistoryEntry> {
        self.call_history.read().clone()
    }

    pub fn clear_history(&self) {
        self.call_history.write().clear();
    }

    /// Total number of store calls, successful or not.
    pub fn call_count(&self) -> usize {
        self.call_history.read().len()
    }

    pub fn reads(&self) -> usize {
        self.call_history
            .read()
            .iter()
            .filter(|entry| !entry.is_write())
            .count()
    }

    pub fn writes(&self) -> usize {
        self.call_history
            .read()
            .iter()
            .filter(|entry| entry.is_write())
            .count()
    }

    /// Number of calls of `operation` on `key` that succeeded.
    pub fn successful(&self, operation: &str, key: &str) -> usize {
        self.call_history
            .read()
            .iter()
            .filter(|entry| {
                entry.operation == operation && entry.success && entry.key.as_deref() == Some(key)
            })
            .count()
    }

    fn check(
        &self,
        operation: &'static str,
        owner: Option<OwnerId>,
        key: Option<&str>,
    ) -> CoreResult<()> {
        let failing = *self.unavailable.read()
            || key.is_some_and(|key| self.failing_keys.read().contains(key));

        self.call_history.write().push(CallHistoryEntry {
            operation,
            owner,
            key: key.map(str::to_string),
            success: !failing,
        });

        if failing {
            Err(CoreError::storage_unavailable(format!(
                "memory store refused {operation} on {}",
                key.unwrap_or("*")
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get_metadata(&self, owner: OwnerId, key: &str) -> CoreResult<Option<MetaValue>> {
        self.check("get", Some(owner), Some(key))?;
        Ok(self
            .entries
            .read()
            .iter()
            .find(|entry| entry.owner == owner && entry.key == key)
            .map(|entry| entry.value.clone()))
    }

    async fn get_all_metadata(&self, owner: OwnerId, key: &str) -> CoreResult<Vec<MetaValue>> {
        self.check("get_all", Some(owner), Some(key))?;
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|entry| entry.owner == owner && entry.key == key)
            .map(|entry| entry.value.clone())
            .collect())
    }

    async fn insert_metadata(
        &self,
        owner: OwnerId,
        key: &str,
        value: &MetaValue,
        unique: bool,
    ) -> CoreResult<bool> {
        self.check("insert", Some(owner), Some(key))?;
        let mut entries = self.entries.write();
        if unique && entries.iter().any(|entry| entry.owner == owner && entry.key == key) {
            return Ok(false);
        }
        entries.push(Entry {
            owner,
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(true)
    }

    async fn update_metadata(&self, owner: OwnerId, key: &str, value: &MetaValue) -> CoreResult<()> {
        self.check("update", Some(owner), Some(key))?;
        let mut entries = self.entries.write();
        let mut matched = false;
        for entry in entries
            .iter_mut()
            .filter(|entry| entry.owner == owner && entry.key == key)
        {
            entry.value = value.clone();
            matched = true;
        }
        if !matched {
            entries.push(Entry {
                owner,
                key: key.to_string(),
                value: value.clone(),
            });
        }
        Ok(())
    }

    async fn list_distinct_metadata_keys(&self) -> CoreResult<BTreeSet<String>> {
        self.check("list_keys", None, None)?;
        Ok(self
            .entries
            .read()
            .iter()
            .map(|entry| entry.key.clone())
            .collect())
    }
}

#[async_trait]
impl ConfigStore for MemoryMetadataStore {
    async fn get_config(&self, name: &str) -> CoreResult<Option<Value>> {
        self.check("get_config", None, Some(name))?;
        Ok(self.options.read().get(name).cloned())
    }

    async fn set_config(&self, name: &str, value: &Value) -> CoreResult<()> {
        self.check("set_config", None, Some(name))?;
        self.options.write().insert(name.to_string(), value.clone());
        Ok(())
    }
}
