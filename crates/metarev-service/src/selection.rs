//! Persisted administrator choice of optional keys.

use std::collections::BTreeSet;
use std::sync::Arc;

use metarev_core::config::{RegistryConfig, DEFAULT_SELECTION_OPTION};
use metarev_core::{ConfigStore, CoreResult, KeyRegistry, MetadataStore};
use serde_json::Value;

/// Housekeeping keys that are never offered for selection.
pub const BUILTIN_EXCLUDED_KEYS: [&str; 2] = ["_edit_last", "_edit_lock"];

/// Reads and writes the administrator's key selection.
///
/// Unconfigured until the first [`SelectionStore::save_selection`]; there is
/// no way back to unconfigured.
pub struct SelectionStore {
    options: Arc<dyn ConfigStore>,
    metadata: Arc<dyn MetadataStore>,
    option_name: String,
    extra_excluded: BTreeSet<String>,
}

impl SelectionStore {
    pub fn new(options: Arc<dyn ConfigStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            options,
            metadata,
            option_name: DEFAULT_SELECTION_OPTION.to_string(),
            extra_excluded: BTreeSet::new(),
        }
    }

    pub fn from_config(
        config: &RegistryConfig,
        options: Arc<dyn ConfigStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self::new(options, metadata)
            .with_option_name(config.selection_option.clone())
            .with_excluded_keys(config.excluded_keys.iter().cloned())
    }

    #[must_use]
    pub fn with_option_name(mut self, name: impl Into<String>) -> Self {
        self.option_name = name.into();
        self
    }

    /// Extends the built-in exclusions.
    #[must_use]
    pub fn with_excluded_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.extra_excluded.extend(keys);
        self
    }

    #[must_use]
    pub fn option_name(&self) -> &str {
        &self.option_name
    }

    #[must_use]
    pub fn excluded_keys(&self) -> BTreeSet<String> {
        BUILTIN_EXCLUDED_KEYS
            .iter()
            .map(|key| (*key).to_string())
            .chain(self.extra_excluded.iter().cloned())
            .collect()
    }

    /// Keys collaborators registered before administrator input.
    #[must_use]
    pub fn required_keys(&self, registry: &KeyRegistry) -> BTreeSet<String> {
        registry.required_keys()
    }

    /// Every key ever stored, minus exclusions and required keys.
    pub async fn selectable_keys(&self, registry: &KeyRegistry) -> CoreResult<BTreeSet<String>> {
        let excluded = self.excluded_keys();
        let required = self.required_keys(registry);
        let stored = self.metadata.list_distinct_metadata_keys().await?;

        Ok(stored
            .into_iter()
            .filter(|key| !excluded.contains(key) && !required.contains(key))
            .collect())
    }

    /// The persisted selection; empty when never configured.
    pub async fn selected_keys(&self) -> CoreResult<BTreeSet<String>> {
        let value = match self.options.get_config(&self.option_name).await? {
            None | Some(Value::Null) => return Ok(BTreeSet::new()),
            Some(value) => value,
        };

        match serde_json::from_value::<Vec<String>>(value) {
            Ok(keys) => Ok(keys.into_iter().collect()),
            Err(err) => {
                tracing::warn!(
                    option = %self.option_name,
                    error = %err,
                    "ignoring malformed key selection"
                );
                Ok(BTreeSet::new())
            }
        }
    }

    /// Replaces the persisted selection. Keys are not checked against
    /// [`SelectionStore::selectable_keys`].
    pub async fn save_selection(&self, keys: &BTreeSet<String>) -> CoreResult<()> {
        let value = Value::from(keys.iter().cloned().collect::<Vec<_>>());
        self.options.set_config(&self.option_name, &value).await?;
        tracing::info!(
            option = %self.option_name,
            count = keys.len(),
            "saved metadata key selection"
        );
        Ok(())
    }
}
