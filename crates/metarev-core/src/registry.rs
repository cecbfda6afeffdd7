//! Registry of metadata keys that travel with snapshots.
//!
//! A registry is built once per request or process scope: collaborators
//! register their mandatory keys, the builder calls
//! [`KeyRegistry::seal_mandatory`], and the administrator's persisted
//! selection is layered on top. Nothing is ever removed afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::value::MetaValue;

/// Renders a raw value for the snapshot review. Output is used verbatim.
pub type DisplayFormatter = Arc<dyn Fn(&MetaValue) -> String + Send + Sync>;

/// One registered metadata key.
#[derive(Clone)]
pub struct MetadataKey {
    name: String,
    formatter: Option<DisplayFormatter>,
}

impl MetadataKey {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formatter: None,
        }
    }

    /// Attaches a display formatter.
    #[must_use]
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&MetaValue) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn formatter(&self) -> Option<&DisplayFormatter> {
        self.formatter.as_ref()
    }
}

impl fmt::Debug for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataKey")
            .field("name", &self.name)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Ordered, deduplicated set of metadata keys.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    entries: Vec<MetadataKey>,
    mandatory: usize,
}

impl KeyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` unless it is already present. Always returns `true`.
    ///
    /// When a key is registered twice the first formatter wins.
    pub fn register(&mut self, name: impl Into<String>, formatter: Option<DisplayFormatter>) -> bool {
        let name = name.into();
        if !self.contains(&name) {
            self.entries.push(MetadataKey { name, formatter });
        }
        true
    }

    pub fn register_key(&mut self, name: impl Into<String>) -> bool {
        self.register(name, None)
    }

    /// Registers a prepared [`MetadataKey`], keeping its formatter.
    pub fn register_entry(&mut self, key: MetadataKey) -> bool {
        if !self.contains(key.name()) {
            self.entries.push(key);
        }
        true
    }

    /// Gate for every downstream operation: nothing happens without keys.
    #[must_use]
    pub fn has_keys(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Distinct registered names.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    /// Entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[MetadataKey] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetadataKey> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    #[must_use]
    pub fn formatter(&self, name: &str) -> Option<&DisplayFormatter> {
        self.get(name).and_then(MetadataKey::formatter)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Marks everything registered so far as mandatory.
    ///
    /// Called once collaborators are done and before the administrator's
    /// selection is applied. Calling it again moves the boundary forward.
    pub fn seal_mandatory(&mut self) {
        self.mandatory = self.entries.len();
    }

    /// Keys registered before [`KeyRegistry::seal_mandatory`]; they cannot be
    /// deselected by an administrator.
    #[must_use]
    pub fn required_keys(&self) -> BTreeSet<String> {
        self.entries[..self.mandatory]
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }
}
