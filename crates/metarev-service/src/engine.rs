//! Per-scope wiring of registry, writer, merger and display adapter.

use std::sync::Arc;

use metarev_core::config::RegistryConfig;
use metarev_core::{
    CoreResult, KeyRegistry, MetaValue, MetadataKey, MetadataStore, OwnerId, RestoreRequested,
    SnapshotId, SnapshotPersisted,
};

use crate::display::{DisplayAdapter, DisplayFilter, RenderedField};
use crate::merger::RestoreMerger;
use crate::report::SyncReport;
use crate::selection::SelectionStore;
use crate::writer::SnapshotWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Public,
    Admin,
}

/// The request context an engine is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitContext {
    pub mode: RequestMode,
    /// The request renders a snapshot review.
    pub review: bool,
}

impl InitContext {
    #[must_use]
    pub const fn public() -> Self {
        Self {
            mode: RequestMode::Public,
            review: false,
        }
    }

    #[must_use]
    pub const fn admin() -> Self {
        Self {
            mode: RequestMode::Admin,
            review: false,
        }
    }

    #[must_use]
    pub const fn admin_review() -> Self {
        Self {
            mode: RequestMode::Admin,
            review: true,
        }
    }

    const fn wants_display(&self) -> bool {
        matches!(self.mode, RequestMode::Admin) && self.review
    }
}

/// Keys collaborators register before the administrator's selection.
#[derive(Debug, Clone, Default)]
pub struct MandatoryKeys {
    keys: Vec<MetadataKey>,
}

impl MandatoryKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        config
            .mandatory_keys
            .iter()
            .fold(Self::new(), |keys, name| keys.with(name.clone()))
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.keys.push(MetadataKey::new(name));
        self
    }

    #[must_use]
    pub fn with_formatter<F>(mut self, name: impl Into<String>, formatter: F) -> Self
    where
        F: Fn(&MetaValue) -> String + Send + Sync + 'static,
    {
        self.keys.push(MetadataKey::new(name).with_formatter(formatter));
        self
    }

    pub fn register(&mut self, key: MetadataKey) {
        self.keys.push(key);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataKey> {
        self.keys.iter()
    }
}

/// Revision metadata engine for one request or process scope.
///
/// Components that were not wired turn their event handlers into no-ops.
pub struct RevisionEngine {
    registry: Arc<KeyRegistry>,
    store: Arc<dyn MetadataStore>,
    writer: Option<SnapshotWriter>,
    merger: Option<RestoreMerger>,
    display: Option<DisplayAdapter>,
}

impl RevisionEngine {
    /// Builds the registry and wires components for `ctx`.
    ///
    /// # Errors
    ///
    /// Fails when the persisted selection cannot be read.
    pub async fn initialize(
        ctx: InitContext,
        mandatory: &MandatoryKeys,
        selection: &SelectionStore,
        store: Arc<dyn MetadataStore>,
    ) -> CoreResult<Self> {
        let mut registry = KeyRegistry::new();
        for key in mandatory.iter() {
            registry.register_entry(key.clone());
        }
        registry.seal_mandatory();

        for key in selection.selected_keys().await? {
            registry.register_key(key);
        }

        let registry = Arc::new(registry);
        let (writer, merger) = if registry.has_keys() {
            (
                Some(SnapshotWriter::new(Arc::clone(&registry), Arc::clone(&store))),
                Some(RestoreMerger::new(Arc::clone(&registry), Arc::clone(&store))),
            )
        } else {
            (None, None)
        };
        let display = ctx
            .wants_display()
            .then(|| DisplayAdapter::new(Arc::clone(&registry)));

        tracing::debug!(
            target: "metarev::sync",
            keys = registry.len(),
            required = registry.required_keys().len(),
            mode = ?ctx.mode,
            review = ctx.review,
            "initialized revision engine"
        );

        Ok(Self {
            registry,
            store,
            writer,
            merger,
            display,
        })
    }

    /// Installs a filter on the display adapter, if one is wired.
    #[must_use]
    pub fn with_display_filter(mut self, filter: DisplayFilter) -> Self {
        self.display = self.display.map(|display| display.with_filter(filter));
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.writer.is_some()
    }

    #[must_use]
    pub fn is_reviewing(&self) -> bool {
        self.display.is_some()
    }

    /// # Errors
    ///
    /// Returns the first per-key storage failure, after all keys were tried.
    pub async fn on_snapshot_persisted(&self, event: &SnapshotPersisted) -> CoreResult<SyncReport> {
        match &self.writer {
            Some(writer) => writer.copy_to_snapshot(event).await.into_result(),
            None => Ok(SyncReport::default()),
        }
    }

    /// # Errors
    ///
    /// Returns the first per-key storage failure, after all keys were tried.
    pub async fn on_restore_requested(&self, event: &RestoreRequested) -> CoreResult<SyncReport> {
        match &self.merger {
            Some(merger) => merger.restore(event).await.into_result(),
            None => Ok(SyncReport::default()),
        }
    }

    /// Renders every registered key of `snapshot_id` in registration order.
    ///
    /// # Errors
    ///
    /// Fails on the first storage read error.
    pub async fn review_snapshot(&self, snapshot_id: SnapshotId) -> CoreResult<Vec<RenderedField>> {
        let Some(display) = &self.display else {
            return Ok(Vec::new());
        };

        let mut fields = Vec::with_capacity(self.registry.len());
        for entry in self.registry.entries() {
            let raw = self
                .store
                .get_metadata(OwnerId::Snapshot(snapshot_id), entry.name())
                .await?;
            fields.push(display.render(entry.name(), raw.as_ref()));
        }
        Ok(fields)
    }
}
