//! Service layer for revision metadata synchronization.
//! Shared by the REST surface and embedding hosts.

pub mod admin;
pub mod display;
mod engine;
mod merger;
mod report;
mod selection;
mod writer;

pub use admin::{AdminNotice, AdminSettings, SaveSelectionRequest, SelectableKey, SettingsView};
pub use display::{DisplayAdapter, DisplayFilter, RenderSource, RenderedField, EMPTY_PLACEHOLDER};
pub use engine::{InitContext, MandatoryKeys, RequestMode, RevisionEngine};
pub use merger::RestoreMerger;
pub use report::{KeyAction, KeyFailure, SyncReport};
pub use selection::{SelectionStore, BUILTIN_EXCLUDED_KEYS};
pub use writer::SnapshotWriter;
