//! Core domain types and traits for revision metadata synchronization.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod metrics;
pub mod registry;
pub mod traits;
pub mod value;

pub use auth::{ActionToken, Principal, SAVE_KEYS_ACTION};
pub use config::MetarevConfig;
pub use error::{CoreError, CoreResult};
pub use events::{PersistedRecord, RecordKind, RestoreRequested, SnapshotPersisted};
pub use ids::{OwnerId, RecordId, SnapshotId};
pub use registry::{DisplayFormatter, KeyRegistry, MetadataKey};
pub use traits::{ConfigStore, MetadataStore};
pub use value::MetaValue;
