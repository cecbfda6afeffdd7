//! Metadata and option store adapters for revision metadata synchronization.

mod config_repository;
mod memory;
mod metadata_repository;
mod util;

pub use config_repository::SqliteConfigStore;
pub use memory::{CallHistoryEntry, MemoryMetadataStore};
pub use metadata_repository::SqliteMetadataStore;
pub use util::{create_sqlite_pool, run_migrations};

/// Embedded SQL migrations for the metadata database.
pub const MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
