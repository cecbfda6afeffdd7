use metarev_core::CoreError;
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::MIGRATOR;

/// Creates a SQLite connection pool configured for metadata workloads.
pub async fn create_sqlite_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Runs all outstanding migrations against the provided connection pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Every sqlx failure surfaces as an unavailable store for the current key.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::Database(db_err) => CoreError::storage_unavailable(db_err.message()),
        other => CoreError::storage_unavailable(other.to_string()),
    }
}
