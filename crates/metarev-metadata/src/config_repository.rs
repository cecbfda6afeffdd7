//! SQLite implementation of the named option store.

use async_trait::async_trait;
use metarev_core::{ConfigStore, CoreError, CoreResult};
use serde_json::Value;
use sqlx::{query, Row, SqlitePool};

use crate::util::map_sqlx_error;

/// SQLite-backed option store. Values are kept as JSON text.
pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn get_config(&self, name: &str) -> CoreResult<Option<Value>> {
        let row = query("SELECT option_value FROM options WHERE option_name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let raw: String = row.get("option_value");
                serde_json::from_str(&raw)
                    .map(Some)
                    .map_err(|err| CoreError::DeserializationError(format!("option `{name}`: {err}")))
            }
            None => Ok(None),
        }
    }

    async fn set_config(&self, name: &str, value: &Value) -> CoreResult<()> {
        query(
            r#"
            INSERT INTO options (option_name, option_value)
            VALUES (?1, ?2)
            ON CONFLICT(option_name) DO UPDATE SET option_value = excluded.option_value
            "#,
        )
        .bind(name)
        .bind(value.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
