//! SQLite implementation of the per-owner metadata store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use metarev_core::{CoreResult, MetaValue, MetadataStore, OwnerId};
use sqlx::{query, Row, SqlitePool};

use crate::util::map_sqlx_error;

/// SQLite-backed metadata store.
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    /// Creates a new store backed by the provided pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Provides access to the underlying pool, primarily for testing.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn get_metadata(&self, owner: OwnerId, key: &str) -> CoreResult<Option<MetaValue>> {
        let row = query(
            r#"
            SELECT meta_value
              FROM metadata
             WHERE owner_kind = ?1 AND owner_id = ?2 AND meta_key = ?3
          ORDER BY meta_id ASC
             LIMIT 1
            "#,
        )
        .bind(owner.kind())
        .bind(owner.to_bytes().to_vec())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| MetaValue::from(row.get::<Vec<u8>, _>("meta_value"))))
    }

    async fn get_all_metadata(&self, owner: OwnerId, key: &str) -> CoreResult<Vec<MetaValue>> {
        let rows = query(
            r#"
            SELECT meta_value
              FROM metadata
             WHERE owner_kind = ?1 AND owner_id = ?2 AND meta_key = ?3
          ORDER BY meta_id ASC
            "#,
        )
        .bind(owner.kind())
        .bind(owner.to_bytes().to_vec())
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| MetaValue::from(row.get::<Vec<u8>, _>("meta_value")))
            .collect())
    }

    async fn insert_metadata(
        &self,
        owner: OwnerId,
        key: &str,
        value: &MetaValue,
        unique: bool,
    ) -> CoreResult<bool> {
        let owner_id = owner.to_bytes().to_vec();
        let statement = if unique {
            // Single statement so the existence check and the insert cannot interleave.
            query(
                r#"
                INSERT INTO metadata (owner_kind, owner_id, meta_key, meta_value)
                SELECT ?1, ?2, ?3, ?4
                 WHERE NOT EXISTS (
                       SELECT 1 FROM metadata
                        WHERE owner_kind = ?1 AND owner_id = ?2 AND meta_key = ?3
                 )
                "#,
            )
        } else {
            query(
                r#"
                INSERT INTO metadata (owner_kind, owner_id, meta_key, meta_value)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
        };

        let result = statement
            .bind(owner.kind())
            .bind(owner_id)
            .bind(key)
            .bind(value.as_bytes().to_vec())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_metadata(&self, owner: OwnerId, key: &str, value: &MetaValue) -> CoreResult<()> {
        let rows = query(
            r#"
            UPDATE metadata
               SET meta_value = ?4
             WHERE owner_kind = ?1 AND owner_id = ?2 AND meta_key = ?3
            "#,
        )
        .bind(owner.kind())
        .bind(owner.to_bytes().to_vec())
        .bind(key)
        .bind(value.as_bytes().to_vec())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if rows.rows_affected() == 0 {
            self.insert_metadata(owner, key, value, true).await?;
        }
        Ok(())
    }

    async fn list_distinct_metadata_keys(&self) -> CoreResult<BTreeSet<String>> {
        let rows = query(
            r#"
            SELECT DISTINCT meta_key
              FROM metadata
          ORDER BY meta_key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("meta_key"))
            .collect())
    }
}
