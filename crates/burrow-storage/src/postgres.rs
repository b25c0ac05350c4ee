use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{IndexEntry, IndexStore, LinkStore, ShortCode, ShortLink};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

/// Schema for both tables. Every shard carries both; only the index store's
/// `link_index` is ever written.
pub const SCHEMA: &str = include_str!("../ddl/postgres/schema.sql");

/// Postgres implementation of the store contracts.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a store from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool and waits for the first connection.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates a pool that connects on first use.
    ///
    /// Acquiring a connection gives up after `acquire_timeout`.
    pub fn connect_lazy(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| StorageError::Configuration(format!("invalid database url: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Creates the tables if they are missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::Configuration(_) => StorageError::Configuration(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn link_from_row(row: &sqlx::postgres::PgRow) -> Result<ShortLink> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;

    Ok(ShortLink {
        id,
        short_code: ShortCode::new_unchecked(short_code),
        original_url,
    })
}

#[async_trait]
impl LinkStore for PgStore {
    async fn insert_link(&self, code: &ShortCode, original_url: &str) -> Result<ShortLink> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_links (short_code, original_url)
            VALUES ($1, $2)
            RETURNING id, short_code, original_url
            "#,
        )
        .bind(code.as_str())
        .bind(original_url)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => link_from_row(&row),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get_link(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT id, short_code, original_url
            FROM short_links
            WHERE short_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(link_from_row).transpose()
    }

    async fn delete_link(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query("DELETE FROM short_links WHERE short_code = $1")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IndexStore for PgStore {
    async fn entry_exists(&self, code: &ShortCode) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM link_index WHERE short_code = $1)")
            .bind(code.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.try_get::<bool, _>(0).map_err(map_sqlx_error)
    }

    async fn insert_entry(&self, code: &ShortCode) -> Result<()> {
        let result = sqlx::query("INSERT INTO link_index (short_code, hit_count) VALUES ($1, 0)")
            .bind(code.as_str())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_hits(&self, code: &ShortCode) -> Result<bool> {
        let result =
            sqlx::query("UPDATE link_index SET hit_count = hit_count + 1 WHERE short_code = $1")
                .bind(code.as_str())
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_entry(&self, code: &ShortCode) -> Result<Option<IndexEntry>> {
        let row = sqlx::query("SELECT hit_count FROM link_index WHERE short_code = $1")
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: i64 = row.try_get("hit_count").map_err(map_sqlx_error)?;
        let hit_count = u64::try_from(raw).map_err(|_| {
            StorageError::InvalidData(format!("negative hit count {raw} for '{code}'"))
        })?;

        Ok(Some(IndexEntry {
            short_code: code.clone(),
            hit_count,
        }))
    }

    async fn delete_entry(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query("DELETE FROM link_index WHERE short_code = $1")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
