//! SQLite storage backend using sqlx. Used by tests and local runs.

use std::str::FromStr as _;
use std::time::Duration;

use async_trait::async_trait;
use catalog_sync_core::StoredModelCategories;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, Sqlite, SqlitePool};

use crate::error::StorageError;
use crate::schema::{RowId, SqlValue, Table};
use crate::sql::{self, Dialect};
use crate::sqlite_migrations::run_sqlite_migrations;
use crate::traits::CatalogStore;

#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open `sqlite:` URLs, including `sqlite::memory:`.
    ///
    /// The pool holds a single connection: SQLite serializes writers anyway,
    /// and an in-memory database exists only as long as its connection.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        tracing::info!(url = %database_url, "SqliteStorage initialized");
        Ok(Self { pool })
    }

    /// Fresh private in-memory database.
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::new("sqlite::memory:").await
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_deref()),
    }
}

#[async_trait]
impl CatalogStore for SqliteStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        run_sqlite_migrations(&self.pool).await.map_err(|e| StorageError::Migration(e.to_string()))
    }

    async fn exists(
        &self,
        table: Table,
        keys: &[(&'static str, SqlValue)],
    ) -> Result<bool, StorageError> {
        let columns: Vec<&str> = keys.iter().map(|(column, _)| *column).collect();
        let statement = sql::exists_sql(Dialect::Sqlite, table, &columns)?;
        let mut query = sqlx::query(&statement);
        for (_, value) in keys {
            query = bind_value(query, value);
        }
        Ok(query.fetch_optional(&self.pool).await?.is_some())
    }

    async fn insert(
        &self,
        table: Table,
        columns: &[&'static str],
        values: &[SqlValue],
    ) -> Result<RowId, StorageError> {
        let statement = sql::insert_sql(Dialect::Sqlite, table, columns, values.len())?;
        let mut query = sqlx::query(&statement);
        for value in values {
            query = bind_value(query, value);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn find_id(
        &self,
        table: Table,
        column: &'static str,
        value: &SqlValue,
    ) -> Result<Option<RowId>, StorageError> {
        let statement = sql::find_id_sql(Dialect::Sqlite, table, column)?;
        let row = bind_value(sqlx::query(&statement), value).fetch_optional(&self.pool).await?;
        row.map(|r| r.try_get::<i64, _>("id")).transpose().map_err(StorageError::from)
    }

    async fn list_model_categories(&self) -> Result<Vec<StoredModelCategories>, StorageError> {
        let rows = sqlx::query(sql::MODEL_CATEGORIES_SQL).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| -> Result<StoredModelCategories, StorageError> {
                Ok(StoredModelCategories {
                    model_id: row.try_get("id")?,
                    categories: row.try_get("categories")?,
                })
            })
            .collect()
    }

    async fn count(&self, table: Table) -> Result<i64, StorageError> {
        let row = sqlx::query(&sql::count_sql(table)).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("n")?)
    }
}
