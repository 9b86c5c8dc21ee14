//! PostgreSQL storage backend using sqlx.

use std::time::Duration;

use async_trait::async_trait;
use catalog_sync_core::{
    PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS,
    StoredModelCategories,
};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

use crate::error::StorageError;
use crate::pg_migrations::run_pg_migrations;
use crate::schema::{RowId, SqlValue, Table};
use crate::sql::{self, Dialect};
use crate::traits::CatalogStore;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_deref()),
    }
}

#[async_trait]
impl CatalogStore for PgStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        run_pg_migrations(&self.pool).await.map_err(|e| StorageError::Migration(e.to_string()))
    }

    async fn exists(
        &self,
        table: Table,
        keys: &[(&'static str, SqlValue)],
    ) -> Result<bool, StorageError> {
        let columns: Vec<&str> = keys.iter().map(|(column, _)| *column).collect();
        let statement = sql::exists_sql(Dialect::Postgres, table, &columns)?;
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
        let statement = sql::insert_sql(Dialect::Postgres, table, columns, values.len())?;
        let mut query = sqlx::query(&statement);
        for value in values {
            query = bind_value(query, value);
        }
        let row = query.fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("id")?)
    }

    async fn find_id(
        &self,
        table: Table,
        column: &'static str,
        value: &SqlValue,
    ) -> Result<Option<RowId>, StorageError> {
        let statement = sql::find_id_sql(Dialect::Postgres, table, column)?;
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
