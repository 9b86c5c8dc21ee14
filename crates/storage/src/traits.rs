//! Storage gateway trait.
//!
//! Implemented by each backend and by `StorageBackend` through enum dispatch.

use async_trait::async_trait;
use catalog_sync_core::StoredModelCategories;

use crate::error::StorageError;
use crate::schema::{RowId, SqlValue, Table};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Create `models`, `categories` and `model_categories` if absent.
    async fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Whether a row matching every `(column, value)` pair exists.
    async fn exists(
        &self,
        table: Table,
        keys: &[(&'static str, SqlValue)],
    ) -> Result<bool, StorageError>;

    /// Insert one row. Returns its id.
    async fn insert(
        &self,
        table: Table,
        columns: &[&'static str],
        values: &[SqlValue],
    ) -> Result<RowId, StorageError>;

    /// Id of the first row whose `column` equals `value`.
    async fn find_id(
        &self,
        table: Table,
        column: &'static str,
        value: &SqlValue,
    ) -> Result<Option<RowId>, StorageError>;

    /// `(id, categories)` of every stored model, ordered by id.
    async fn list_model_categories(&self) -> Result<Vec<StoredModelCategories>, StorageError>;

    /// Row count of `table`.
    async fn count(&self, table: Table) -> Result<i64, StorageError>;
}
