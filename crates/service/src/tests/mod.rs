//! Synchronizer tests against in-memory SQLite, with a fault-injecting wrapper.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use catalog_sync_core::StoredModelCategories;
use catalog_sync_storage::{CatalogStore, RowId, SqlValue, SqliteStorage, StorageError, Table};

use crate::SyncOptions;

mod model_sync_tests;

pub(crate) async fn memory_store() -> SqliteStorage {
    let storage = SqliteStorage::in_memory().await.unwrap();
    storage.ensure_schema().await.unwrap();
    storage
}

pub(crate) fn test_options() -> SyncOptions {
    SyncOptions::default().with_concurrency(8).with_storage_retries(0)
}

pub(crate) async fn duplicate_pairs(storage: &SqliteStorage) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM (SELECT model_id, category_id FROM model_categories \
         GROUP BY model_id, category_id HAVING COUNT(*) > 1)",
    )
    .fetch_one(storage.pool())
    .await
    .unwrap()
}

pub(crate) async fn orphan_links(storage: &SqliteStorage) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM model_categories mc \
         LEFT JOIN models m ON m.id = mc.model_id \
         LEFT JOIN categories c ON c.id = mc.category_id \
         WHERE m.id IS NULL OR c.id IS NULL",
    )
    .fetch_one(storage.pool())
    .await
    .unwrap()
}

pub(crate) async fn stored_model(
    storage: &SqliteStorage,
    id: i64,
    username: &str,
    categories: &str,
) {
    storage
        .insert(
            Table::Models,
            &["id", "username", "categories"],
            &[SqlValue::Int(id), SqlValue::text(username), SqlValue::text(categories)],
        )
        .await
        .unwrap();
}

pub(crate) async fn stored_categories(storage: &SqliteStorage, names: &[&str]) {
    for name in names {
        storage.insert(Table::Categories, &["name"], &[SqlValue::text(*name)]).await.unwrap();
    }
}

/// Decrement `counter` if positive; true when it was.
fn take_one(counter: &AtomicUsize) -> bool {
    counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
}

/// Delegates to SQLite, failing selected inserts on demand.
pub(crate) struct FaultyStore {
    inner: SqliteStorage,
    /// Inserts binding any of these texts fail permanently.
    fail_on: HashSet<String>,
    /// Number of upcoming inserts that fail with a pool timeout.
    transient_inserts: AtomicUsize,
    insert_calls: AtomicUsize,
    /// Number of upcoming existence checks that report "absent" regardless.
    stale_exists: AtomicUsize,
    /// Pause after each existence check to widen the check/insert window.
    exists_delay: Option<Duration>,
}

impl FaultyStore {
    pub(crate) fn new(inner: SqliteStorage) -> Self {
        Self {
            inner,
            fail_on: HashSet::new(),
            transient_inserts: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            stale_exists: AtomicUsize::new(0),
            exists_delay: None,
        }
    }

    pub(crate) fn failing_on(mut self, text: &str) -> Self {
        self.fail_on.insert(text.to_owned());
        self
    }

    pub(crate) fn with_transient_inserts(self, count: usize) -> Self {
        self.transient_inserts.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_stale_exists(self, count: usize) -> Self {
        self.stale_exists.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_exists_delay(mut self, delay: Duration) -> Self {
        self.exists_delay = Some(delay);
        self
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CatalogStore for FaultyStore {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.inner.ensure_schema().await
    }

    async fn exists(
        &self,
        table: Table,
        keys: &[(&'static str, SqlValue)],
    ) -> Result<bool, StorageError> {
        let stale = take_one(&self.stale_exists);
        let found = self.inner.exists(table, keys).await? && !stale;
        if let Some(delay) = self.exists_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(found)
    }

    async fn insert(
        &self,
        table: Table,
        columns: &[&'static str],
        values: &[SqlValue],
    ) -> Result<RowId, StorageError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.transient_inserts) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        let forced = values.iter().any(|value| {
            matches!(value, SqlValue::Text(Some(text)) if self.fail_on.contains(text))
        });
        if forced {
            return Err(StorageError::Database(sqlx::Error::Protocol("forced failure".to_owned())));
        }
        self.inner.insert(table, columns, values).await
    }

    async fn find_id(
        &self,
        table: Table,
        column: &'static str,
        value: &SqlValue,
    ) -> Result<Option<RowId>, StorageError> {
        self.inner.find_id(table, column, value).await
    }

    async fn list_model_categories(&self) -> Result<Vec<StoredModelCategories>, StorageError> {
        self.inner.list_model_categories().await
    }

    async fn count(&self, table: Table) -> Result<i64, StorageError> {
        self.inner.count(table).await
    }
}
