use std::sync::Arc;

use catalog_sync_core::{SyncReport, SyncScope, UnitOutcome};
use catalog_sync_storage::{CatalogStore, SqlValue, StorageError, Table};
use futures_util::{StreamExt as _, stream};

use crate::key_locks::KeyLocks;
use crate::options::SyncOptions;
use crate::retry::with_storage_retry;

/// Inserts category names, skipping names already stored.
pub struct CategorySynchronizer {
    store: Arc<dyn CatalogStore>,
    options: SyncOptions,
    locks: KeyLocks,
}

impl CategorySynchronizer {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, options: SyncOptions) -> Self {
        Self { store, options, locks: KeyLocks::new() }
    }

    pub async fn sync(&self, names: &[String]) -> SyncReport {
        let mut report = SyncReport::new(SyncScope::Categories);
        let outcomes: Vec<(&str, UnitOutcome)> = stream::iter(names)
            .map(|name| async move { (name.as_str(), self.sync_one(name).await) })
            .buffer_unordered(self.options.concurrency())
            .collect()
            .await;
        for (name, outcome) in outcomes {
            report.record(name, outcome);
        }
        let report = report.finish();
        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed.len(),
            "category sync finished"
        );
        report
    }

    async fn sync_one(&self, name: &str) -> UnitOutcome {
        let _guard = self.locks.lock(name).await;
        let retries = self.options.storage_retries();
        let result = with_storage_retry(retries, name, || self.insert_if_absent(name)).await;
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(category = %name, error = %e, "failed to store category");
                UnitOutcome::Failed
            },
        }
    }

    async fn insert_if_absent(&self, name: &str) -> Result<UnitOutcome, StorageError> {
        if self.store.exists(Table::Categories, &[("name", SqlValue::text(name))]).await? {
            tracing::debug!(category = %name, "category exists, skipping");
            return Ok(UnitOutcome::Skipped);
        }
        let id = self.store.insert(Table::Categories, &["name"], &[SqlValue::text(name)]).await?;
        tracing::info!(category = %name, category_id = id, "category inserted");
        Ok(UnitOutcome::Inserted)
    }
}
