use std::sync::Arc;

use catalog_sync_core::{ModelRecord, SyncReport, SyncScope, UnitOutcome};
use catalog_sync_storage::{CatalogStore, SqlValue, StorageError, Table};
use futures_util::{StreamExt as _, stream};

use crate::key_locks::KeyLocks;
use crate::options::SyncOptions;
use crate::retry::with_storage_retry;

/// Inserts model records keyed on `username`, skipping rows already present.
pub struct ModelSynchronizer {
    store: Arc<dyn CatalogStore>,
    options: SyncOptions,
    locks: KeyLocks,
}

impl ModelSynchronizer {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, options: SyncOptions) -> Self {
        Self { store, options, locks: KeyLocks::new() }
    }

    /// Reconcile one batch. Returns once every record has been handled.
    pub async fn sync(&self, records: &[ModelRecord]) -> SyncReport {
        let mut report = SyncReport::new(SyncScope::Models);
        let outcomes: Vec<(&str, UnitOutcome)> = stream::iter(records)
            .map(|record| async move {
                (record.username.as_str(), self.sync_one(record).await)
            })
            .buffer_unordered(self.options.concurrency())
            .collect()
            .await;
        for (username, outcome) in outcomes {
            report.record(username, outcome);
        }
        let report = report.finish();
        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed.len(),
            "model sync finished"
        );
        report
    }

    async fn sync_one(&self, record: &ModelRecord) -> UnitOutcome {
        let _guard = self.locks.lock(record.username.as_str()).await;
        let values = match row_values(record) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(
                    username = %record.username,
                    error = %e,
                    "cannot encode model categories"
                );
                return UnitOutcome::Failed;
            },
        };
        let username = record.username.as_str();
        let result = with_storage_retry(self.options.storage_retries(), username, || {
            self.insert_if_absent(username, &values)
        })
        .await;
        match result {
            Ok(outcome) => outcome,
            Err(e) if e.is_duplicate() => self.classify_duplicate(username, &e).await,
            Err(e) => {
                tracing::warn!(username, error = %e, "failed to store model");
                UnitOutcome::Failed
            },
        }
    }

    /// A unique violation is a skip only when the username itself is stored.
    /// Anything else (an upstream id already taken by another username) loses
    /// the record and counts as failed.
    async fn classify_duplicate(&self, username: &str, error: &StorageError) -> UnitOutcome {
        match self.username_stored(username).await {
            Ok(true) => {
                tracing::debug!(username, error = %error, "model already stored");
                UnitOutcome::Skipped
            },
            Ok(false) => {
                tracing::warn!(username, error = %error, "model id already taken by another row");
                UnitOutcome::Failed
            },
            Err(e) => {
                tracing::warn!(username, error = %e, "failed to re-check model after conflict");
                UnitOutcome::Failed
            },
        }
    }

    async fn username_stored(&self, username: &str) -> Result<bool, StorageError> {
        self.store.exists(Table::Models, &[("username", SqlValue::text(username))]).await
    }

    async fn insert_if_absent(
        &self,
        username: &str,
        values: &[SqlValue],
    ) -> Result<UnitOutcome, StorageError> {
        if self.username_stored(username).await? {
            tracing::debug!(username, "model exists, skipping");
            return Ok(UnitOutcome::Skipped);
        }
        let id = self.store.insert(Table::Models, Table::Models.columns(), values).await?;
        tracing::info!(username, model_id = id, "model inserted");
        Ok(UnitOutcome::Inserted)
    }
}

/// Values in `Table::Models.columns()` order.
fn row_values(record: &ModelRecord) -> catalog_sync_core::Result<Vec<SqlValue>> {
    let profile = &record.profile;
    Ok(vec![
        SqlValue::Int(record.id),
        record.name.clone().into(),
        SqlValue::text(record.username.as_str()),
        record.posts.clone().into(),
        record.videos.clone().into(),
        record.likes.clone().into(),
        SqlValue::text(record.encoded_categories()?),
        profile.url.clone().into(),
        profile.image.clone().into(),
        profile.instagram.clone().into(),
        profile.tiktok.clone().into(),
        profile.twitter.clone().into(),
        profile.pornhub.clone().into(),
        profile.description.clone().into(),
        profile.price.clone().into(),
        profile.twitch.clone().into(),
        profile.reddit.clone().into(),
        profile.youtube.clone().into(),
        profile.location.clone().into(),
    ])
}
