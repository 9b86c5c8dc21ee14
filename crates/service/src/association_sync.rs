//! Model-to-category links.
//!
//! Each unit is one `(model id, category name)` candidate: resolve the name,
//! then insert the pair unless it is already stored. The pair key is locked
//! for the check and the insert, so a model listing the same category twice
//! still yields a single row.

use std::sync::Arc;

use catalog_sync_core::{SyncReport, SyncScope, UnitOutcome};
use catalog_sync_storage::{CatalogStore, RowId, SqlValue, StorageError, Table};
use futures_util::{StreamExt as _, stream};

use crate::error::ServiceError;
use crate::key_locks::KeyLocks;
use crate::options::SyncOptions;
use crate::retry::with_storage_retry;

#[derive(Debug, Clone, Copy)]
struct LinkKey {
    model_id: RowId,
    category_id: RowId,
}

impl std::fmt::Display for LinkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.model_id, self.category_id)
    }
}

pub struct AssociationSynchronizer {
    store: Arc<dyn CatalogStore>,
    options: SyncOptions,
    locks: KeyLocks,
}

impl AssociationSynchronizer {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, options: SyncOptions) -> Self {
        Self { store, options, locks: KeyLocks::new() }
    }

    /// Link one model to each named category.
    pub async fn sync(&self, model_id: RowId, category_names: &[String]) -> SyncReport {
        let candidates: Vec<(RowId, &str)> =
            category_names.iter().map(|name| (model_id, name.as_str())).collect();
        self.run(SyncReport::new(SyncScope::Associations), &candidates).await
    }

    /// Link every stored model to the categories recorded on its row.
    ///
    /// A model whose stored list cannot be decoded is counted as failed; the
    /// rest of the pass continues.
    pub async fn sync_stored_models(&self) -> Result<SyncReport, ServiceError> {
        let stored = self.store.list_model_categories().await?;
        let mut report = SyncReport::new(SyncScope::Associations);
        let mut decoded = Vec::with_capacity(stored.len());
        for model in &stored {
            match model.category_names() {
                Ok(names) => decoded.push((model.model_id, names)),
                Err(e) => {
                    tracing::warn!(
                        model_id = model.model_id,
                        error = %e,
                        "undecodable category list"
                    );
                    report.record(model.model_id.to_string(), UnitOutcome::Failed);
                },
            }
        }
        let candidates: Vec<(RowId, &str)> = decoded
            .iter()
            .flat_map(|(model_id, names)| names.iter().map(|name| (*model_id, name.as_str())))
            .collect();
        tracing::info!(
            models = stored.len(),
            candidates = candidates.len(),
            "syncing associations"
        );
        Ok(self.run(report, &candidates).await)
    }

    async fn run(&self, mut report: SyncReport, candidates: &[(RowId, &str)]) -> SyncReport {
        let outcomes: Vec<(String, UnitOutcome)> = stream::iter(candidates)
            .map(|&(model_id, name)| async move {
                (format!("{model_id}:{name}"), self.sync_one(model_id, name).await)
            })
            .buffer_unordered(self.options.concurrency())
            .collect()
            .await;
        for (key, outcome) in outcomes {
            report.record(key, outcome);
        }
        let report = report.finish();
        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            unresolved = report.unresolved.len(),
            failed = report.failed.len(),
            "association sync finished"
        );
        report
    }

    async fn sync_one(&self, model_id: RowId, name: &str) -> UnitOutcome {
        let key = format!("{model_id}:{name}");
        let lookup = SqlValue::text(name);
        let resolved = with_storage_retry(self.options.storage_retries(), &key, || {
            self.store.find_id(Table::Categories, "name", &lookup)
        })
        .await;
        let category_id = match resolved {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::warn!(model_id, category = %name, "category not stored, skipping link");
                return UnitOutcome::Unresolved;
            },
            Err(e) => {
                tracing::warn!(
                    model_id,
                    category = %name,
                    error = %e,
                    "failed to resolve category"
                );
                return UnitOutcome::Failed;
            },
        };

        let pair = LinkKey { model_id, category_id };
        let _guard = self.locks.lock(pair.to_string()).await;
        let result = with_storage_retry(self.options.storage_retries(), &key, || {
            self.insert_if_absent(pair)
        })
        .await;
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(model_id, category_id, error = %e, "failed to store association");
                UnitOutcome::Failed
            },
        }
    }

    async fn insert_if_absent(&self, pair: LinkKey) -> Result<UnitOutcome, StorageError> {
        let LinkKey { model_id, category_id } = pair;
        let keys =
            [("model_id", SqlValue::Int(model_id)), ("category_id", SqlValue::Int(category_id))];
        if self.store.exists(Table::ModelCategories, &keys).await? {
            tracing::debug!(model_id, category_id, "association exists");
            return Ok(UnitOutcome::Skipped);
        }
        self.store
            .insert(
                Table::ModelCategories,
                &["model_id", "category_id"],
                &[SqlValue::Int(model_id), SqlValue::Int(category_id)],
            )
            .await?;
        tracing::info!(model_id, category_id, "association inserted");
        Ok(UnitOutcome::Inserted)
    }
}
