//! Run sequencing: provision, fetch, then write.

use std::sync::Arc;

use catalog_sync_core::PipelineReport;
use catalog_sync_source::CatalogClient;
use catalog_sync_storage::CatalogStore;

use crate::association_sync::AssociationSynchronizer;
use crate::category_sync::CategorySynchronizer;
use crate::error::ServiceError;
use crate::model_sync::ModelSynchronizer;
use crate::options::SyncOptions;

/// Sequences the synchronizers over one shared store.
///
/// Only the catalog pass talks to the upstream API, so the client is passed
/// to the runs that need it rather than held here.
pub struct SyncPipeline {
    store: Arc<dyn CatalogStore>,
    models: ModelSynchronizer,
    categories: CategorySynchronizer,
    associations: AssociationSynchronizer,
}

impl SyncPipeline {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, options: SyncOptions) -> Self {
        Self {
            models: ModelSynchronizer::new(Arc::clone(&store), options),
            categories: CategorySynchronizer::new(Arc::clone(&store), options),
            associations: AssociationSynchronizer::new(Arc::clone(&store), options),
            store,
        }
    }

    pub async fn ensure_schema(&self) -> Result<(), ServiceError> {
        self.store.ensure_schema().await?;
        Ok(())
    }

    /// Models and categories.
    ///
    /// Both lists are fetched before anything is written, so an upstream
    /// failure leaves storage untouched.
    pub async fn run_catalog(
        &self,
        client: &CatalogClient,
    ) -> Result<PipelineReport, ServiceError> {
        self.ensure_schema().await?;
        let batch = client.fetch_model_list().await?;
        let names = client.fetch_category_list().await?;
        tracing::info!(
            models = batch.records.len(),
            rejected = batch.rejected.len(),
            categories = names.len(),
            "catalog fetched, writing"
        );
        let (models, categories) =
            tokio::join!(self.models.sync(&batch.records), self.categories.sync(&names));
        Ok(PipelineReport {
            models: Some(models),
            categories: Some(categories),
            associations: None,
            rejected: batch.rejected,
        })
    }

    /// Link stored models to stored categories.
    pub async fn run_associations(&self) -> Result<PipelineReport, ServiceError> {
        self.ensure_schema().await?;
        let associations = self.associations.sync_stored_models().await?;
        Ok(PipelineReport { associations: Some(associations), ..PipelineReport::default() })
    }

    /// Catalog pass, then association pass. Categories must be stored before
    /// names can resolve.
    pub async fn run_full(&self, client: &CatalogClient) -> Result<PipelineReport, ServiceError> {
        let mut report = self.run_catalog(client).await?;
        report.associations = self.run_associations().await?.associations;
        Ok(report)
    }
}
