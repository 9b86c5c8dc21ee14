use std::sync::Arc;

use anyhow::Result;
use catalog_sync_service::{SyncOptions, SyncPipeline};
use catalog_sync_source::{CatalogClient, SourceConfig};
use catalog_sync_storage::StorageBackend;

use crate::get_database_url;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Pass {
    Full,
    Catalog,
    Associations,
}

pub(crate) async fn run(pass: Pass) -> Result<()> {
    let database_url = get_database_url()?;
    // Fail on a missing key before touching the database.
    let client = match pass {
        Pass::Full | Pass::Catalog => Some(CatalogClient::new(SourceConfig::from_env()?)?),
        Pass::Associations => None,
    };
    let options = SyncOptions::from_env();

    let storage = Arc::new(StorageBackend::connect(&database_url).await?);
    tracing::info!(
        backend = storage.kind(),
        ?pass,
        concurrency = options.concurrency(),
        "starting sync"
    );

    let pipeline = SyncPipeline::new(storage.clone(), options);
    let result = match &client {
        Some(client) if matches!(pass, Pass::Catalog) => pipeline.run_catalog(client).await,
        Some(client) => pipeline.run_full(client).await,
        None => pipeline.run_associations().await,
    };
    storage.close().await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, transient = e.is_transient(), "sync aborted");
            return Err(e.into());
        },
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        let failed: usize = [&report.models, &report.categories, &report.associations]
            .into_iter()
            .flatten()
            .map(|r| r.failed.len())
            .sum();
        anyhow::bail!("{failed} unit(s) failed to sync");
    }
    Ok(())
}
