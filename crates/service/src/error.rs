//! Typed error enum for the service layer.
//!
//! Only run-level failures surface here. Per-unit storage failures are
//! logged and recorded in the `SyncReport` instead.

use catalog_sync_core::CoreError;
use catalog_sync_source::SourceError;
use catalog_sync_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation that the whole pass depends on (provisioning, read-back).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Upstream fetch failed; nothing downstream has valid input.
    #[error("source: {0}")]
    Source(#[from] SourceError),

    #[error("core: {0}")]
    Core(#[from] CoreError),
}

impl ServiceError {
    /// Whether this error is likely transient (worth re-running the job).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Source(SourceError::HttpRequest(_)) => true,
            Self::Source(SourceError::HttpStatus { code, .. }) => {
                matches!(code, 429 | 500 | 502 | 503 | 504)
            },
            _ => false,
        }
    }
}
