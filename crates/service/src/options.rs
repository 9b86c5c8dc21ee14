use catalog_sync_core::{DEFAULT_STORAGE_RETRIES, DEFAULT_SYNC_CONCURRENCY, env_parse_with_default};

/// Knobs shared by every synchronizer.
///
/// Fields are private so `concurrency` can never be zero: a zero-width
/// fan-out would never poll a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Units of work in flight per batch.
    concurrency: usize,
    /// Extra attempts for a unit that failed with a transient storage error.
    storage_retries: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { concurrency: DEFAULT_SYNC_CONCURRENCY, storage_retries: DEFAULT_STORAGE_RETRIES }
    }
}

impl SyncOptions {
    /// Read `CATALOG_SYNC_CONCURRENCY` and `CATALOG_SYNC_STORAGE_RETRIES`.
    #[must_use]
    pub fn from_env() -> Self {
        let raw_concurrency =
            env_parse_with_default("CATALOG_SYNC_CONCURRENCY", DEFAULT_SYNC_CONCURRENCY);
        let concurrency = raw_concurrency.max(1);
        if concurrency != raw_concurrency {
            tracing::warn!(
                original = raw_concurrency,
                clamped = concurrency,
                "CATALOG_SYNC_CONCURRENCY clamped to at least 1"
            );
        }
        let storage_retries =
            env_parse_with_default("CATALOG_SYNC_STORAGE_RETRIES", DEFAULT_STORAGE_RETRIES);
        Self { concurrency, storage_retries }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn storage_retries(&self) -> usize {
        self.storage_retries
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_storage_retries(mut self, storage_retries: usize) -> Self {
        self.storage_retries = storage_retries;
        self
    }
}
