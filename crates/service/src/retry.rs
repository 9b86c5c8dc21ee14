//! Bounded retry for units that hit a transient storage error.
//!
//! The whole unit is re-run, existence check included, so a write that
//! landed before the error surfaced is seen and skipped on the next attempt.

use std::future::Future;
use std::time::Duration;

use catalog_sync_core::STORAGE_RETRY_DELAYS_MS;
use catalog_sync_storage::StorageError;

pub(crate) async fn with_storage_retry<T, F, Fut>(
    retries: usize,
    key: &str,
    mut unit: F,
) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 0;
    loop {
        match unit().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < retries => {
                let delay_ms = STORAGE_RETRY_DELAYS_MS
                    .get(attempt)
                    .or(STORAGE_RETRY_DELAYS_MS.last())
                    .copied()
                    .unwrap_or(1000);
                attempt += 1;
                tracing::warn!(
                    key,
                    attempt,
                    retries,
                    error = %e,
                    "transient storage error, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            },
            Err(e) => return Err(e),
        }
    }
}
