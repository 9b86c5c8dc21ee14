//! Shared constants for catalog-sync.

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Upper bound on in-flight units of work per synchronizer batch.
pub const DEFAULT_SYNC_CONCURRENCY: usize = 32;

/// Extra attempts for a unit whose storage call failed transiently.
pub const DEFAULT_STORAGE_RETRIES: usize = 2;

/// Backoff between storage retry attempts, in milliseconds.
pub const STORAGE_RETRY_DELAYS_MS: [u64; 3] = [100, 500, 1000];

/// Page size requested from the model list endpoint.
pub const DEFAULT_MODEL_LIMIT: u32 = 30_000;

/// Offset requested from the model list endpoint.
pub const DEFAULT_MODEL_OFFSET: u32 = 0;

/// Upstream catalog API base URL.
pub const DEFAULT_API_URL: &str = "https://fans-atlas.p.rapidapi.com";

/// Value sent in the `X-RapidAPI-Host` header.
pub const DEFAULT_API_HOST: &str = "fans-atlas.p.rapidapi.com";

/// HTTP timeout for upstream requests. The model list is a single large page.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
