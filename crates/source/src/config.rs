//! Upstream API settings.

use catalog_sync_core::{
    DEFAULT_API_HOST, DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MODEL_LIMIT,
    DEFAULT_MODEL_OFFSET, env_parse_with_default, env_string_or,
};

use crate::error::SourceError;

#[derive(Clone)]
pub struct SourceConfig {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
    pub model_limit: u32,
    pub model_offset: u32,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("api_key", &"***")
            .field("api_host", &self.api_host)
            .field("base_url", &self.base_url)
            .field("model_limit", &self.model_limit)
            .field("model_offset", &self.model_offset)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SourceConfig {
    #[must_use]
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            api_host: DEFAULT_API_HOST.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            model_limit: DEFAULT_MODEL_LIMIT,
            model_offset: DEFAULT_MODEL_OFFSET,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Read `RAPIDAPI_KEY` (required), `RAPIDAPI_HOST`, `CATALOG_API_URL`,
    /// `CATALOG_MODEL_LIMIT`, `CATALOG_MODEL_OFFSET`, `CATALOG_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, SourceError> {
        let api_key = std::env::var("RAPIDAPI_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SourceError::MissingConfig("RAPIDAPI_KEY must be set".to_owned()))?;
        let mut config = Self::new(api_key, env_string_or("CATALOG_API_URL", DEFAULT_API_URL));
        config.api_host = env_string_or("RAPIDAPI_HOST", DEFAULT_API_HOST);
        config.model_limit = env_parse_with_default("CATALOG_MODEL_LIMIT", DEFAULT_MODEL_LIMIT);
        config.model_offset = env_parse_with_default("CATALOG_MODEL_OFFSET", DEFAULT_MODEL_OFFSET);
        config.timeout_secs =
            env_parse_with_default("CATALOG_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS);
        Ok(config)
    }

    #[must_use]
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    #[must_use]
    pub fn with_window(mut self, limit: u32, offset: u32) -> Self {
        self.model_limit = limit;
        self.model_offset = offset;
        self
    }
}
