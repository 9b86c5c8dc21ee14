use catalog_sync_core::{ModelBatch, ModelRecord, normalize_category_names};
use reqwest::RequestBuilder;
use serde_json::Value;

use crate::api_types::{CategoryEntry, CountRequest, CountResponse};
use crate::config::SourceConfig;
use crate::error::SourceError;

/// Client for the upstream catalog API.
pub struct CatalogClient {
    pub(crate) client: reqwest::Client,
    pub(crate) config: SourceConfig,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .finish()
    }
}

impl CatalogClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::ClientInit(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.config.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-RapidAPI-Key", &self.config.api_key)
            .header("X-RapidAPI-Host", &self.config.api_host)
    }

    /// Send once and decode the body as JSON. No retries: a failed fetch aborts the run.
    async fn send_json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Value, SourceError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, 500).to_owned(),
            });
        }
        serde_json::from_str(&body).map_err(|e| SourceError::JsonParse {
            context: format!("{context} (body: {})", truncate(&body, 200)),
            source: e,
        })
    }

    /// Fetch the full model list in one window (`limit`/`offset` from config).
    ///
    /// Malformed records are quarantined in `ModelBatch::rejected`.
    pub async fn fetch_model_list(&self) -> Result<ModelBatch, SourceError> {
        let request = self
            .client
            .post(self.url("models/list"))
            .query(&[("limit", self.config.model_limit), ("offset", self.config.model_offset)])
            .json(&serde_json::json!({}));
        let body = self.send_json(request, "model list").await?;
        let values = into_array(body, "model list")?;
        let batch = ModelBatch::from_values(values);
        tracing::info!(
            accepted = batch.records.len(),
            rejected = batch.rejected.len(),
            "fetched model list"
        );
        Ok(batch)
    }

    /// Fetch every category name. Entries that are neither strings nor
    /// `{"name": ...}` objects are dropped with a warning.
    pub async fn fetch_category_list(&self) -> Result<Vec<String>, SourceError> {
        let request = self.client.get(self.url("categories/list"));
        let body = self.send_json(request, "category list").await?;
        let values = into_array(body, "category list")?;
        let mut names = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<CategoryEntry>(value) {
                Ok(entry) => names.push(entry.into_name()),
                Err(e) => tracing::warn!(index, error = %e, "dropping malformed category entry"),
            }
        }
        let names = normalize_category_names(names);
        tracing::info!(count = names.len(), "fetched category list");
        Ok(names)
    }

    /// Look up a single model by username. `None` on 404.
    pub async fn fetch_model(&self, username: &str) -> Result<Option<ModelRecord>, SourceError> {
        let request = self.client.get(self.url("models/one")).query(&[("username", username)]);
        let body = match self.send_json(request, "model lookup").await {
            Ok(body) => body,
            Err(SourceError::HttpStatus { code: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if body.is_null() {
            return Ok(None);
        }
        let mut batch = ModelBatch::from_values(vec![body]);
        match batch.rejected.pop() {
            Some(rejected) => Err(SourceError::UnexpectedShape {
                context: "model lookup".to_owned(),
                detail: rejected.reason,
            }),
            None => Ok(batch.records.pop()),
        }
    }

    /// Number of upstream models tagged with all of `categories`.
    pub async fn count_models(&self, categories: &[String]) -> Result<u64, SourceError> {
        let request =
            self.client.post(self.url("models/count")).json(&CountRequest { categories });
        let body = self.send_json(request, "model count").await?;
        let count: CountResponse = serde_json::from_value(body).map_err(|e| {
            SourceError::JsonParse { context: "model count".to_owned(), source: e }
        })?;
        Ok(count.value())
    }
}

/// The list endpoints answer with a bare array or `{"data": [...]}`.
fn into_array(body: Value, context: &str) -> Result<Vec<Value>, SourceError> {
    match body {
        Value::Array(values) => Ok(values),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(values)) => Ok(values),
            _ => Err(SourceError::UnexpectedShape {
                context: context.to_owned(),
                detail: "object without a `data` array".to_owned(),
            }),
        },
        other => Err(SourceError::UnexpectedShape {
            context: context.to_owned(),
            detail: format!("expected array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub(crate) fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
