//! Typed error enum for the source client.

use thiserror::Error;

/// Errors from upstream catalog API operations. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected payload in {context}: {detail}")]
    UnexpectedShape { context: String, detail: String },
    #[error("missing configuration: {0}")]
    MissingConfig(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl SourceError {
    /// Whether the upstream rejected our credentials.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::HttpStatus { code: 401 | 403, .. })
    }
}
