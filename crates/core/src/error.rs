use thiserror::Error;

/// Errors raised while validating or decoding catalog records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("category list encoding: {0}")]
    CategoryEncoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
