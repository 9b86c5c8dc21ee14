use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct CountRequest<'a> {
    pub categories: &'a [String],
}

/// `models/count` answers with a bare number or `{"count": n}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CountResponse {
    Bare(u64),
    Wrapped { count: u64 },
}

impl CountResponse {
    pub fn value(&self) -> u64 {
        match self {
            Self::Bare(n) | Self::Wrapped { count: n } => *n,
        }
    }
}

/// A category list entry: a plain name or an object carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CategoryEntry {
    Name(String),
    Object { name: String },
}

impl CategoryEntry {
    pub fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}
