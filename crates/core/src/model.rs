//! Catalog records as delivered by the upstream feed.
//!
//! The feed is loosely typed: counters arrive as numbers or strings, optional
//! fields arrive as `null` or are missing. Everything is normalized here so
//! that nothing dynamically typed crosses into storage calls.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// One model from the upstream model list. `username` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Upstream-assigned id, stored verbatim as the primary key.
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "opaque_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub posts: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub videos: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub likes: Option<String>,
    #[serde(default, deserialize_with = "nullable_names")]
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub profile: ModelProfile,
}

/// Optional profile and social fields. Free-form, any may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    #[serde(default, deserialize_with = "opaque_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub instagram: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub tiktok: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub twitter: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub pornhub: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub twitch: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub reddit: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub youtube: Option<String>,
    #[serde(default, deserialize_with = "opaque_text")]
    pub location: Option<String>,
}

impl ModelRecord {
    #[must_use]
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            name: None,
            posts: None,
            videos: None,
            likes: None,
            categories: Vec::new(),
            profile: ModelProfile::default(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Category list in the text form persisted on the `models` row.
    pub fn encoded_categories(&self) -> Result<String> {
        encode_categories(&self.categories)
    }

    fn validate(self, index: usize) -> Result<Self> {
        if self.username.trim().is_empty() {
            return Err(CoreError::InvalidRecord { index, reason: "blank username".to_owned() });
        }
        if self.id < 0 {
            return Err(CoreError::InvalidRecord {
                index,
                reason: format!("negative id {}", self.id),
            });
        }
        Ok(self)
    }
}

/// A source record that failed boundary validation and was kept out of storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub username: Option<String>,
    pub reason: String,
}

/// Validated output of the model list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelBatch {
    pub records: Vec<ModelRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl ModelBatch {
    /// Deserialize and validate each raw element independently.
    ///
    /// A malformed element is quarantined in `rejected`; it never fails the batch.
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        let mut batch = Self::default();
        for (index, value) in values.into_iter().enumerate() {
            let username = value.get("username").and_then(Value::as_str).map(str::to_owned);
            let parsed = serde_json::from_value::<ModelRecord>(value)
                .map_err(|e| CoreError::InvalidRecord { index, reason: e.to_string() })
                .and_then(|record| record.validate(index));
            match parsed {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    tracing::warn!(
                        index,
                        username = ?username,
                        error = %e,
                        "rejecting malformed model record"
                    );
                    batch.rejected.push(RejectedRecord { index, username, reason: e.to_string() });
                },
            }
        }
        batch
    }
}

/// Persisted `(id, categories)` projection of a `models` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredModelCategories {
    pub model_id: i64,
    pub categories: Option<String>,
}

impl StoredModelCategories {
    /// Decode the persisted category list. `NULL` and JSON `null` are both empty.
    pub fn category_names(&self) -> Result<Vec<String>> {
        match self.categories.as_deref() {
            None => Ok(Vec::new()),
            Some(text) => decode_categories(text),
        }
    }
}

pub fn encode_categories(categories: &[String]) -> Result<String> {
    Ok(serde_json::to_string(categories)?)
}

pub fn decode_categories(text: &str) -> Result<Vec<String>> {
    let decoded: Option<Vec<String>> = serde_json::from_str(text)?;
    Ok(decoded.unwrap_or_default())
}

/// Drop blank entries from an upstream category list.
#[must_use]
pub fn normalize_category_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| {
            let keep = !name.trim().is_empty();
            if !keep {
                tracing::debug!("dropping blank category name");
            }
            keep
        })
        .collect()
}

fn opaque_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected text or number, got {other}"))),
    }
}

fn nullable_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
