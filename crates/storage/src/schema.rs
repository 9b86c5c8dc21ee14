//! Closed set of tables and columns the gateway is allowed to touch.

use crate::error::StorageError;

/// Row identifier returned by inserts. For `models` this is the upstream id.
pub type RowId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Models,
    Categories,
    ModelCategories,
}

const MODEL_COLUMNS: &[&str] = &[
    "id",
    "name",
    "username",
    "posts",
    "videos",
    "likes",
    "categories",
    "url",
    "image",
    "instagram",
    "tiktok",
    "twitter",
    "pornhub",
    "description",
    "price",
    "twitch",
    "reddit",
    "youtube",
    "location",
];

const CATEGORY_COLUMNS: &[&str] = &["id", "name"];

const MODEL_CATEGORY_COLUMNS: &[&str] = &["id", "model_id", "category_id"];

impl Table {
    /// Creation order; every table's foreign keys point at earlier entries.
    pub const ALL: [Self; 3] = [Self::Models, Self::Categories, Self::ModelCategories];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Categories => "categories",
            Self::ModelCategories => "model_categories",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Models => MODEL_COLUMNS,
            Self::Categories => CATEGORY_COLUMNS,
            Self::ModelCategories => MODEL_CATEGORY_COLUMNS,
        }
    }

    pub(crate) fn check_column(&self, column: &str) -> Result<(), StorageError> {
        if self.columns().contains(&column) {
            Ok(())
        } else {
            Err(StorageError::UnknownColumn { table: *self, column: column.to_owned() })
        }
    }
}

/// A bound parameter. Text is nullable; integer keys never are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(Option<String>),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(Some(value))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        Self::Text(value)
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(Some(v)) => f.write_str(v),
            Self::Text(None) => f.write_str("NULL"),
        }
    }
}
