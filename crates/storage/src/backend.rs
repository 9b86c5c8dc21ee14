//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use catalog_sync_core::StoredModelCategories;

use crate::error::StorageError;
use crate::schema::{RowId, SqlValue, Table};
use crate::traits::CatalogStore;

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            #[cfg(feature = "postgres")]
            StorageBackend::Postgres(s) => {
                <crate::PgStorage as CatalogStore>::$method(s, $($arg),*).await
            },
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite(s) => {
                <crate::SqliteStorage as CatalogStore>::$method(s, $($arg),*).await
            },
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    #[cfg(feature = "postgres")]
    Postgres(crate::PgStorage),
    #[cfg(feature = "sqlite")]
    Sqlite(crate::SqliteStorage),
}

impl StorageBackend {
    /// Pick a backend from the URL scheme.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        #[cfg(feature = "postgres")]
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            return Ok(Self::Postgres(crate::PgStorage::new(database_url).await?));
        }
        #[cfg(feature = "sqlite")]
        if database_url.starts_with("sqlite:") {
            return Ok(Self::Sqlite(crate::SqliteStorage::new(database_url).await?));
        }
        Err(StorageError::UnsupportedUrl(redact_url(database_url)))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => "postgres",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
        }
    }

    pub async fn close(&self) {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(s) => s.close().await,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(s) => s.close().await,
        }
    }
}

/// Strip credentials before a URL reaches logs or error messages.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        },
        _ => url.to_owned(),
    }
}

#[async_trait]
impl CatalogStore for StorageBackend {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        dispatch!(self, ensure_schema())
    }

    async fn exists(
        &self,
        table: Table,
        keys: &[(&'static str, SqlValue)],
    ) -> Result<bool, StorageError> {
        dispatch!(self, exists(table, keys))
    }

    async fn insert(
        &self,
        table: Table,
        columns: &[&'static str],
        values: &[SqlValue],
    ) -> Result<RowId, StorageError> {
        dispatch!(self, insert(table, columns, values))
    }

    async fn find_id(
        &self,
        table: Table,
        column: &'static str,
        value: &SqlValue,
    ) -> Result<Option<RowId>, StorageError> {
        dispatch!(self, find_id(table, column, value))
    }

    async fn list_model_categories(&self) -> Result<Vec<StoredModelCategories>, StorageError> {
        dispatch!(self, list_model_categories())
    }

    async fn count(&self, table: Table) -> Result<i64, StorageError> {
        dispatch!(self, count(table))
    }
}
