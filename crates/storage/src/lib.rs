//! Storage gateway for catalog-sync
//!
//! Parameterized existence checks, inserts and id lookups against the
//! `models`, `categories` and `model_categories` tables. PostgreSQL in
//! production, SQLite for tests and local runs. No business logic lives here.

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("enable at least one of the `postgres` or `sqlite` features");

mod backend;
mod error;
#[cfg(feature = "postgres")]
mod pg_migrations;
#[cfg(feature = "postgres")]
mod pg_storage;
mod schema;
mod sql;
#[cfg(feature = "sqlite")]
mod sqlite_migrations;
#[cfg(feature = "sqlite")]
mod sqlite_storage;
#[cfg(all(test, feature = "sqlite"))]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
#[cfg(feature = "postgres")]
pub use pg_storage::PgStorage;
pub use schema::{RowId, SqlValue, Table};
#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
pub use traits::CatalogStore;
