//! Gateway tests against an in-memory SQLite database.

use crate::{CatalogStore, SqlValue, SqliteStorage, Table};

pub(crate) async fn create_test_storage() -> SqliteStorage {
    let storage = SqliteStorage::in_memory().await.unwrap();
    storage.ensure_schema().await.unwrap();
    storage
}

pub(crate) async fn insert_model(
    storage: &SqliteStorage,
    id: i64,
    username: &str,
    categories: &str,
) {
    storage
        .insert(
            Table::Models,
            &["id", "username", "categories"],
            &[SqlValue::Int(id), SqlValue::text(username), SqlValue::text(categories)],
        )
        .await
        .unwrap();
}

mod gateway_tests;
