use super::{create_test_storage, insert_model};
use crate::{CatalogStore, SqlValue, StorageError, Table};

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let storage = create_test_storage().await;
    storage.ensure_schema().await.unwrap();
    for table in Table::ALL {
        assert_eq!(storage.count(table).await.unwrap(), 0, "{} should be empty", table.name());
    }
}

#[tokio::test]
async fn model_insert_keeps_upstream_id() {
    let storage = create_test_storage().await;
    let id = storage
        .insert(
            Table::Models,
            &["id", "username", "name", "posts"],
            &[
                SqlValue::Int(4242),
                SqlValue::text("alice"),
                SqlValue::Text(None),
                SqlValue::text("17"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(id, 4242);
    assert!(
        storage
            .exists(Table::Models, &[("username", SqlValue::text("alice"))])
            .await
            .unwrap()
    );
    assert!(
        !storage
            .exists(Table::Models, &[("username", SqlValue::text("bob"))])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn category_ids_are_assigned_locally() {
    let storage = create_test_storage().await;
    let first =
        storage.insert(Table::Categories, &["name"], &[SqlValue::text("x")]).await.unwrap();
    let second =
        storage.insert(Table::Categories, &["name"], &[SqlValue::text("y")]).await.unwrap();
    assert_ne!(first, second);

    let found = storage.find_id(Table::Categories, "name", &SqlValue::text("y")).await.unwrap();
    assert_eq!(found, Some(second));
    let missing =
        storage.find_id(Table::Categories, "name", &SqlValue::text("nope")).await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn duplicate_username_maps_to_duplicate() {
    let storage = create_test_storage().await;
    insert_model(&storage, 1, "alice", "[]").await;
    let err = storage
        .insert(
            Table::Models,
            &["id", "username"],
            &[SqlValue::Int(2), SqlValue::text("alice")],
        )
        .await
        .unwrap_err();
    assert!(err.is_duplicate(), "expected Duplicate, got {err:?}");
    assert!(!err.is_transient());
}

#[tokio::test]
async fn unknown_column_is_rejected_before_sql() {
    let storage = create_test_storage().await;
    let err = storage
        .exists(Table::Categories, &[("username", SqlValue::text("alice"))])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::UnknownColumn { table: Table::Categories, .. }));
}

#[tokio::test]
async fn list_model_categories_returns_raw_text() {
    let storage = create_test_storage().await;
    insert_model(&storage, 2, "bob", r#"["y"]"#).await;
    insert_model(&storage, 1, "alice", r#"["x","y"]"#).await;
    storage
        .insert(Table::Models, &["id", "username"], &[SqlValue::Int(3), SqlValue::text("carol")])
        .await
        .unwrap();

    let stored = storage.list_model_categories().await.unwrap();
    let ids: Vec<i64> = stored.iter().map(|m| m.model_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(stored[0].categories.as_deref(), Some(r#"["x","y"]"#));
    assert_eq!(stored[2].categories, None);
}
