use std::sync::Arc;
use std::time::Duration;

use catalog_sync_core::ModelRecord;
use catalog_sync_storage::{CatalogStore, SqlValue, Table};

use super::{FaultyStore, memory_store, test_options};
use crate::{ModelSynchronizer, SyncOptions};

#[tokio::test]
async fn stores_every_attribute() {
    let storage = memory_store().await;
    let sync = ModelSynchronizer::new(Arc::new(storage.clone()), test_options());
    let mut record = ModelRecord::new(42, "alice").with_name("Alice").with_categories(["x", "y"]);
    record.likes = Some("900".to_owned());
    record.profile.twitter = Some("@alice".to_owned());

    let report = sync.sync(&[record]).await;
    assert_eq!(report.inserted, 1);

    type Row = (Option<String>, Option<String>, Option<String>, Option<String>);
    let (name, likes, categories, twitter): Row =
        sqlx::query_as("SELECT name, likes, categories, twitter FROM models WHERE id = 42")
            .fetch_one(storage.pool())
            .await
            .unwrap();
    assert_eq!(name.as_deref(), Some("Alice"));
    assert_eq!(likes.as_deref(), Some("900"));
    assert_eq!(categories.as_deref(), Some(r#"["x","y"]"#));
    assert_eq!(twitter.as_deref(), Some("@alice"));
}

#[tokio::test]
async fn existing_username_is_skipped() {
    let storage = memory_store().await;
    let sync = ModelSynchronizer::new(Arc::new(storage.clone()), test_options());
    let records = vec![ModelRecord::new(1, "a"), ModelRecord::new(2, "b")];

    assert_eq!(sync.sync(&records).await.inserted, 2);
    let rerun = sync.sync(&records).await;
    assert_eq!(rerun.inserted, 0);
    assert_eq!(rerun.skipped, 2);
    assert_eq!(storage.count(Table::Models).await.unwrap(), 2);
}

#[tokio::test]
async fn stored_row_is_not_updated() {
    let storage = memory_store().await;
    let sync = ModelSynchronizer::new(Arc::new(storage.clone()), test_options());
    sync.sync(&[ModelRecord::new(1, "a").with_name("Before")]).await;
    sync.sync(&[ModelRecord::new(1, "a").with_name("After")]).await;

    let name: Option<String> = sqlx::query_scalar("SELECT name FROM models WHERE id = 1")
        .fetch_one(storage.pool())
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Before"));
}

#[tokio::test]
async fn duplicate_username_in_batch_yields_one_row() {
    let storage = memory_store().await;
    let store = FaultyStore::new(storage.clone())
        .with_exists_delay(Duration::from_millis(20))
        .into_arc();
    let sync = ModelSynchronizer::new(store, test_options());

    let report = sync.sync(&[ModelRecord::new(1, "dup"), ModelRecord::new(2, "dup")]).await;

    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(storage.count(Table::Models).await.unwrap(), 1);
}

#[tokio::test]
async fn id_clash_under_new_username_is_a_failure() {
    let storage = memory_store().await;
    let sync = ModelSynchronizer::new(Arc::new(storage.clone()), test_options());
    sync.sync(&[ModelRecord::new(7, "first")]).await;

    let report = sync.sync(&[ModelRecord::new(7, "renamed")]).await;

    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, vec!["renamed"]);
    let renamed = [("username", SqlValue::text("renamed"))];
    assert!(!storage.exists(Table::Models, &renamed).await.unwrap());
}

#[tokio::test]
async fn username_conflict_found_by_insert_is_skipped() {
    let storage = memory_store().await;
    ModelSynchronizer::new(Arc::new(storage.clone()), test_options())
        .sync(&[ModelRecord::new(1, "taken")])
        .await;
    // The existence check misses the stored row, as if another writer won the race.
    let store = FaultyStore::new(storage.clone()).with_stale_exists(1).into_arc();
    let sync = ModelSynchronizer::new(store, test_options());

    let report = sync.sync(&[ModelRecord::new(2, "taken")]).await;

    assert_eq!(report.skipped, 1);
    assert!(report.failed.is_empty());
    assert_eq!(storage.count(Table::Models).await.unwrap(), 1);
}

#[tokio::test]
async fn minimal_concurrency_still_drains_the_batch() {
    let storage = memory_store().await;
    let options = SyncOptions::default().with_concurrency(0).with_storage_retries(0);
    let sync = ModelSynchronizer::new(Arc::new(storage.clone()), options);
    let records = vec![ModelRecord::new(1, "a"), ModelRecord::new(2, "b")];

    let report = tokio::time::timeout(Duration::from_secs(5), sync.sync(&records))
        .await
        .expect("sync must complete");

    assert_eq!(report.inserted, 2);
}

#[tokio::test]
async fn failed_record_is_reported_by_username() {
    let storage = memory_store().await;
    let store = FaultyStore::new(storage.clone()).failing_on("bad").into_arc();
    let sync = ModelSynchronizer::new(store, test_options());

    let records: Vec<_> = ["ok1", "bad", "ok2"]
        .iter()
        .enumerate()
        .map(|(i, username)| ModelRecord::new(i as i64 + 1, *username))
        .collect();
    let report = sync.sync(&records).await;

    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, vec!["bad"]);
    assert_eq!(storage.count(Table::Models).await.unwrap(), 2);
}
