use std::collections::BTreeSet;
use std::path::PathBuf;

use metarev_core::{ConfigStore, MetaValue, MetadataStore, OwnerId, RecordId, SnapshotId};
use metarev_metadata::{create_sqlite_pool, run_migrations, SqliteConfigStore, SqliteMetadataStore};
use serde_json::json;
use uuid::Uuid;

struct TestContext {
    metadata: SqliteMetadataStore,
    options: SqliteConfigStore,
}

async fn setup_context() -> TestContext {
    let db_path = temp_db_path();
    let database_url = format!("sqlite://{}", db_path.display());
    let pool = create_sqlite_pool(&database_url, 4)
        .await
        .expect("failed to create pool");
    run_migrations(&pool).await.expect("failed migrations");

    TestContext {
        metadata: SqliteMetadataStore::new(pool.clone()),
        options: SqliteConfigStore::new(pool),
    }
}

fn temp_db_path() -> PathBuf {
    let filename = format!("metarev-metadata-test-{}.db", Uuid::now_v7());
    std::env::temp_dir().join(filename)
}

#[tokio::test]
async fn missing_metadata_reads_as_none() {
    let ctx = setup_context().await;
    let owner = OwnerId::Record(RecordId::new());

    let value = ctx.metadata.get_metadata(owner, "color").await.expect("get");
    assert!(value.is_none());
}

#[tokio::test]
async fn insert_then_get_returns_first_value() {
    let ctx = setup_context().await;
    let owner = OwnerId::Record(RecordId::new());

    ctx.metadata
        .insert_metadata(owner, "color", &MetaValue::text("blue"), false)
        .await
        .expect("insert blue");
    ctx.metadata
        .insert_metadata(owner, "color", &MetaValue::text("green"), false)
        .await
        .expect("insert green");

    let first = ctx.metadata.get_metadata(owner, "color").await.expect("get");
    assert_eq!(first, Some(MetaValue::text("blue")));

    let all = ctx.metadata.get_all_metadata(owner, "color").await.expect("get all");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn unique_insert_refuses_second_entry() {
    let ctx = setup_context().await;
    let owner = OwnerId::Record(RecordId::new());

    let inserted = ctx
        .metadata
        .insert_metadata(owner, "color", &MetaValue::text("blue"), true)
        .await
        .expect("first insert");
    assert!(inserted);

    let inserted = ctx
        .metadata
        .insert_metadata(owner, "color", &MetaValue::text("red"), true)
        .await
        .expect("second insert");
    assert!(!inserted);

    let all = ctx.metadata.get_all_metadata(owner, "color").await.expect("get all");
    assert_eq!(all, vec![MetaValue::text("blue")]);
}

#[tokio::test]
async fn owners_are_isolated_by_kind() {
    let ctx = setup_context().await;
    let uuid = Uuid::now_v7();
    let record = OwnerId::Record(RecordId::from_uuid(uuid));
    let snapshot = OwnerId::Snapshot(SnapshotId::from_uuid(uuid));

    ctx.metadata
        .insert_metadata(snapshot, "color", &MetaValue::text("red"), true)
        .await
        .expect("insert on snapshot");

    assert!(ctx
        .metadata
        .get_metadata(record, "color")
        .await
        .expect("get on record")
        .is_none());
}

#[tokio::test]
async fn update_overwrites_existing_and_creates_missing() {
    let ctx = setup_context().await;
    let owner = OwnerId::Record(RecordId::new());

    ctx.metadata
        .update_metadata(owner, "color", &MetaValue::text("blue"))
        .await
        .expect("update creates");
    ctx.metadata
        .update_metadata(owner, "color", &MetaValue::text("red"))
        .await
        .expect("update overwrites");

    let all = ctx.metadata.get_all_metadata(owner, "color").await.expect("get all");
    assert_eq!(all, vec![MetaValue::text("red")]);
}

#[tokio::test]
async fn binary_payloads_survive_storage() {
    let ctx = setup_context().await;
    let owner = OwnerId::Snapshot(SnapshotId::new());
    let payload = MetaValue::from(vec![0u8, 159, 146, 150]);

    ctx.metadata
        .insert_metadata(owner, "blob", &payload, false)
        .await
        .expect("insert");

    let fetched = ctx.metadata.get_metadata(owner, "blob").await.expect("get");
    assert_eq!(fetched, Some(payload));
}

#[tokio::test]
async fn distinct_keys_are_sorted_and_deduplicated() {
    let ctx = setup_context().await;
    let record = OwnerId::Record(RecordId::new());
    let snapshot = OwnerId::Snapshot(SnapshotId::new());

    for (owner, key) in [(record, "zeta"), (record, "alpha"), (snapshot, "alpha")] {
        ctx.metadata
            .insert_metadata(owner, key, &MetaValue::text("x"), false)
            .await
            .expect("insert");
    }

    let keys = ctx.metadata.list_distinct_metadata_keys().await.expect("list");
    assert_eq!(
        keys,
        BTreeSet::from(["alpha".to_string(), "zeta".to_string()])
    );
}

#[tokio::test]
async fn options_round_trip_and_overwrite() {
    let ctx = setup_context().await;

    assert!(ctx
        .options
        .get_config("metarev_selected_keys")
        .await
        .expect("get unset")
        .is_none());

    ctx.options
        .set_config("metarev_selected_keys", &json!(["featured"]))
        .await
        .expect("first set");
    ctx.options
        .set_config("metarev_selected_keys", &json!(["featured", "subtitle"]))
        .await
        .expect("second set");

    let stored = ctx
        .options
        .get_config("metarev_selected_keys")
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored, json!(["featured", "subtitle"]));
}
