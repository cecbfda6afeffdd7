//! Key selection and admin settings workflows.

use std::collections::BTreeSet;
use std::sync::Arc;

use metarev_core::config::RegistryConfig;
use metarev_core::{
    ActionToken, ConfigStore, CoreError, KeyRegistry, MetaValue, MetadataStore, Principal,
    RecordId,
};
use metarev_metadata::MemoryMetadataStore;
use metarev_service::admin::NO_CUSTOM_FIELDS;
use metarev_service::{AdminNotice, AdminSettings, SaveSelectionRequest, SelectionStore};
use serde_json::json;

fn admin() -> Principal {
    Principal::new("alice", vec!["manage_options".to_string()])
}

fn editor() -> Principal {
    Principal::new("bob", vec!["edit_posts".to_string()])
}

fn selection(store: &MemoryMetadataStore) -> SelectionStore {
    SelectionStore::new(Arc::new(store.clone()), Arc::new(store.clone()))
}

fn settings(store: &MemoryMetadataStore) -> AdminSettings {
    AdminSettings::new(
        Arc::new(selection(store)),
        ActionToken::new("test-secret"),
        "manage_options",
    )
}

async fn seed_keys(store: &MemoryMetadataStore, keys: &[&str]) {
    let owner = RecordId::new().into();
    for key in keys {
        store
            .insert_metadata(owner, key, &MetaValue::text("x"), false)
            .await
            .unwrap();
    }
}

fn registry_with_required(keys: &[&str]) -> KeyRegistry {
    let mut registry = KeyRegistry::new();
    for key in keys {
        registry.register_key(*key);
    }
    registry.seal_mandatory();
    registry
}

#[tokio::test]
async fn selectable_keys_exclude_builtins_and_required() {
    let store = MemoryMetadataStore::new();
    seed_keys(&store, &["_edit_last", "_edit_lock", "color", "size", "_byline"]).await;
    let registry = registry_with_required(&["_byline"]);

    let selectable = selection(&store).selectable_keys(&registry).await.unwrap();

    assert_eq!(
        selectable.into_iter().collect::<Vec<_>>(),
        vec!["color".to_string(), "size".to_string()]
    );
}

#[tokio::test]
async fn configured_exclusions_extend_builtins() {
    let store = MemoryMetadataStore::new();
    seed_keys(&store, &["color", "_thumbnail_id"]).await;
    let config = RegistryConfig {
        excluded_keys: vec!["_thumbnail_id".to_string()],
        ..RegistryConfig::default()
    };
    let selection =
        SelectionStore::from_config(&config, Arc::new(store.clone()), Arc::new(store.clone()));

    let selectable = selection.selectable_keys(&KeyRegistry::new()).await.unwrap();

    assert!(selection.excluded_keys().contains("_edit_lock"));
    assert_eq!(selectable.len(), 1);
    assert!(selectable.contains("color"));
}

#[tokio::test]
async fn selection_is_empty_until_saved() {
    let store = MemoryMetadataStore::new();
    let selection = selection(&store);
    assert!(selection.selected_keys().await.unwrap().is_empty());

    let keys: BTreeSet<String> = ["size", "color"].iter().map(|k| k.to_string()).collect();
    selection.save_selection(&keys).await.unwrap();

    assert_eq!(selection.selected_keys().await.unwrap(), keys);
    assert_eq!(
        store.get_config("metarev_selected_keys").await.unwrap(),
        Some(json!(["color", "size"]))
    );
}

#[tokio::test]
async fn malformed_selection_reads_as_empty() {
    let store = MemoryMetadataStore::new();
    store
        .set_config("metarev_selected_keys", &json!({"color": true}))
        .await
        .unwrap();

    assert!(selection(&store).selected_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn settings_view_marks_selected_keys() {
    let store = MemoryMetadataStore::new();
    seed_keys(&store, &["color", "size", "_byline"]).await;
    store
        .set_config("metarev_selected_keys", &json!(["size"]))
        .await
        .unwrap();
    let registry = registry_with_required(&["_byline"]);

    let view = settings(&store)
        .settings_view(&registry, &admin())
        .await
        .unwrap();

    assert_eq!(view.required, vec!["_byline".to_string()]);
    assert_eq!(view.selectable.len(), 2);
    assert!(!view.selectable[0].selected);
    assert_eq!(view.selectable[1].key, "size");
    assert!(view.selectable[1].selected);
    assert!(view.message.is_none());
    assert_eq!(view.action, "metarev_save_keys");
}

#[tokio::test]
async fn settings_view_reports_missing_custom_fields() {
    let store = MemoryMetadataStore::new();
    let view = settings(&store)
        .settings_view(&KeyRegistry::new(), &admin())
        .await
        .unwrap();

    assert!(view.selectable.is_empty());
    assert_eq!(view.message.as_deref(), Some(NO_CUSTOM_FIELDS));
}

#[tokio::test]
async fn save_with_valid_token_updates_selection() {
    let store = MemoryMetadataStore::new();
    let settings = settings(&store);
    let request = SaveSelectionRequest {
        token: settings.issue_token(&admin()),
        keys: vec!["color".to_string(), "color".to_string()],
    };

    let notice = settings.save(&admin(), &request).await.unwrap();

    assert_eq!(notice, AdminNotice::SelectionUpdated);
    assert_eq!(notice.message(), "Selected meta keys to be versioned have been updated.");
    assert_eq!(
        store.get_config("metarev_selected_keys").await.unwrap(),
        Some(json!(["color"]))
    );
}

#[tokio::test]
async fn save_without_capability_changes_nothing() {
    let store = MemoryMetadataStore::new();
    let settings = settings(&store);
    let request = SaveSelectionRequest {
        token: settings.issue_token(&editor()),
        keys: vec!["color".to_string()],
    };

    let err = settings.save(&editor(), &request).await.unwrap_err();

    assert!(matches!(err, CoreError::UnauthorizedSave { .. }));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn save_with_invalid_token_changes_nothing() {
    let store = MemoryMetadataStore::new();
    let settings = settings(&store);

    for token in ["", "not-a-token"] {
        let request = SaveSelectionRequest {
            token: token.to_string(),
            keys: vec!["color".to_string()],
        };
        let err = settings.save(&admin(), &request).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidToken { .. }));
    }

    // A token issued to someone else does not transfer.
    let other = Principal::new("carol", vec!["manage_options".to_string()]);
    let request = SaveSelectionRequest {
        token: settings.issue_token(&other),
        keys: vec!["color".to_string()],
    };
    assert!(settings.save(&admin(), &request).await.is_err());
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn save_with_no_keys_clears_selection() {
    let store = MemoryMetadataStore::new();
    store
        .set_config("metarev_selected_keys", &json!(["color"]))
        .await
        .unwrap();
    let settings = settings(&store);
    let request = SaveSelectionRequest {
        token: settings.issue_token(&admin()),
        keys: Vec::new(),
    };

    settings.save(&admin(), &request).await.unwrap();

    assert_eq!(
        store.get_config("metarev_selected_keys").await.unwrap(),
        Some(json!([]))
    );
}
