//! Router-level tests over the in-memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metarev_core::config::{AdminConfig, RegistryConfig};
use metarev_core::{ActionToken, MetaValue, MetadataStore, OwnerId, RecordId, SnapshotId};
use metarev_metadata::MemoryMetadataStore;
use metarev_rest::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(store: &MemoryMetadataStore, mandatory_keys: &[&str]) -> Router {
    let registry = RegistryConfig {
        mandatory_keys: mandatory_keys.iter().map(|k| k.to_string()).collect(),
        ..RegistryConfig::default()
    };
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        registry,
        AdminConfig::default(),
        ActionToken::new("api-test-secret"),
    );
    router(Arc::new(state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let store = MemoryMetadataStore::new();
    let response = app(&store, &[])
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn snapshot_event_copies_mandatory_keys() {
    let store = MemoryMetadataStore::new();
    let record = RecordId::new();
    let snapshot = SnapshotId::new();
    store
        .insert_metadata(OwnerId::Record(record), "color", &MetaValue::text("blue"), false)
        .await
        .unwrap();

    let response = app(&store, &["color"])
        .oneshot(post_json(
            "/api/v1/events/snapshot-persisted",
            json!({
                "snapshot_id": snapshot.to_string(),
                "record": {"type": "snapshot", "parent_id": record.to_string()}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["applied"][0]["key"], "color");
    assert_eq!(body["applied"][0]["action"], "copied");
    assert_eq!(
        store
            .get_metadata(OwnerId::Snapshot(snapshot), "color")
            .await
            .unwrap(),
        Some(MetaValue::text("blue"))
    );
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let store = MemoryMetadataStore::new();
    let app = app(&store, &["color"]);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/events/restore-requested",
            json!({"record_id": "nope", "snapshot_id": SnapshotId::new().to_string()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::get("/api/v1/snapshots/not-a-uuid/review")
                .header("x-metarev-principal", "alice")
                .header("x-metarev-capabilities", "manage_options")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failures_are_unavailable() {
    let store = MemoryMetadataStore::new();
    store.set_unavailable(true);

    let response = app(&store, &["color"])
        .oneshot(post_json(
            "/api/v1/events/restore-requested",
            json!({
                "record_id": RecordId::new().to_string(),
                "snapshot_id": SnapshotId::new().to_string()
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn settings_require_manage_capability() {
    let store = MemoryMetadataStore::new();
    let app = app(&store, &[]);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/admin/settings")
                .header("x-metarev-principal", "bob")
                .header("x-metarev-capabilities", "edit_posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(post_json(
            "/api/v1/admin/settings",
            json!({"token": "whatever", "keys": ["color"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn settings_round_trip_with_issued_token() {
    let store = MemoryMetadataStore::new();
    store
        .insert_metadata(
            OwnerId::Record(RecordId::new()),
            "color",
            &MetaValue::text("blue"),
            false,
        )
        .await
        .unwrap();
    let app = app(&store, &[]);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/admin/settings")
                .header("x-metarev-principal", "alice")
                .header("x-metarev-capabilities", "manage_options")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["selectable"][0]["key"], "color");
    assert_eq!(view["selectable"][0]["selected"], false);
    let token = view["token"].as_str().unwrap().to_string();

    let mut request = post_json(
        "/api/v1/admin/settings",
        json!({"token": token, "keys": ["color"]}),
    );
    request
        .headers_mut()
        .insert("x-metarev-principal", "alice".parse().unwrap());
    request
        .headers_mut()
        .insert("x-metarev-capabilities", "manage_options".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let notice = body_json(response).await;
    assert_eq!(notice["code"], "metarev-1");
}

#[tokio::test]
async fn review_renders_registered_keys() {
    let store = MemoryMetadataStore::new();
    let snapshot = SnapshotId::new();
    store
        .insert_metadata(OwnerId::Snapshot(snapshot), "color", &MetaValue::text("a&b"), false)
        .await
        .unwrap();

    let app = app(&store, &["color", "size"]);
    let uri = format!("/api/v1/snapshots/{snapshot}/review");

    let response = app
        .clone()
        .oneshot(
            Request::get(&uri)
                .header("x-metarev-principal", "bob")
                .header("x-metarev-capabilities", "edit_posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::get(&uri)
                .header("x-metarev-principal", "alice")
                .header("x-metarev-capabilities", "manage_options")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fields"][0]["html"], "a&amp;b");
    assert_eq!(body["fields"][1]["html"], "*empty metadata value*");
    assert_eq!(body["fields"][1]["source"], "placeholder");
}
