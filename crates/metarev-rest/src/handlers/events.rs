//! Host lifecycle events.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use metarev_core::{RestoreRequested, SnapshotPersisted};
use metarev_service::{InitContext, KeyAction, SyncReport};
use serde::Serialize;
use serde_json::Value;

use super::parse_body;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AppliedKey {
    key: String,
    action: KeyAction,
}

#[derive(Serialize)]
pub struct SyncResponse {
    applied: Vec<AppliedKey>,
    skipped: Vec<String>,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            applied: report
                .applied
                .into_iter()
                .map(|(key, action)| AppliedKey { key, action })
                .collect(),
            skipped: report.skipped,
        }
    }
}

#[tracing::instrument(skip(state, body))]
pub async fn snapshot_persisted(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<SyncResponse>, ApiError> {
    let event: SnapshotPersisted = parse_body(body)?;
    let engine = state.engine(InitContext::public()).await?;
    let report = engine.on_snapshot_persisted(&event).await?;
    Ok(Json(report.into()))
}

#[tracing::instrument(skip(state, body))]
pub async fn restore_requested(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<SyncResponse>, ApiError> {
    let event: RestoreRequested = parse_body(body)?;
    let engine = state.engine(InitContext::admin()).await?;
    let report = engine.on_restore_requested(&event).await?;
    Ok(Json(report.into()))
}
