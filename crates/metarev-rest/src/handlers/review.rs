use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use metarev_core::{CoreError, SnapshotId};
use metarev_service::{InitContext, RenderedField};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::{principal_from_headers, AppState};

#[derive(Serialize)]
pub struct ReviewResponse {
    snapshot_id: String,
    fields: Vec<RenderedField>,
}

/// Admin-only: requires the manage capability.
#[tracing::instrument(skip(state, headers), fields(snapshot_id = %snapshot_id))]
pub async fn review_snapshot(
    Path(snapshot_id): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ReviewResponse>, ApiError> {
    let principal = principal_from_headers(&headers);
    if !principal.has_capability(&state.admin.manage_capability) {
        return Err(CoreError::unauthorized_save(principal.name).into());
    }

    let id = SnapshotId::from_str(&snapshot_id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid snapshot_id: {e}")))?;

    let engine = state.engine(InitContext::admin_review()).await?;
    let fields = engine.review_snapshot(id).await?;
    Ok(Json(ReviewResponse {
        snapshot_id: id.to_string(),
        fields,
    }))
}
