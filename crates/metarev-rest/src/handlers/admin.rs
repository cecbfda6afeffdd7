//! Key selection settings page.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use metarev_service::{InitContext, SaveSelectionRequest, SettingsView};
use serde::Serialize;
use serde_json::Value;

use super::parse_body;
use crate::error::ApiError;
use crate::state::{principal_from_headers, AppState};

#[derive(Serialize)]
pub struct NoticeResponse {
    code: &'static str,
    message: &'static str,
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SettingsView>, ApiError> {
    let principal = principal_from_headers(&headers);
    let engine = state.engine(InitContext::admin()).await?;
    let view = state
        .admin_settings()
        .settings_view(engine.registry(), &principal)
        .await?;
    Ok(Json(view))
}

pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<NoticeResponse>, ApiError> {
    let principal = principal_from_headers(&headers);
    let request: SaveSelectionRequest = parse_body(body)?;
    let notice = state.admin_settings().save(&principal, &request).await?;
    Ok(Json(NoticeResponse {
        code: notice.code(),
        message: notice.message(),
    }))
}
