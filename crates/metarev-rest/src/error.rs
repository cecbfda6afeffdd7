use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metarev_core::CoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(err) => match err {
                CoreError::UnauthorizedSave { .. } | CoreError::InvalidToken { .. } => {
                    StatusCode::FORBIDDEN
                }
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::ValidationError(_) | CoreError::DeserializationError(_) => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::SerializationError(_) | CoreError::Internal { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
