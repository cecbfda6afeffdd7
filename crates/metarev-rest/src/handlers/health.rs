//! Liveness and Prometheus scrape endpoints.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use prometheus::{Encoder, TextEncoder};
use serde_json::json;

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "message": "Service is alive and operational"
        })),
    )
}

/// Prometheus text exposition of every registered metric.
pub async fn metrics() -> impl IntoResponse {
    // Touch the lazies so families show up before the first event.
    let _ = &*metarev_core::metrics::SYNC_OPERATIONS;
    let _ = &*metarev_core::metrics::ADMIN_SAVES;

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain".to_string())],
            format!("failed to encode metrics: {e}"),
        );
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        String::from_utf8_lossy(&buffer).into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler_healthy() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_handler() {
        let response = metrics().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
