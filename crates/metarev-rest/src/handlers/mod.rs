pub mod admin;
pub mod events;
pub mod health;
pub mod review;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub use admin::{get_settings, save_settings};
pub use events::{restore_requested, snapshot_persisted};
pub use health::{health_handler, metrics};
pub use review::review_snapshot;

/// Decodes a JSON body so that malformed ids surface as 400.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}
