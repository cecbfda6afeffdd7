use thiserror::Error;

/// Canonical error type for metadata synchronization.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The metadata or option store could not serve a read or write.
    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        /// Human-readable details from the storage layer.
        message: String,
    },

    /// An admin save was attempted without the management capability.
    #[error("principal `{principal}` is not allowed to save the key selection")]
    UnauthorizedSave {
        /// Name of the rejected principal.
        principal: String,
    },

    /// The anti-forgery token did not verify for the named action.
    #[error("invalid token for action `{action}`")]
    InvalidToken {
        /// Action the token was checked against.
        action: String,
    },

    /// Entity was not found.
    #[error("{entity} `{id}` was not found")]
    NotFound {
        /// Entity type name (e.g. `"snapshot"`).
        entity: &'static str,
        /// Identifier of the missing entity.
        id: String,
    },

    /// Unexpected internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable details for debugging purposes.
        message: String,
    },

    /// Serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error occurred.
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// Validation error for input data.
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Creates a `StorageUnavailable` variant.
    #[must_use]
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Creates an `UnauthorizedSave` variant.
    #[must_use]
    pub fn unauthorized_save(principal: impl Into<String>) -> Self {
        Self::UnauthorizedSave {
            principal: principal.into(),
        }
    }

    /// Creates an `InvalidToken` variant.
    #[must_use]
    pub fn invalid_token(action: impl Into<String>) -> Self {
        Self::InvalidToken {
            action: action.into(),
        }
    }

    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an `Internal` variant.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` for the admin rejections that must leave state untouched.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::UnauthorizedSave { .. } | Self::InvalidToken { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_eof() || err.is_syntax() || err.is_data() {
            Self::DeserializationError(err.to_string())
        } else {
            Self::SerializationError(err.to_string())
        }
    }
}

/// Convenient result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_flagged() {
        assert!(CoreError::unauthorized_save("bob").is_rejection());
        assert!(CoreError::invalid_token("metarev_save_keys").is_rejection());
        assert!(!CoreError::storage_unavailable("disk gone").is_rejection());
    }

    #[test]
    fn json_syntax_errors_map_to_deserialization() {
        let err = serde_json::from_str::<Vec<String>>("[1, ").unwrap_err();
        assert!(matches!(
            CoreError::from(err),
            CoreError::DeserializationError(_)
        ));
    }
}
