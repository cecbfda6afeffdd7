//! Opaque metadata payloads.
//!
//! The synchronization engine never looks inside a [`MetaValue`] beyond
//! asking whether it is empty. Collaborators that store structured data go
//! through [`MetaValue::encode`] and [`MetaValue::decode`].

use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CoreResult;

/// Serialized metadata value as held by the metadata store.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct MetaValue(Bytes);

impl MetaValue {
    /// Wraps raw bytes without interpretation.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Wraps UTF-8 text without interpretation.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self(Bytes::from(value.into()))
    }

    /// Serializes a structured value as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` when the value cannot be encoded.
    pub fn encode<T: Serialize>(value: &T) -> CoreResult<Self> {
        Ok(Self(Bytes::from(serde_json::to_vec(value)?)))
    }

    /// Deserializes a value previously stored with [`MetaValue::encode`].
    ///
    /// # Errors
    ///
    /// Returns `DeserializationError` when the payload is not valid JSON for `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> CoreResult<T> {
        Ok(serde_json::from_slice(&self.0)?)
    }

    /// A value is empty when it carries no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the payload as text when it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl fmt::Debug for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => f.debug_tuple("MetaValue").field(&text).finish(),
            None => f
                .debug_tuple("MetaValue")
                .field(&format_args!("{} bytes", self.0.len()))
                .finish(),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<Vec<u8>> for MetaValue {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(value)
    }
}

impl From<Bytes> for MetaValue {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}
