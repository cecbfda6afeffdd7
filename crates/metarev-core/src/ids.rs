use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new identifier using UUID v7.
            #[must_use]
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID value.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Returns the raw 16-byte representation suitable for SQLite blobs.
            #[must_use]
            pub const fn to_bytes(self) -> [u8; 16] {
                self.0.into_bytes()
            }

            /// Creates an identifier from raw bytes.
            ///
            /// # Errors
            ///
            /// Returns `uuid::Error` when the bytes do not form a valid UUID.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self, uuid::Error> {
                Uuid::from_slice(bytes).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id!(RecordId, "Unique identifier for a primary content record.");
define_id!(
    SnapshotId,
    "Unique identifier for an immutable snapshot taken from a record."
);

/// Owner of a metadata entry: either a primary record or one of its snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum OwnerId {
    Record(RecordId),
    Snapshot(SnapshotId),
}

impl OwnerId {
    /// Canonical kind tag stored alongside the owner bytes.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::Snapshot(_) => "snapshot",
        }
    }

    /// Raw 16-byte owner identifier.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        match self {
            Self::Record(id) => id.to_bytes(),
            Self::Snapshot(id) => id.to_bytes(),
        }
    }

    /// Rebuilds an owner from its stored kind tag and bytes.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the kind is unknown or the
    /// bytes are not a UUID.
    pub fn from_parts(kind: &str, bytes: &[u8]) -> Result<Self, String> {
        match kind {
            "record" => RecordId::from_bytes(bytes)
                .map(Self::Record)
                .map_err(|err| err.to_string()),
            "snapshot" => SnapshotId::from_bytes(bytes)
                .map(Self::Snapshot)
                .map_err(|err| err.to_string()),
            other => Err(format!("unknown owner kind `{other}`")),
        }
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(id) => write!(f, "record:{id}"),
            Self::Snapshot(id) => write!(f, "snapshot:{id}"),
        }
    }
}

impl From<RecordId> for OwnerId {
    fn from(value: RecordId) -> Self {
        Self::Record(value)
    }
}

impl From<SnapshotId> for OwnerId {
    fn from(value: SnapshotId) -> Self {
        Self::Snapshot(value)
    }
}
