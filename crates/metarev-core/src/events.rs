//! Events handed to the engine by the host content repository.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::{RecordId, SnapshotId};

/// What kind of entity the host just persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A save of the primary, mutable record.
    Primary,
    /// A new immutable snapshot of a record.
    Snapshot,
}

impl RecordKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "snapshot" => Ok(Self::Snapshot),
            _ => Err(()),
        }
    }
}

/// The persisted entity as described by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Record the snapshot was taken from. Absent for primary saves.
    #[serde(default)]
    pub parent_id: Option<RecordId>,
}

impl PersistedRecord {
    /// Describes a snapshot of `parent`.
    #[must_use]
    pub const fn snapshot_of(parent: RecordId) -> Self {
        Self {
            kind: RecordKind::Snapshot,
            parent_id: Some(parent),
        }
    }

    /// Describes a primary save.
    #[must_use]
    pub const fn primary() -> Self {
        Self {
            kind: RecordKind::Primary,
            parent_id: None,
        }
    }

    /// Source record for a snapshot persist, `None` for anything else.
    #[must_use]
    pub fn snapshot_source(&self) -> Option<RecordId> {
        match self.kind {
            RecordKind::Snapshot => self.parent_id,
            RecordKind::Primary => None,
        }
    }
}

/// Fired by the host after an entity has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPersisted {
    pub snapshot_id: SnapshotId,
    pub record: PersistedRecord,
}

/// Fired by the host when a record is being restored from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequested {
    pub record_id: RecordId,
    pub snapshot_id: SnapshotId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_saves_have_no_snapshot_source() {
        assert_eq!(PersistedRecord::primary().snapshot_source(), None);

        let stray = PersistedRecord {
            kind: RecordKind::Primary,
            parent_id: Some(RecordId::new()),
        };
        assert_eq!(stray.snapshot_source(), None);
    }

    #[test]
    fn persisted_record_uses_host_field_names() {
        let parent = RecordId::new();
        let json = serde_json::json!({ "type": "snapshot", "parent_id": parent });
        let record: PersistedRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.snapshot_source(), Some(parent));
    }

    #[test]
    fn record_kind_round_trips_through_str() {
        for kind in [RecordKind::Primary, RecordKind::Snapshot] {
            assert_eq!(kind.as_str().parse::<RecordKind>(), Ok(kind));
        }
        assert!("revision".parse::<RecordKind>().is_err());
    }
}
