use metarev_core::{CoreError, CoreResult};
use serde::Serialize;

/// What happened to one key during a snapshot copy or a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Copied from the record onto a new snapshot.
    Copied,
    /// Created on the record from the snapshot.
    Inserted,
    /// Overwritten on the record from the snapshot.
    Updated,
}

impl KeyAction {
    /// Metric label for this action.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Copied => "snapshot_copy",
            Self::Inserted => "restore_insert",
            Self::Updated => "restore_update",
        }
    }
}

/// A key whose storage call failed.
#[derive(Debug)]
pub struct KeyFailure {
    pub key: String,
    pub error: CoreError,
}

/// Per-key outcome of one snapshot copy or restore.
///
/// Keys are independent: a failure on one key is recorded and the next key
/// is still attempted.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub applied: Vec<(String, KeyAction)>,
    /// Keys with an empty or missing source value.
    pub skipped: Vec<String>,
    pub failures: Vec<KeyFailure>,
}

impl SyncReport {
    /// `true` when no key was touched, skipped or failed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.skipped.is_empty() && self.failures.is_empty()
    }

    #[must_use]
    pub fn action_for(&self, key: &str) -> Option<KeyAction> {
        self.applied
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, action)| *action)
    }

    pub fn applied_keys(&self) -> impl Iterator<Item = &str> {
        self.applied.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn apply(&mut self, key: &str, action: KeyAction) {
        self.applied.push((key.to_string(), action));
    }

    pub(crate) fn skip(&mut self, key: &str) {
        self.skipped.push(key.to_string());
    }

    pub(crate) fn fail(&mut self, key: &str, error: CoreError) {
        self.failures.push(KeyFailure {
            key: key.to_string(),
            error,
        });
    }

    /// Surfaces the first key failure, if any.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failed key.
    pub fn into_result(self) -> CoreResult<Self> {
        if self.failures.is_empty() {
            return Ok(self);
        }
        let mut failures = self.failures;
        Err(failures.swap_remove(0).error)
    }
}
