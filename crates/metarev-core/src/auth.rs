//! Principals and anti-forgery tokens for the admin settings surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Action name the selection-save token is bound to.
pub const SAVE_KEYS_ACTION: &str = "metarev_save_keys";

/// Length of one token tick in seconds (12 hours).
const TICK_SECONDS: i64 = 12 * 60 * 60;

/// Authenticated caller of the admin surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Principal {
    #[must_use]
    pub fn new(name: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self {
            name: name.into(),
            capabilities,
        }
    }

    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Issues and verifies tokens tied to an action and a principal.
///
/// A token is `hex(sha256(secret | action | principal | tick))`. It verifies
/// during the tick it was issued in and the following one.
#[derive(Clone)]
pub struct ActionToken {
    secret: Vec<u8>,
}

impl ActionToken {
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issues a token for `action` on behalf of `principal` at `now`.
    #[must_use]
    pub fn issue(&self, action: &str, principal: &str, now: DateTime<Utc>) -> String {
        self.digest(action, principal, tick(now))
    }

    /// Verifies a token presented at `now`.
    #[must_use]
    pub fn verify(&self, token: &str, action: &str, principal: &str, now: DateTime<Utc>) -> bool {
        let current = tick(now);
        [current, current - 1].into_iter().any(|t| {
            let expected = self.digest(action, principal, t);
            bool::from(expected.as_bytes().ct_eq(token.as_bytes()))
        })
    }

    fn digest(&self, action: &str, principal: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(principal.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for ActionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionToken").finish_non_exhaustive()
    }
}

fn tick(now: DateTime<Utc>) -> i64 {
    now.timestamp().div_euclid(TICK_SECONDS)
}
