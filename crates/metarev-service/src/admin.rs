//! Settings surface for choosing which optional keys are versioned.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use metarev_core::metrics::ADMIN_SAVES;
use metarev_core::{ActionToken, CoreError, CoreResult, KeyRegistry, Principal, SAVE_KEYS_ACTION};
use serde::{Deserialize, Serialize};

use crate::selection::SelectionStore;

/// Shown instead of the selectable list when there is nothing to choose.
pub const NO_CUSTOM_FIELDS: &str = "No custom fields found";

/// Notice raised after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdminNotice {
    SelectionUpdated,
}

impl AdminNotice {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SelectionUpdated => "metarev-1",
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::SelectionUpdated => "Selected meta keys to be versioned have been updated.",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "metarev-1" => Some(Self::SelectionUpdated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectableKey {
    pub key: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    /// Keys collaborators require; shown but not editable.
    pub required: Vec<String>,
    pub selectable: Vec<SelectableKey>,
    /// Set when `selectable` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub action: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveSelectionRequest {
    pub token: String,
    /// Missing means "nothing selected".
    #[serde(default)]
    pub keys: Vec<String>,
}

pub struct AdminSettings {
    selection: Arc<SelectionStore>,
    tokens: ActionToken,
    manage_capability: String,
}

impl AdminSettings {
    pub fn new(
        selection: Arc<SelectionStore>,
        tokens: ActionToken,
        manage_capability: impl Into<String>,
    ) -> Self {
        Self {
            selection,
            tokens,
            manage_capability: manage_capability.into(),
        }
    }

    #[must_use]
    pub fn issue_token(&self, principal: &Principal) -> String {
        self.tokens
            .issue(SAVE_KEYS_ACTION, &principal.name, Utc::now())
    }

    /// # Errors
    ///
    /// `UnauthorizedSave` without the manage capability, or a storage error.
    pub async fn settings_view(
        &self,
        registry: &KeyRegistry,
        principal: &Principal,
    ) -> CoreResult<SettingsView> {
        self.authorize(principal)?;

        let selected = self.selection.selected_keys().await?;
        let selectable: Vec<SelectableKey> = self
            .selection
            .selectable_keys(registry)
            .await?
            .into_iter()
            .map(|key| SelectableKey {
                selected: selected.contains(&key),
                key,
            })
            .collect();
        let message = selectable
            .is_empty()
            .then(|| NO_CUSTOM_FIELDS.to_string());

        Ok(SettingsView {
            required: self.selection.required_keys(registry).into_iter().collect(),
            selectable,
            message,
            token: self.issue_token(principal),
            action: SAVE_KEYS_ACTION.to_string(),
        })
    }

    /// Replaces the selection after the capability and token checks.
    ///
    /// # Errors
    ///
    /// `UnauthorizedSave`, `InvalidToken`, or a storage error. Nothing is
    /// written on the first two.
    pub async fn save(
        &self,
        principal: &Principal,
        request: &SaveSelectionRequest,
    ) -> CoreResult<AdminNotice> {
        if let Err(err) = self.authorize(principal) {
            ADMIN_SAVES.with_label_values(&["unauthorized"]).inc();
            return Err(err);
        }
        if !self
            .tokens
            .verify(&request.token, SAVE_KEYS_ACTION, &principal.name, Utc::now())
        {
            tracing::warn!(principal = %principal.name, "rejected key selection save with invalid token");
            ADMIN_SAVES.with_label_values(&["invalid_token"]).inc();
            return Err(CoreError::invalid_token(SAVE_KEYS_ACTION));
        }

        let keys: BTreeSet<String> = request.keys.iter().cloned().collect();
        if let Err(err) = self.selection.save_selection(&keys).await {
            ADMIN_SAVES.with_label_values(&["error"]).inc();
            return Err(err);
        }

        ADMIN_SAVES.with_label_values(&["ok"]).inc();
        Ok(AdminNotice::SelectionUpdated)
    }

    fn authorize(&self, principal: &Principal) -> CoreResult<()> {
        if principal.has_capability(&self.manage_capability) {
            Ok(())
        } else {
            tracing::warn!(
                principal = %principal.name,
                capability = %self.manage_capability,
                "principal lacks capability to manage metadata keys"
            );
            Err(CoreError::unauthorized_save(principal.name.clone()))
        }
    }
}
