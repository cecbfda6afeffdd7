use std::sync::Arc;

use axum::http::HeaderMap;
use metarev_core::config::{AdminConfig, RegistryConfig};
use metarev_core::{ActionToken, ConfigStore, CoreResult, MetadataStore, Principal};
use metarev_service::{AdminSettings, InitContext, MandatoryKeys, RevisionEngine, SelectionStore};

/// Header carrying the authenticated principal's name.
pub const PRINCIPAL_HEADER: &str = "x-metarev-principal";

/// Header carrying the principal's capabilities, comma separated.
pub const CAPABILITIES_HEADER: &str = "x-metarev-capabilities";

/// Shared across requests. Engines are built per request from it.
pub struct AppState {
    pub metadata: Arc<dyn MetadataStore>,
    pub options: Arc<dyn ConfigStore>,
    pub registry: RegistryConfig,
    pub admin: AdminConfig,
    pub mandatory: MandatoryKeys,
    pub tokens: ActionToken,
}

impl AppState {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        options: Arc<dyn ConfigStore>,
        registry: RegistryConfig,
        admin: AdminConfig,
        tokens: ActionToken,
    ) -> Self {
        let mandatory = MandatoryKeys::from_config(&registry);
        Self {
            metadata,
            options,
            registry,
            admin,
            mandatory,
            tokens,
        }
    }

    pub fn selection(&self) -> SelectionStore {
        SelectionStore::from_config(
            &self.registry,
            Arc::clone(&self.options),
            Arc::clone(&self.metadata),
        )
    }

    pub async fn engine(&self, ctx: InitContext) -> CoreResult<RevisionEngine> {
        RevisionEngine::initialize(
            ctx,
            &self.mandatory,
            &self.selection(),
            Arc::clone(&self.metadata),
        )
        .await
    }

    pub fn admin_settings(&self) -> AdminSettings {
        AdminSettings::new(
            Arc::new(self.selection()),
            self.tokens.clone(),
            self.admin.manage_capability.clone(),
        )
    }
}

/// Principal set by the fronting host. Missing headers yield an anonymous
/// principal without capabilities.
pub fn principal_from_headers(headers: &HeaderMap) -> Principal {
    let name = headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim();
    let capabilities = headers
        .get(CAPABILITIES_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|capability| !capability.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Principal::new(name, capabilities)
}
