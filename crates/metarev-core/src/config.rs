//! Configuration management for metarev
//!
//! Sources, lowest precedence first:
//! - Hardcoded defaults
//! - /etc/metarev/metarev.{yaml,toml,json}
//! - ./config/metarev.{yaml,toml,json}
//! - File named by the METAREV_CONFIG env var
//! - Environment variables (METAREV_ prefix, `__` separator)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Option name the administrator's key selection is persisted under.
pub const DEFAULT_SELECTION_OPTION: &str = "metarev_selected_keys";

/// Capability a principal needs to save the key selection.
pub const DEFAULT_MANAGE_CAPABILITY: &str = "manage_options";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MetarevConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MetarevConfig {
    /// Load configuration from every source and validate it.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        builder = builder
            .add_source(File::with_name("/etc/metarev/metarev").required(false))
            .add_source(File::with_name("./config/metarev").required(false));

        if let Ok(config_path) = std::env::var("METAREV_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        // Example: METAREV_REGISTRY__MANDATORY_KEYS=_byline,_subtitle
        builder = builder.add_source(
            Environment::with_prefix("METAREV")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("registry.mandatory_keys")
                .with_list_parse_key("registry.excluded_keys"),
        );

        let config: MetarevConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("database.url", "sqlite://metarev.db")?
            .set_default("database.max_connections", 8)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("registry.mandatory_keys", Vec::<String>::new())?
            .set_default("registry.excluded_keys", Vec::<String>::new())?
            .set_default("registry.selection_option", DEFAULT_SELECTION_OPTION)?
            .set_default("admin.token_secret", "")?
            .set_default("admin.manage_capability", DEFAULT_MANAGE_CAPABILITY)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.sync_debug", false)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "database.max_connections must be > 0".to_string(),
            ));
        }

        if self.registry.selection_option.trim().is_empty() {
            return Err(ConfigError::Message(
                "registry.selection_option must not be empty".to_string(),
            ));
        }

        if self.admin.manage_capability.trim().is_empty() {
            return Err(ConfigError::Message(
                "admin.manage_capability must not be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Message(format!(
                "logging.level must be one of {LOG_LEVELS:?}, got `{}`",
                self.logging.level
            )));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::Message(format!(
                "logging.format must be one of {LOG_FORMATS:?}, got `{}`",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Load configuration from a specific file path, on top of the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: MetarevConfig = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// Metadata database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Max connections in pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://metarev.db".to_string(),
            max_connections: 8,
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Which keys are tracked and where the admin selection lives
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    /// Keys registered unconditionally at every registry build
    pub mandatory_keys: Vec<String>,

    /// Extra keys hidden from the admin selection, on top of the built-ins
    pub excluded_keys: Vec<String>,

    /// Option name of the persisted selection
    pub selection_option: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            mandatory_keys: Vec::new(),
            excluded_keys: Vec::new(),
            selection_option: DEFAULT_SELECTION_OPTION.to_string(),
        }
    }
}

/// Admin settings surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Secret for anti-forgery tokens. Empty means "generate at start-up".
    pub token_secret: String,

    /// Capability required to save the key selection
    pub manage_capability: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            manage_capability: DEFAULT_MANAGE_CAPABILITY.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,

    /// pretty or json
    pub format: String,

    /// Enables the per-key `metarev::sync` debug channel
    pub sync_debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            sync_debug: false,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter`-style directive string for this configuration.
    pub fn filter_directives(&self) -> String {
        if self.sync_debug {
            format!("{},metarev::sync=debug", self.level)
        } else {
            self.level.clone()
        }
    }
}
