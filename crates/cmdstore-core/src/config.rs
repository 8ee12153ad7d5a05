// crates/cmdstore-core/src/config.rs - Store configuration
//
// The only things a deployment chooses are which backend to use and where its
// file lives. Everything else about the store is fixed behavior.
//
// CONFIGURATION HIERARCHY (highest to lowest priority):
// 1. CMDSTORE_FILE environment variable (backing file path only)
// 2. Config file passed by the host ([store] table in TOML)
// 3. Built-in defaults (JSON file in the user cache directory)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the backing file path
pub const FILE_ENV_VAR: &str = "CMDSTORE_FILE";

/// Directory under the user cache dir that holds the default files
pub const APP_DIR: &str = "command-store-extension";

/// Errors that can occur during configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TOML syntax in {file}: {error}")]
    ParseError { file: String, error: String },

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("I/O error reading config: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level shape of a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub store: StoreConfig,
}

/// Which persistence format backs the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pretty-printed JSON object with full metadata
    #[default]
    Json,
    /// `COMMAND_<id>="..."` lines, text only
    Dotenv,
    /// Nothing is persisted
    Memory,
}

impl BackendKind {
    /// File name used when no explicit path is configured
    pub fn default_file_name(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("commands.json"),
            Self::Dotenv => Some("commands.env"),
            Self::Memory => None,
        }
    }
}

/// Store settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Backing file; defaults to `<cache dir>/command-store-extension/<file name>`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Json,
            path: Some(path.into()),
        }
    }

    pub fn dotenv(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Dotenv,
            path: Some(path.into()),
        }
    }

    pub fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            path: None,
        }
    }

    /// Resolve the file a file-backed store reads and writes
    ///
    /// Returns `Ok(None)` for the memory backend.
    pub fn backing_path(&self) -> ConfigResult<Option<PathBuf>> {
        let Some(file_name) = self.backend.default_file_name() else {
            return Ok(None);
        };

        if let Some(path) = &self.path {
            return Ok(Some(path.clone()));
        }

        let cache_dir = dirs::cache_dir().ok_or_else(|| {
            ConfigError::ValidationError(
                "No backing file path configured and no user cache directory available"
                    .to_string(),
            )
        })?;

        Ok(Some(cache_dir.join(APP_DIR).join(file_name)))
    }
}

/// Configuration loading and management
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from defaults, an optional config file and the environment
    ///
    /// A missing config file is not an error; invalid TOML is.
    pub fn load_config(config_file: Option<&Path>) -> ConfigResult<StoreConfig> {
        let mut config = match config_file {
            Some(path) => Self::try_load_file(path)?.unwrap_or_default(),
            None => StoreConfig::default(),
        };

        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Try to load a TOML config file, `None` if it doesn't exist
    pub fn try_load_file(path: &Path) -> ConfigResult<Option<StoreConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string()).map(Some)
    }

    /// Parse TOML config text; `origin` names the source in error messages
    pub fn parse(content: &str, origin: &str) -> ConfigResult<StoreConfig> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            file: origin.to_string(),
            error: e.to_string(),
        })?;

        Ok(file.store)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut StoreConfig) {
        Self::apply_path_override(config, std::env::var(FILE_ENV_VAR).ok());
    }

    fn apply_path_override(config: &mut StoreConfig, path: Option<String>) {
        if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
            config.path = Some(PathBuf::from(path));
        }
    }

    /// Validate the final configuration
    pub fn validate_config(config: &StoreConfig) -> ConfigResult<()> {
        if let Some(path) = &config.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Backing file path cannot be empty".to_string(),
                ));
            }

            if config.backend == BackendKind::Memory {
                tracing::debug!(path = %path.display(), "path is ignored by the memory backend");
            }
        }

        config.backing_path()?;
        Ok(())
    }

    /// Documented default config file
    pub fn generate_default_config() -> String {
        r#"# Command Store Configuration File
#
# Lines starting with # are comments and are ignored.

[store]
# Persistence format: "json", "dotenv" or "memory"
#   json   - keeps privacy, timestamps and usage counts
#   dotenv - COMMAND_<id>="..." lines, command text only
#   memory - nothing is written; every session starts empty
backend = "json"

# Backing file (overridden by the CMDSTORE_FILE environment variable).
# Defaults to <cache dir>/command-store-extension/commands.json
# path = "~/.cache/command-store-extension/commands.json"
"#
        .to_string()
    }
}
