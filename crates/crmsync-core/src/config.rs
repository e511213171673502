//! Configuration module for crmsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, environment overrides, validation, defaults, and a builder
//! pattern for programmatic use.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding `drive.access_token`.
pub const ENV_DRIVE_TOKEN: &str = "CRMSYNC_DRIVE_TOKEN";
/// Environment variable overriding `drive.base_url`.
pub const ENV_DRIVE_BASE_URL: &str = "CRMSYNC_DRIVE_BASE_URL";
/// Environment variable overriding `store.database_path`.
pub const ENV_DATABASE: &str = "CRMSYNC_DATABASE";
/// Environment variable overriding `server.listen`.
pub const ENV_LISTEN: &str = "CRMSYNC_LISTEN";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for crmsync.
///
/// Every section is optional in the YAML file; missing sections and fields
/// take their default values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub drive: DriveConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Items per persistence chunk.
    pub batch_size: usize,
    /// Items requested per Drive listing page (1..=1000).
    pub page_size: u32,
}

/// Google Drive API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Base URL of the Drive v3 REST API.
    pub base_url: String,
    /// OAuth2 bearer token. Usually supplied via `CRMSYNC_DRIVE_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the webhook server binds to.
    pub listen: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    pub format: LogFormat,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/crmsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("crmsync")
            .join("config.yaml")
    }

    /// Apply `CRMSYNC_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_DRIVE_TOKEN) {
            self.drive.access_token = Some(token);
        }
        if let Some(url) = get(ENV_DRIVE_BASE_URL) {
            self.drive.base_url = url;
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.store.database_path = PathBuf::from(path);
        }
        if let Some(listen) = get(ENV_LISTEN) {
            self.server.listen = listen;
        }
    }

    /// The parsed listen address.
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .listen
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid server.listen '{}': {e}", self.server.listen))
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            page_size: 100,
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/drive/v3".to_string(),
            access_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("crmsync");
        Self {
            database_path: data_dir.join("crmsync.db"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8787".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error with the field path and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.batch_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if self.sync.batch_size == 0 {
            errors.push(ValidationError {
                field: "sync.batch_size".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.page_size == 0 || self.sync.page_size > 1000 {
            errors.push(ValidationError {
                field: "sync.page_size".into(),
                message: "must be in range 1..=1000".into(),
            });
        }

        // --- drive ---
        if let Err(e) = url::Url::parse(&self.drive.base_url) {
            errors.push(ValidationError {
                field: "drive.base_url".into(),
                message: format!("invalid URL '{}': {e}", self.drive.base_url),
            });
        }
        if self.drive.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "drive.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- store ---
        if self.store.database_path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "store.database_path".into(),
                message: "must not be empty".into(),
            });
        }

        // --- server ---
        if self.server.listen.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError {
                field: "server.listen".into(),
                message: format!(
                    "invalid socket address '{}'; expected host:port",
                    self.server.listen
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }

    /// Fails with every validation error joined into one message.
    pub fn ensure_valid(&self) -> anyhow::Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        anyhow::bail!("Invalid configuration: {joined}")
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use crmsync_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_batch_size(25)
///     .store_database_path(PathBuf::from("/var/lib/crmsync/crmsync.db"))
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_batch_size(mut self, n: usize) -> Self {
        self.config.sync.batch_size = n;
        self
    }

    pub fn sync_page_size(mut self, n: u32) -> Self {
        self.config.sync.page_size = n;
        self
    }

    // --- drive ---

    pub fn drive_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.drive.base_url = url.into();
        self
    }

    pub fn drive_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.drive.access_token = Some(token.into());
        self
    }

    pub fn drive_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.drive.request_timeout_secs = seconds;
        self
    }

    // --- store ---

    pub fn store_database_path(mut self, path: PathBuf) -> Self {
        self.config.store.database_path = path;
        self
    }

    // --- server ---

    pub fn server_listen(mut self, addr: impl Into<String>) -> Self {
        self.config.server.listen = addr.into();
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
