//! CLI subcommands and the context they share

pub mod config;
pub mod leads;
pub mod records;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use crmsync_core::config::Config;
use crmsync_store::DatabasePool;
use tracing::debug;

use crate::output::{Output, OutputFormat};

/// Global options resolved once per invocation
#[derive(Debug)]
pub struct Context {
    config_path: PathBuf,
    /// True if the path came from `--config`
    explicit: bool,
    format: OutputFormat,
}

impl Context {
    pub fn new(config: Option<PathBuf>, format: OutputFormat) -> Self {
        let explicit = config.is_some();
        Self {
            config_path: config.unwrap_or_else(Config::default_path),
            explicit,
            format,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> Output {
        Output::new(self.format)
    }

    /// Loads the config file and applies environment overrides
    ///
    /// A missing default file yields defaults; a missing `--config` file is
    /// an error.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = if self.config_path.exists() {
            Config::load(&self.config_path)
                .with_context(|| format!("Failed to load {}", self.config_path.display()))?
        } else if self.explicit {
            anyhow::bail!("Config file not found: {}", self.config_path.display());
        } else {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`Context::load_config`] but rejects invalid values
    pub fn load_valid_config(&self) -> Result<Config> {
        let config = self.load_config()?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Opens (and migrates) the configured database
    pub async fn open_pool(&self, config: &Config) -> Result<DatabasePool> {
        let path = &config.store.database_path;
        DatabasePool::new(path)
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))
    }
}
