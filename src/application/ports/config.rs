//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for persisted recorder settings
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the stored settings. A missing file yields an empty config.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored settings
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the settings file
    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write the defaults. Fails if the file already exists.
    async fn init(&self) -> Result<(), ConfigError>;

    /// Load, falling back to an empty config when the file is unreadable
    async fn load_or_empty(&self) -> AppConfig {
        match self.load().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path().display(), "ignoring unreadable config");
                AppConfig::empty()
            }
        }
    }
}
