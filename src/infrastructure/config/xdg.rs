//! TOML settings file under the user config dir
//!
//! Settings are written in two tables:
//!
//! ```toml
//! [firebase]
//! api_key = "..."
//! project_id = "..."
//! collection = "recordings"
//!
//! [recording]
//! quality = "high"
//! store = "firestore"
//! ```
//!
//! A flat file with the same keys at the top level is also accepted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    firebase: FirebaseTable,
    #[serde(default)]
    recording: RecordingTable,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FirebaseTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordingTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recordings_dir: Option<String>,
}

impl From<SettingsFile> for AppConfig {
    fn from(file: SettingsFile) -> Self {
        Self {
            api_key: file.firebase.api_key,
            project_id: file.firebase.project_id,
            collection: file.firebase.collection,
            quality: file.recording.quality,
            store: file.recording.store,
            recordings_dir: file.recording.recordings_dir,
        }
    }
}

impl From<&AppConfig> for SettingsFile {
    fn from(config: &AppConfig) -> Self {
        Self {
            firebase: FirebaseTable {
                api_key: config.api_key.clone(),
                project_id: config.project_id.clone(),
                collection: config.collection.clone(),
            },
            recording: RecordingTable {
                quality: config.quality.clone(),
                store: config.store.clone(),
                recordings_dir: config.recordings_dir.clone(),
            },
        }
    }
}

/// Settings file at `<config dir>/voice-memos/config.toml`
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("voice-memos")
            .join("config.toml")
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let sectioned = table.contains_key("firebase") || table.contains_key("recording");
        let value = toml::Value::Table(table);
        let parsed = if sectioned {
            value.try_into::<SettingsFile>().map(AppConfig::from)
        } else {
            value.try_into::<AppConfig>()
        };

        parsed.map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(&SettingsFile::from(config))
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    async fn ensure_parent(path: &Path) -> Result<(), ConfigError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string())),
            _ => Ok(()),
        }
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::empty()),
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        Self::parse_toml(&content)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        Self::ensure_parent(&self.path).await?;
        let content = Self::to_toml(config)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(self.path.display().to_string()));
        }
        self.save(&AppConfig::defaults()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_xdg() {
        let store = XdgConfigStore::new();
        let path = store.path();
        assert!(path.to_string_lossy().contains("voice-memos"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn custom_path() {
        let store = XdgConfigStore::with_path("/custom/path/config.toml");
        assert_eq!(store.path(), PathBuf::from("/custom/path/config.toml"));
    }

    #[test]
    fn parse_toml_flat_format() {
        let content = r#"
api_key = "test-key"
project_id = "memos-dev"
quality = "low"
store = "memory"
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.project_id.as_deref(), Some("memos-dev"));
        assert_eq!(config.quality.as_deref(), Some("low"));
        assert_eq!(config.store.as_deref(), Some("memory"));
        assert!(config.collection.is_none());
    }

    #[test]
    fn parse_toml_sectioned_format() {
        let content = r#"
[firebase]
project_id = "memos-dev"
collection = "memos"

[recording]
store = "memory"
recordings_dir = "/tmp/memos"
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.project_id.as_deref(), Some("memos-dev"));
        assert_eq!(config.collection.as_deref(), Some("memos"));
        assert_eq!(config.store.as_deref(), Some("memory"));
        assert_eq!(config.recordings_dir.as_deref(), Some("/tmp/memos"));
        assert!(config.api_key.is_none());
        assert!(config.quality.is_none());
    }

    #[test]
    fn saved_file_uses_tables() {
        let toml = XdgConfigStore::to_toml(&AppConfig::defaults()).unwrap();
        assert!(toml.contains("[firebase]"));
        assert!(toml.contains("[recording]"));
        assert!(!toml.contains("api_key"));
    }

    #[test]
    fn parse_toml_rejects_garbage() {
        let result = XdgConfigStore::parse_toml("quality = [");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let config = store.load().await.unwrap();
        assert!(config.api_key.is_none());
        assert!(config.quality.is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested").join("config.toml"));

        let config = AppConfig {
            project_id: Some("memos-dev".to_string()),
            collection: Some("memos".to_string()),
            ..Default::default()
        };
        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.project_id.as_deref(), Some("memos-dev"));
        assert_eq!(loaded.collection.as_deref(), Some("memos"));
        assert!(loaded.api_key.is_none());
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));

        store.init().await.unwrap();
        assert!(store.exists());
        assert_eq!(store.load().await.unwrap().quality.as_deref(), Some("high"));

        let err = store.init().await.unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn unreadable_config_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let store = XdgConfigStore::with_path(path);
        let config = store.load_or_empty().await;
        assert!(config.store.is_none());
    }
}
