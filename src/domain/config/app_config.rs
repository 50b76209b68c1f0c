//! Application configuration value object

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidStoreError;
use crate::domain::recording::QualityPreset;

/// Default Firestore collection for recording metadata
pub const DEFAULT_COLLECTION: &str = "recordings";

/// Where recording metadata is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreKind {
    #[default]
    Firestore,
    /// Process-local store, nothing leaves the machine
    Memory,
}

impl StoreKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Firestore => "firestore",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StoreKind {
    type Err = InvalidStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(InvalidStoreError { input: s.to_string() }),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Firebase web API key
    pub api_key: Option<String>,
    /// Firebase project id
    pub project_id: Option<String>,
    pub collection: Option<String>,
    pub quality: Option<String>,
    pub store: Option<String>,
    pub recordings_dir: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            project_id: None,
            collection: Some(DEFAULT_COLLECTION.to_string()),
            quality: Some("high".to_string()),
            store: Some("firestore".to_string()),
            recordings_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            project_id: other.project_id.or(self.project_id),
            collection: other.collection.or(self.collection),
            quality: other.quality.or(self.quality),
            store: other.store.or(self.store),
            recordings_dir: other.recordings_dir.or(self.recordings_dir),
        }
    }

    /// Get collection name, or "recordings" if not set/blank
    pub fn collection_or_default(&self) -> &str {
        self.collection
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_COLLECTION)
    }

    /// Get quality as parsed preset, or default if not set/invalid
    pub fn quality_or_default(&self) -> QualityPreset {
        self.quality
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get store backend, or Firestore if not set/invalid
    pub fn store_or_default(&self) -> StoreKind {
        self.store
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get the directory finished recordings are written to
    pub fn recordings_dir_or_default(&self) -> PathBuf {
        match self.recordings_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("voice-memos")
                .join("recordings"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert!(config.api_key.is_none());
        assert!(config.project_id.is_none());
        assert_eq!(config.collection, Some("recordings".to_string()));
        assert_eq!(config.quality, Some("high".to_string()));
        assert_eq!(config.store, Some("firestore".to_string()));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.api_key.is_none());
        assert!(config.collection.is_none());
        assert!(config.quality.is_none());
        assert!(config.recordings_dir.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            api_key: Some("base_key".to_string()),
            collection: Some("recordings".to_string()),
            quality: Some("high".to_string()),
            ..Default::default()
        };

        let other = AppConfig {
            api_key: Some("other_key".to_string()),
            collection: None, // Should not override
            quality: Some("low".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.api_key, Some("other_key".to_string()));
        assert_eq!(merged.collection, Some("recordings".to_string())); // Kept from base
        assert_eq!(merged.quality, Some("low".to_string()));
    }

    #[test]
    fn collection_or_default_ignores_blank() {
        let config = AppConfig {
            collection: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.collection_or_default(), "recordings");
    }

    #[test]
    fn quality_or_default_parses() {
        let config = AppConfig {
            quality: Some("low".to_string()),
            ..Default::default()
        };
        assert_eq!(config.quality_or_default(), QualityPreset::Low);
    }

    #[test]
    fn quality_or_default_uses_default_on_invalid() {
        let config = AppConfig {
            quality: Some("invalid".to_string()),
            ..Default::default()
        };
        assert_eq!(config.quality_or_default(), QualityPreset::High);
    }

    #[test]
    fn store_or_default_parses() {
        let config = AppConfig {
            store: Some("memory".to_string()),
            ..Default::default()
        };
        assert_eq!(config.store_or_default(), StoreKind::Memory);
        assert_eq!(AppConfig::empty().store_or_default(), StoreKind::Firestore);
    }

    #[test]
    fn recordings_dir_or_default() {
        let config = AppConfig {
            recordings_dir: Some("/tmp/memos".to_string()),
            ..Default::default()
        };
        assert_eq!(config.recordings_dir_or_default(), PathBuf::from("/tmp/memos"));

        let default_dir = AppConfig::empty().recordings_dir_or_default();
        assert!(default_dir.ends_with("voice-memos/recordings"));
    }

    #[test]
    fn store_kind_rejects_unknown() {
        assert!("sqlite".parse::<StoreKind>().is_err());
    }
}
