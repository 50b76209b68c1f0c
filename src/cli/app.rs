//! Shared wiring for the CLI commands: config layering, adapter
//! construction and exit codes

use std::env;

use thiserror::Error;

use crate::application::ports::{ConfigStore, DocumentStore, IdentityProvider};
use crate::application::{AuthUseCaseError, SessionError};
use crate::domain::config::{AppConfig, StoreKind};
use crate::domain::error::ConfigError;
use crate::infrastructure::{FirebaseAuth, FirestoreStore, InMemoryStore, XdgConfigStore};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable holding the Firebase web API key
pub const ENV_API_KEY: &str = "VOICE_MEMOS_API_KEY";

/// Environment variable holding the Firebase project id
pub const ENV_PROJECT_ID: &str = "VOICE_MEMOS_PROJECT_ID";

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthUseCaseError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(ConfigError::ValidationError { .. }) => EXIT_USAGE_ERROR,
            Self::Auth(AuthUseCaseError::Invalid(_)) => EXIT_USAGE_ERROR,
            _ => EXIT_ERROR,
        }
    }
}

/// Config from the environment
pub fn env_config() -> AppConfig {
    env_config_from(|name| env::var(name).ok())
}

fn env_config_from(lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let non_empty = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

    AppConfig {
        api_key: non_empty(ENV_API_KEY),
        project_id: non_empty(ENV_PROJECT_ID),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
}

/// Identity provider for the configured Firebase project.
/// Needs an API key to reach the provider.
pub fn build_identity(config: &AppConfig) -> Result<FirebaseAuth, ConfigError> {
    let api_key = require(&config.api_key, "api_key")?;
    Ok(FirebaseAuth::new(api_key))
}

/// Identity provider that can only read or forget the saved session
pub fn build_offline_identity(config: &AppConfig) -> FirebaseAuth {
    FirebaseAuth::new(config.api_key.clone().unwrap_or_default())
}

/// Document store selected by config. Firestore requests are authorised
/// as the identity's signed-in account.
pub fn build_store(
    config: &AppConfig,
    identity: Option<&FirebaseAuth>,
) -> Result<Box<dyn DocumentStore>, ConfigError> {
    match config.store_or_default() {
        StoreKind::Memory => Ok(Box::new(InMemoryStore::new())),
        StoreKind::Firestore => {
            let api_key = require(&config.api_key, "api_key")?;
            let project_id = require(&config.project_id, "project_id")?;

            let mut store = FirestoreStore::new(api_key, project_id);
            if let Some(identity) = identity {
                store = store.with_identity(identity.subscribe());
            }
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_config_reads_both_variables() {
        let config = env_config_from(|name| match name {
            ENV_API_KEY => Some("key".to_string()),
            ENV_PROJECT_ID => Some("memos-dev".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.project_id.as_deref(), Some("memos-dev"));
        assert!(config.quality.is_none());
    }

    #[test]
    fn env_config_ignores_blank_values() {
        let config = env_config_from(|_| Some("  ".to_string()));
        assert!(config.api_key.is_none());
        assert!(config.project_id.is_none());
    }

    #[test]
    fn firestore_store_needs_project() {
        let config = AppConfig {
            api_key: Some("key".to_string()),
            ..AppConfig::defaults()
        };
        match build_store(&config, None) {
            Err(ConfigError::Missing { key }) => assert_eq!(key, "project_id"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected missing project_id"),
        }
    }

    #[test]
    fn memory_store_needs_nothing() {
        let config = AppConfig {
            store: Some("memory".to_string()),
            ..AppConfig::empty()
        };
        assert!(build_store(&config, None).is_ok());
    }

    #[test]
    fn identity_needs_api_key() {
        assert!(matches!(
            build_identity(&AppConfig::defaults()),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn exit_codes() {
        let usage = CommandError::Config(ConfigError::ValidationError {
            key: "quality".to_string(),
            message: "bad".to_string(),
        });
        assert_eq!(usage.exit_code(), EXIT_USAGE_ERROR);

        let missing = CommandError::Config(ConfigError::Missing {
            key: "api_key".to_string(),
        });
        assert_eq!(missing.exit_code(), EXIT_ERROR);
    }
}
