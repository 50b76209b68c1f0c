//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, StoreKind};
use crate::domain::error::ConfigError;
use crate::domain::recording::QualityPreset;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::Unset { key } => handle_unset(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;
    let value = validate_config_value(key, value)?;

    let mut config = store.load().await?;
    *field_mut(&mut config, key) = Some(value.clone());
    store.save(&config).await?;

    let shown = if key == "api_key" {
        mask_api_key(&value)
    } else {
        value
    };
    presenter.success(&format!("{} = {}", key, shown));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let config = store.load().await?;
    presenter.output(&display_value(&config, key));

    Ok(())
}

async fn handle_unset<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let mut config = store.load().await?;
    if field_mut(&mut config, key).take().is_none() {
        presenter.info(&format!("{} was not set", key));
        return Ok(());
    }
    store.save(&config).await?;
    presenter.success(&format!("Removed {}", key));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, &display_value(&config, key));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_valid_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Field backing a validated config key
fn field_mut<'a>(config: &'a mut AppConfig, key: &str) -> &'a mut Option<String> {
    match key {
        "api_key" => &mut config.api_key,
        "project_id" => &mut config.project_id,
        "collection" => &mut config.collection,
        "quality" => &mut config.quality,
        "store" => &mut config.store,
        _ => &mut config.recordings_dir,
    }
}

fn field<'a>(config: &'a AppConfig, key: &str) -> Option<&'a str> {
    match key {
        "api_key" => config.api_key.as_deref(),
        "project_id" => config.project_id.as_deref(),
        "collection" => config.collection.as_deref(),
        "quality" => config.quality.as_deref(),
        "store" => config.store.as_deref(),
        "recordings_dir" => config.recordings_dir.as_deref(),
        _ => None,
    }
}

/// Value as shown to the user; the API key is masked
fn display_value(config: &AppConfig, key: &str) -> String {
    match (key, field(config, key)) {
        ("api_key", Some(value)) => mask_api_key(value),
        (_, Some(value)) => value.to_string(),
        (_, None) => NOT_SET.to_string(),
    }
}

/// Validate a config value based on key type, returning the normalised value
fn validate_config_value(key: &str, value: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "quality" => value
            .parse::<QualityPreset>()
            .map(|q| q.as_str().to_string())
            .map_err(|e| invalid(e.to_string())),
        "store" => value
            .parse::<StoreKind>()
            .map(|s| s.as_str().to_string())
            .map_err(|e| invalid(e.to_string())),
        "collection" | "project_id" => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.contains('/') {
                return Err(invalid("Value must be non-empty and contain no '/'".to_string()));
            }
            Ok(trimmed.to_string())
        }
        _ => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
            Ok(value.trim().to_string())
        }
    }
}

/// Mask API key for display (show first 4 and last 4 chars)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_api_key_long() {
        let masked = mask_api_key("abcdefghijklmnop");
        assert_eq!(masked, "abcd...mnop");
    }

    #[test]
    fn mask_api_key_short() {
        let masked = mask_api_key("short");
        assert_eq!(masked, "*****");
    }

    #[test]
    fn validate_quality() {
        assert_eq!(validate_config_value("quality", "LOW").unwrap(), "low");
        assert!(validate_config_value("quality", "ultra").is_err());
    }

    #[test]
    fn validate_store() {
        assert_eq!(validate_config_value("store", "memory").unwrap(), "memory");
        assert!(validate_config_value("store", "s3").is_err());
    }

    #[test]
    fn validate_collection_rejects_paths() {
        assert!(validate_config_value("collection", "memos").is_ok());
        assert!(validate_config_value("collection", "a/b").is_err());
        assert!(validate_config_value("collection", "  ").is_err());
    }

    #[test]
    fn validate_api_key_rejects_blank() {
        assert!(validate_config_value("api_key", "").is_err());
        assert_eq!(validate_config_value("api_key", " k ").unwrap(), "k");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = ensure_valid_key("duration").unwrap_err();
        assert!(err.to_string().contains("Unknown key"));
    }

    #[test]
    fn display_value_masks_api_key() {
        let config = AppConfig {
            api_key: Some("abcdefghijklmnop".to_string()),
            ..Default::default()
        };
        assert_eq!(display_value(&config, "api_key"), "abcd...mnop");
        assert_eq!(display_value(&config, "quality"), NOT_SET);
    }

    #[test]
    fn field_mut_targets_each_key() {
        let mut config = AppConfig::empty();
        for key in VALID_CONFIG_KEYS {
            *field_mut(&mut config, key) = Some(format!("{}-value", key));
        }
        for key in VALID_CONFIG_KEYS {
            assert_eq!(field(&config, key), Some(format!("{}-value", key).as_str()));
        }
    }
}
