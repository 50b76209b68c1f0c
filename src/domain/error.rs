//! Domain error types

use thiserror::Error;

/// Error when an invalid quality preset is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid quality: \"{input}\". Valid qualities are: high, low")]
pub struct InvalidQualityError {
    pub input: String,
}

/// Error when an invalid store backend is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid store: \"{input}\". Valid stores are: firestore, memory")]
pub struct InvalidStoreError {
    pub input: String,
}

/// Error when a remote identifier is empty
#[derive(Debug, Clone, Error)]
#[error("Remote identifier must not be empty")]
pub struct EmptyRemoteIdError;

/// Error when login or registration input is rejected before reaching the provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email address: \"{0}\"")]
    InvalidEmail(String),

    #[error("Password is required")]
    MissingPassword,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),

    #[error("Missing required setting '{key}'. Set it with 'voice-memos config set {key} <value>'")]
    Missing { key: String },
}
