//! Identity provider port interface

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::auth::{Credentials, Identity};

/// Authentication errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("An account already exists for this email")]
    EmailInUse,

    #[error("The provider rejected the email address")]
    InvalidEmail,

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("Sign-in has expired. Sign in again with 'voice-memos login'")]
    SessionExpired,

    #[error("Too many attempts. Please try again later")]
    RateLimited,

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Authentication error: {0}")]
    ApiError(String),

    #[error("Failed to save sign-in session: {0}")]
    PersistFailed(String),
}

/// Port for the email/password identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in to an existing account
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError>;

    /// Create an account and sign in to it
    async fn register(&self, credentials: &Credentials) -> Result<Identity, AuthError>;

    /// Forget the current identity
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Currently signed-in identity
    fn current(&self) -> Option<Identity>;

    /// Receive identity changes; dropping the receiver unsubscribes
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}
