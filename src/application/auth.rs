//! Login and registration use case

use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

use crate::domain::auth::{Credentials, Identity};
use crate::domain::error::CredentialsError;

use super::ports::{AuthError, IdentityProvider};

/// Errors from the auth use case
#[derive(Debug, Error)]
pub enum AuthUseCaseError {
    #[error("{0}")]
    Invalid(#[from] CredentialsError),

    #[error("{0}")]
    Provider(#[from] AuthError),
}

/// Email/password sign-in and account creation
pub struct AuthUseCase<P: IdentityProvider> {
    provider: P,
}

impl<P: IdentityProvider> AuthUseCase<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Sign in to an existing account
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthUseCaseError> {
        let credentials = Credentials::for_login(email, password)?;
        let identity = self.provider.sign_in(&credentials).await?;
        info!(email = %identity.email, "signed in");
        Ok(identity)
    }

    /// Create an account; the new account is signed in
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthUseCaseError> {
        let credentials = Credentials::for_registration(email, password)?;
        let identity = self.provider.register(&credentials).await?;
        info!(email = %identity.email, "account registered");
        Ok(identity)
    }

    pub async fn logout(&self) -> Result<(), AuthUseCaseError> {
        self.provider.sign_out().await?;
        info!("signed out");
        Ok(())
    }

    pub fn current(&self) -> Option<Identity> {
        self.provider.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.provider.subscribe()
    }
}
