//! Login, register, logout and whoami handlers

use crate::application::AuthUseCase;
use crate::domain::config::AppConfig;

use super::app::{build_identity, build_offline_identity, CommandError};
use super::args::AuthArgs;
use super::presenter::Presenter;

/// Sign in to an existing account
pub async fn handle_login(
    args: AuthArgs,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    let auth = AuthUseCase::new(build_identity(config)?);
    let password = args.password.unwrap_or_default();

    presenter.start_spinner("Signing in...");
    match auth.login(&args.email, &password).await {
        Ok(identity) => {
            presenter.spinner_success(&format!("Signed in as {}", identity));
            Ok(())
        }
        Err(e) => {
            presenter.stop_spinner();
            Err(e.into())
        }
    }
}

/// Create an account; the new account is signed in
pub async fn handle_register(
    args: AuthArgs,
    config: &AppConfig,
    presenter: &mut Presenter,
) -> Result<(), CommandError> {
    let auth = AuthUseCase::new(build_identity(config)?);
    let password = args.password.unwrap_or_default();

    presenter.start_spinner("Creating account...");
    match auth.register(&args.email, &password).await {
        Ok(identity) => {
            presenter.spinner_success(&format!("Account created, signed in as {}", identity));
            Ok(())
        }
        Err(e) => {
            presenter.stop_spinner();
            Err(e.into())
        }
    }
}

/// Forget the saved session
pub async fn handle_logout(config: &AppConfig, presenter: &Presenter) -> Result<(), CommandError> {
    let provider = build_offline_identity(config);
    let signed_in = provider.restore().await;
    let auth = AuthUseCase::new(provider);

    auth.logout().await?;
    match signed_in {
        Some(identity) => presenter.success(&format!("Signed out {}", identity)),
        None => presenter.info("Not signed in"),
    }
    Ok(())
}

/// Print the signed-in account
pub async fn handle_whoami(config: &AppConfig, presenter: &Presenter) -> Result<(), CommandError> {
    let provider = build_offline_identity(config);
    provider.restore().await;
    let auth = AuthUseCase::new(provider);

    match auth.current() {
        Some(identity) => presenter.output(&identity.email),
        None => presenter.info("Not signed in"),
    }
    Ok(())
}
