//! Firebase Authentication (Identity Toolkit REST) adapter
//!
//! The signed-in identity is kept in a TOML session file so later
//! invocations of the CLI start out signed in.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::application::ports::{AuthError, IdentityProvider};
use crate::domain::auth::{Credentials, Identity};

/// Identity Toolkit API base URL
const API_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Secure Token API base URL, used to exchange refresh tokens
const TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com";

// Request types for the Identity Toolkit API

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

// Response types for the Identity Toolkit API

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

/// Secure Token API answers in snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Email/password identity provider backed by Firebase Auth
pub struct FirebaseAuth {
    api_key: String,
    base_url: String,
    token_base_url: String,
    session_path: Option<PathBuf>,
    state: watch::Sender<Option<Identity>>,
    client: reqwest::Client,
}

impl FirebaseAuth {
    /// Create a provider persisting its session under the user data dir
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE_URL.to_string(),
            token_base_url: TOKEN_BASE_URL.to_string(),
            session_path: Some(Self::default_session_path()),
            state: watch::channel(None).0,
            client: reqwest::Client::new(),
        }
    }

    /// Default session file location
    pub fn default_session_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("voice-memos")
            .join("session.toml")
    }

    /// Point both the account and token endpoints at a different host
    /// (emulator or test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self.token_base_url = self.base_url.clone();
        self
    }

    /// Persist the session at a custom path
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = Some(path.into());
        self
    }

    /// Keep the session in memory only
    pub fn without_persistence(mut self) -> Self {
        self.session_path = None;
        self
    }

    pub fn session_path(&self) -> Option<&Path> {
        self.session_path.as_deref()
    }

    /// Load a previously saved session and publish it, refreshing an
    /// expired ID token first. A missing or unreadable session file means
    /// signed out.
    pub async fn restore(&self) -> Option<Identity> {
        let path = self.session_path.as_ref()?;
        if !path.exists() {
            return None;
        }

        let identity = match fs::read_to_string(path).await {
            Ok(content) => match toml::from_str::<Identity>(&content) {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "ignoring unreadable session file");
                    return None;
                }
            },
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to read session file");
                return None;
            }
        };

        debug!(email = %identity.email, "session restored");
        self.state.send_replace(Some(identity));
        self.ensure_fresh().await
    }

    /// Current identity with a usable ID token.
    ///
    /// An expired token is exchanged for a new one. If the provider rejects
    /// the refresh token the session is dropped; if it cannot be reached the
    /// stale identity is kept.
    pub async fn ensure_fresh(&self) -> Option<Identity> {
        let identity = self.current()?;
        if !identity.is_expired_at(unix_now()) {
            return Some(identity);
        }

        match self.refresh(&identity).await {
            Ok(fresh) => Some(fresh),
            Err(e @ (AuthError::RequestFailed(_) | AuthError::RateLimited)) => {
                warn!(error = %e, "could not refresh sign-in, keeping expired token");
                Some(identity)
            }
            Err(e) => {
                warn!(error = %e, email = %identity.email, "sign-in expired");
                if let Err(e) = self.sign_out().await {
                    warn!(error = %e, "failed to forget expired session");
                }
                None
            }
        }
    }

    /// Exchange the identity's refresh token for a new ID token, then
    /// persist and publish the result
    pub async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
        let refresh_token = identity
            .refresh_token
            .as_deref()
            .ok_or(AuthError::SessionExpired)?;

        let request = self
            .client
            .post(format!("{}/v1/token?key={}", self.token_base_url, self.api_key))
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token,
            });
        let response: RefreshResponse = Self::send(request).await?;

        let fresh = Identity::new(
            response.user_id.unwrap_or_else(|| identity.user_id.clone()),
            identity.email.clone(),
            response.id_token,
        );
        let fresh = match expiry_from(response.expires_in.as_deref()) {
            Some(expires_at) => fresh.with_refresh(
                response.refresh_token.as_deref().unwrap_or(refresh_token),
                expires_at,
            ),
            None => fresh,
        };

        debug!(email = %fresh.email, "ID token refreshed");
        self.establish(fresh).await
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.base_url, method, self.api_key
        )
    }

    /// Map a Firebase error message (`CODE` or `CODE : detail`) to an auth error
    fn map_error(message: &str) -> AuthError {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };

        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "EMAIL_EXISTS" => AuthError::EmailInUse,
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "WEAK_PASSWORD" => AuthError::WeakPassword(if detail.is_empty() {
                "Password should be at least 6 characters".to_string()
            } else {
                detail.to_string()
            }),
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
                AuthError::SessionExpired
            }
            _ => AuthError::ApiError(message.to_string()),
        }
    }

    async fn password_call(
        &self,
        method: &str,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        let body = PasswordRequest {
            email: credentials.email(),
            password: credentials.password(),
            return_secure_token: true,
        };

        let account: AccountResponse =
            Self::send(self.client.post(self.api_url(method)).json(&body)).await?;

        let identity = Identity::new(
            account.local_id,
            account.email.unwrap_or_else(|| credentials.email().to_string()),
            account.id_token,
        );
        Ok(match (account.refresh_token, expiry_from(account.expires_in.as_deref())) {
            (Some(refresh_token), Some(expires_at)) => {
                identity.with_refresh(refresh_token, expires_at)
            }
            _ => identity,
        })
    }

    /// Send a request and decode its JSON body, mapping Firebase errors
    async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, AuthError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AuthError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match serde_json::from_str::<ErrorResponse>(&error_text) {
                Ok(body) => Self::map_error(&body.error.message),
                Err(_) => AuthError::ApiError(format!("HTTP {}: {}", status, error_text)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::ApiError(format!("Unexpected response: {}", e)))
    }

    async fn persist(&self, identity: &Identity) -> Result<(), AuthError> {
        let Some(path) = &self.session_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::PersistFailed(e.to_string()))?;
        }

        let content =
            toml::to_string_pretty(identity).map_err(|e| AuthError::PersistFailed(e.to_string()))?;
        fs::write(path, content)
            .await
            .map_err(|e| AuthError::PersistFailed(e.to_string()))
    }

    /// Persist then publish the new identity
    async fn establish(&self, identity: Identity) -> Result<Identity, AuthError> {
        self.persist(&identity).await?;
        self.state.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Absolute expiry for an `expiresIn` value given in seconds
fn expiry_from(expires_in: Option<&str>) -> Option<u64> {
    let seconds = expires_in?.trim().parse::<u64>().ok()?;
    Some(unix_now().saturating_add(seconds))
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = self.password_call("signInWithPassword", credentials).await?;
        self.establish(identity).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = self.password_call("signUp", credentials).await?;
        self.establish(identity).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(path) = &self.session_path {
            if path.exists() {
                fs::remove_file(path)
                    .await
                    .map_err(|e| AuthError::PersistFailed(e.to_string()))?;
            }
        }

        self.state.send_replace(None);
        Ok(())
    }

    fn current(&self) -> Option<Identity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.state.subscribe()
    }
}
