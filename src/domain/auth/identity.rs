//! Signed-in identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// ID tokens this close to expiry count as expired
pub const EXPIRY_MARGIN_SECS: u64 = 60;

/// The account currently signed in.
///
/// Only the email is ever shown; the token authorises remote store calls.
/// The refresh token, when present, lets the provider mint a new ID token
/// once `expires_at` (unix seconds) has passed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Identity {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        id_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            id_token: id_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Attach the refresh token and the ID token's expiry
    pub fn with_refresh(mut self, refresh_token: impl Into<String>, expires_at: u64) -> Self {
        self.refresh_token = Some(refresh_token.into()).filter(|t: &String| !t.is_empty());
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the ID token is expired, or about to be, at `now` (unix seconds).
    /// Identities without a known expiry never expire.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now.saturating_add(EXPIRY_MARGIN_SECS) >= expires_at)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_email() {
        let identity = Identity::new("uid-1", "ada@example.com", "token");
        assert_eq!(identity.to_string(), "ada@example.com");
    }

    #[test]
    fn debug_hides_token() {
        let identity = Identity::new("uid-1", "ada@example.com", "secret-token");
        assert!(!format!("{:?}", identity).contains("secret-token"));
    }

    #[test]
    fn debug_hides_refresh_token() {
        let identity =
            Identity::new("uid-1", "ada@example.com", "token").with_refresh("secret-refresh", 10);
        assert!(!format!("{:?}", identity).contains("secret-refresh"));
    }

    #[test]
    fn expiry_uses_margin() {
        let identity = Identity::new("uid-1", "ada@example.com", "token").with_refresh("r", 1_000);
        assert!(!identity.is_expired_at(1_000 - EXPIRY_MARGIN_SECS - 1));
        assert!(identity.is_expired_at(1_000 - EXPIRY_MARGIN_SECS));
        assert!(identity.is_expired_at(5_000));
    }

    #[test]
    fn unknown_expiry_never_expires() {
        let identity = Identity::new("uid-1", "ada@example.com", "token");
        assert!(!identity.is_expired_at(u64::MAX));
    }

    #[test]
    fn session_without_refresh_fields_still_parses() {
        let identity: Identity =
            toml::from_str("user_id = \"u\"\nemail = \"a@b.c\"\nid_token = \"t\"\n").unwrap();
        assert!(identity.refresh_token.is_none());
        assert!(identity.expires_at.is_none());
    }
}
