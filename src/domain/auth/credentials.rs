//! Email/password credentials value object

use std::fmt;

use crate::domain::error::CredentialsError;

/// Minimum password length accepted for new accounts
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validated email/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Validate credentials for signing in to an existing account
    pub fn for_login(email: &str, password: &str) -> Result<Self, CredentialsError> {
        let email = Self::validate_email(email)?;
        if password.is_empty() {
            return Err(CredentialsError::MissingPassword);
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }

    /// Validate credentials for creating a new account
    pub fn for_registration(email: &str, password: &str) -> Result<Self, CredentialsError> {
        let credentials = Self::for_login(email, password)?;
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CredentialsError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(credentials)
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    fn validate_email(email: &str) -> Result<String, CredentialsError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CredentialsError::MissingEmail);
        }

        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid || email.contains(char::is_whitespace) {
            return Err(CredentialsError::InvalidEmail(email.to_string()));
        }

        Ok(email.to_string())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_trims_email() {
        let creds = Credentials::for_login("  ada@example.com ", "pw").unwrap();
        assert_eq!(creds.email(), "ada@example.com");
        assert_eq!(creds.password(), "pw");
    }

    #[test]
    fn login_requires_email() {
        assert_eq!(
            Credentials::for_login("  ", "secret").unwrap_err(),
            CredentialsError::MissingEmail
        );
    }

    #[test]
    fn login_rejects_malformed_email() {
        for email in ["ada", "@example.com", "ada@", "a@b@c", "ada @example.com"] {
            assert!(
                matches!(
                    Credentials::for_login(email, "secret"),
                    Err(CredentialsError::InvalidEmail(_))
                ),
                "{email}"
            );
        }
    }

    #[test]
    fn login_requires_password() {
        assert_eq!(
            Credentials::for_login("ada@example.com", "").unwrap_err(),
            CredentialsError::MissingPassword
        );
    }

    #[test]
    fn registration_enforces_minimum_length() {
        let err = Credentials::for_registration("ada@example.com", "12345").unwrap_err();
        assert_eq!(err, CredentialsError::PasswordTooShort { min: 6 });
        assert!(Credentials::for_registration("ada@example.com", "123456").is_ok());
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::for_login("ada@example.com", "hunter22").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ada@example.com"));
        assert!(!debug.contains("hunter22"));
    }
}
