//! Session token authentication.
//!
//! The backend issues a JWT on login and reads it back from the
//! `access_token` cookie. The same token also goes out as
//! `Authorization: Bearer <token>` for deployments that sit behind a
//! header-based proxy. The token is held in a [`SecretString`] and never
//! appears in `Debug` output or logs.

use crate::error::{ApiError, Result};
use secrecy::{ExposeSecret, SecretString};

/// Default environment variable holding the session token.
pub const TOKEN_ENV: &str = "PARLAY_API_TOKEN";

/// Cookie the backend reads the session from.
pub const SESSION_COOKIE: &str = "access_token";

/// A session token for authenticated requests.
pub struct BearerAuth {
    token: SecretString,
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl BearerAuth {
    /// Wraps a raw token.
    ///
    /// # Errors
    /// Returns [`ApiError::Configuration`] if the token is blank.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Configuration("API token is empty".to_string()));
        }
        Ok(Self {
            token: SecretString::from(trimmed.to_string()),
        })
    }

    /// Reads the token from an environment variable.
    ///
    /// # Errors
    /// Returns [`ApiError::Configuration`] if the variable is unset or blank.
    pub fn from_env(var: &str) -> Result<Self> {
        let token = std::env::var(var).map_err(|_| {
            ApiError::Configuration(format!("missing environment variable: {var}"))
        })?;
        Self::new(token)
    }

    /// Picks the configured token, falling back to [`TOKEN_ENV`].
    ///
    /// Returns `None` when neither is set; anonymous access is allowed for
    /// public endpoints.
    #[must_use]
    pub fn resolve(configured: Option<&str>) -> Option<Self> {
        configured
            .and_then(|t| Self::new(t).ok())
            .or_else(|| Self::from_env(TOKEN_ENV).ok())
    }

    /// Value for the `Authorization` header.
    pub(crate) fn header_value(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    /// Value for the `Cookie` header carrying the session.
    pub(crate) fn cookie_value(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.token.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let auth = BearerAuth::new("super-secret-jwt").unwrap();
        let debug = format!("{auth:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-jwt"));
    }

    #[test]
    fn test_header_value() {
        let auth = BearerAuth::new("  abc.def.ghi \n").unwrap();
        assert_eq!(auth.header_value(), "Bearer abc.def.ghi");
    }

    #[test]
    fn test_cookie_value() {
        let auth = BearerAuth::new("abc.def.ghi").unwrap();
        assert_eq!(auth.cookie_value(), "access_token=abc.def.ghi");
    }

    #[test]
    fn test_blank_token_rejected() {
        assert!(matches!(
            BearerAuth::new("   "),
            Err(ApiError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_env_missing() {
        let err = BearerAuth::from_env("PARLAY_TEST_TOKEN_THAT_IS_NEVER_SET").unwrap_err();
        assert!(err.to_string().contains("PARLAY_TEST_TOKEN_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_resolve_prefers_configured() {
        let auth = BearerAuth::resolve(Some("from-config")).unwrap();
        assert_eq!(auth.header_value(), "Bearer from-config");
    }
}
