//! Error types for session issuing and verification.

use thiserror::Error;
use verdant_runtime::StoreError;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Message shown when the backend rejects a login without saying why.
pub const GENERIC_LOGIN_FAILURE: &str = "Invalid email or password";

/// Error taxonomy for the session issuer.
///
/// Every failure a caller can observe from `login`, `logout` or `verify`
/// maps to exactly one variant. None of them carry a password or token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// Credentials failed local validation; no request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════
    // Backend Errors
    // ═══════════════════════════════════════════════════════════

    /// The backend rejected the credentials.
    ///
    /// `message` is the backend's own message when it sent one.
    #[error("{message}")]
    Authentication {
        /// Message suitable for display
        message: String,
    },

    /// The backend could not be reached or failed server-side.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend did not answer within the configured timeout.
    #[error("Backend request timed out")]
    Timeout,

    /// The backend answered 2xx with a body we cannot use.
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    /// The backend refused to confirm a persisted token.
    #[error("Session verification failed: {0}")]
    VerificationFailed(String),

    // ═══════════════════════════════════════════════════════════
    // Local Errors
    // ═══════════════════════════════════════════════════════════

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {0}")]
    Storage(String),

    /// A signed session cookie could not be issued or decoded.
    #[error("Invalid session claims: {0}")]
    Claims(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Backend rejection with the generic message.
    #[must_use]
    pub fn rejected() -> Self {
        Self::Authentication {
            message: GENERIC_LOGIN_FAILURE.to_string(),
        }
    }

    /// Returns `true` if this error is due to what the user typed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use verdant_auth::AuthError;
    /// assert!(AuthError::rejected().is_user_error());
    /// assert!(!AuthError::Timeout.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Authentication { .. })
    }

    /// Returns `true` if retrying the same request may succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use verdant_auth::AuthError;
    /// assert!(AuthError::Timeout.is_retryable());
    /// assert!(!AuthError::Validation("email is required".into()).is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Timeout => Self::Timeout,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_displays_message_verbatim() {
        let error = AuthError::Authentication {
            message: "Account is locked".to_string(),
        };
        assert_eq!(error.to_string(), "Account is locked");
        assert_eq!(AuthError::rejected().to_string(), GENERIC_LOGIN_FAILURE);
    }

    #[test]
    fn test_store_timeout_maps_to_timeout() {
        assert_eq!(AuthError::from(StoreError::Timeout), AuthError::Timeout);
        assert!(matches!(
            AuthError::from(StoreError::ShutdownInProgress),
            AuthError::Internal(_)
        ));
    }
}
