//! Signed session claims.
//!
//! A compact HS256 JWT summarizing an issued session. The web layer sets it
//! as the `session` cookie; the gate can derive the role from it instead of
//! trusting the plain `loginType` cookie.
//!
//! Claims are bound to the backend token they were issued with through a
//! SHA-256 digest (`tkh`), so a valid `session` cookie paired with another
//! `token` cookie is worthless.

use crate::error::{AuthError, Result};
use crate::state::{Role, Session};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use verdant_core::environment::Clock;

/// Claims carried by the `session` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Backend id of the role entity, empty if the backend sent none.
    pub sub: String,
    /// Role the session was issued for.
    pub role: Role,
    /// Email, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
    /// Digest of the backend token, see [`token_digest`].
    #[serde(default)]
    pub tkh: String,
}

impl SessionClaims {
    /// Whether these claims were issued for `token`.
    #[must_use]
    pub fn binds(&self, token: &str) -> bool {
        !self.tkh.is_empty()
            && constant_time_eq::constant_time_eq(self.tkh.as_bytes(), token_digest(token).as_bytes())
    }
}

/// Unpadded URL-safe base64 of the SHA-256 of `token`.
#[must_use]
pub fn token_digest(token: &str) -> String {
    use base64::Engine;

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// Issues and checks [`SessionClaims`].
#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Create a signer from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8], ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Lifetime of issued claims.
    #[must_use]
    pub const fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Sign claims for `session`, stamped with `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Claims`] if encoding fails.
    pub fn issue(&self, session: &Session, clock: &dyn Clock) -> Result<String> {
        let now = clock.now();
        let claims = SessionClaims {
            sub: session.subject_id.clone().unwrap_or_default(),
            role: session.role,
            email: session.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            tkh: token_digest(&session.token),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Claims(format!("JWT encode failed: {e}")))
    }

    /// Decode `jwt` and check it has not expired at `clock`'s time.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Claims`] if the signature is invalid, the token
    /// is malformed, or it has expired.
    pub fn verify(&self, jwt: &str, clock: &dyn Clock) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<SessionClaims>(jwt, &self.decoding, &validation)
            .map_err(|e| AuthError::Claims(format!("invalid session: {e}")))?
            .claims;

        if expired(&claims, clock.now()) {
            return Err(AuthError::Claims("session has expired".to_string()));
        }

        Ok(claims)
    }
}

fn expired(claims: &SessionClaims, now: DateTime<Utc>) -> bool {
    claims.exp <= now.timestamp()
}
