//! Auth backend trait and response parsing.

use crate::error::{AuthError, Result};
use crate::state::LoginType;
use serde_json::Value;

/// Successful login response.
#[derive(Clone, PartialEq)]
pub struct LoginResponse {
    /// Non-empty bearer token.
    pub token: String,
    /// Role entity (`user` or `seller` object), `Null` if absent.
    pub user: Value,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

impl LoginResponse {
    /// Parse a 2xx login body.
    ///
    /// The role entity is read from the key named after the login flow
    /// (`user` or `seller`), falling back to `user`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Authentication`] if the body says `success: false`
    /// - [`AuthError::MalformedResponse`] if `token` is missing or empty
    pub fn from_body(login_type: LoginType, body: &Value) -> Result<Self> {
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(rejection(body));
        }

        let token = match body.get("token").and_then(Value::as_str) {
            Some(token) if !token.trim().is_empty() => token.to_string(),
            _ => {
                return Err(AuthError::MalformedResponse(
                    "login response has no token".to_string(),
                ));
            }
        };

        let user = body
            .get(login_type.as_str())
            .or_else(|| body.get("user"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(Self { token, user })
    }
}

/// Backend rejection built from an error body.
///
/// Uses the body's `message` (or `error`) verbatim, the generic text
/// otherwise.
#[must_use]
pub fn rejection(body: &Value) -> AuthError {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map_or_else(AuthError::rejected, |message| AuthError::Authentication {
            message: message.to_string(),
        })
}

/// Extract the role entity from a 2xx verify body.
///
/// # Errors
///
/// Returns [`AuthError::VerificationFailed`] unless the body is
/// `{ success: true, user: { .. } }`.
pub fn verified_user(body: Value) -> Result<Value> {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        let reason = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("backend did not confirm the token");
        return Err(AuthError::VerificationFailed(reason.to_string()));
    }

    match body {
        Value::Object(mut map) => match map.remove("user") {
            Some(user @ Value::Object(_)) => Ok(user),
            _ => Err(AuthError::VerificationFailed(
                "verify response has no user".to_string(),
            )),
        },
        _ => Err(AuthError::VerificationFailed(
            "verify response is not an object".to_string(),
        )),
    }
}

/// Auth backend.
///
/// This trait abstracts over the storefront backend's auth routes.
///
/// # Implementation Notes
///
/// - `login` sends exactly one request, to the endpoint for `login_type`
/// - Implementations should bound every call; the reducer bounds them too
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend rejects the credentials → `AuthError::Authentication`
    /// - The backend is unreachable → `AuthError::Network`
    /// - The call exceeds its deadline → `AuthError::Timeout`
    /// - The body lacks a token → `AuthError::MalformedResponse`
    fn login(
        &self,
        login_type: LoginType,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<LoginResponse>> + Send;

    /// Confirm a token and return the backend's current role entity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::VerificationFailed` if the backend refuses the
    /// token, or a transport error.
    fn verify(&self, token: &str) -> impl std::future::Future<Output = Result<Value>> + Send;

    /// Invalidate a token server-side.
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses or cannot be reached.
    fn logout(&self, token: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
