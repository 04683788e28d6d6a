//! Session state types.
//!
//! All types are `Clone` to support the functional architecture pattern.
//! A [`Session`] is the one owned value behind every persisted view: the
//! cookie pair, the client record and the in-memory session.

use crate::cookies::CookiePair;
use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// Roles
// ═══════════════════════════════════════════════════════════════════════

/// Role a session was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper.
    User,
    /// Storefront seller.
    Seller,
    /// Administrator; bypasses namespace checks.
    Admin,
}

impl Role {
    /// Wire name, also the `loginType` cookie value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }

    /// Landing page after a successful login.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::User => "/user/dashboard",
            Self::Seller => "/seller/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// Parse a wire name. Exact, case-sensitive match.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "seller" => Some(Self::Seller),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which self-service login flow to use.
///
/// Admin sessions come from a separate flow and cannot be requested here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    /// Shopper login endpoint.
    User,
    /// Seller login endpoint.
    Seller,
}

impl LoginType {
    /// The role a session from this flow carries.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::User => Role::User,
            Self::Seller => Role::Seller,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.role().as_str()
    }
}

impl FromStr for LoginType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "user" => Ok(Self::User),
            "seller" => Ok(Self::Seller),
            other => Err(AuthError::Validation(format!(
                "login type must be `user` or `seller`, got `{other}`"
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// An issued session.
///
/// `token` and `role` are always set together; there is no way to build a
/// session with one but not the other.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token from the backend.
    pub token: String,
    /// Role, fixed at issuance.
    pub role: Role,
    /// Backend id of the role entity (`id` or `_id`).
    pub subject_id: Option<String>,
    /// Email of the role entity.
    pub email: Option<String>,
    /// Role entity as returned by the backend. Display only.
    pub user: Value,
    /// Whether `role` came from the backend rather than a client cookie.
    #[serde(skip)]
    role_confirmed: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .field("subject_id", &self.subject_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from a role entity returned by the backend.
    ///
    /// `fallback_email` is used when the entity has no `email` field.
    #[must_use]
    pub fn from_entity(token: String, role: Role, user: Value, fallback_email: Option<&str>) -> Self {
        let subject_id = ["id", "_id"].iter().find_map(|key| match user.get(*key) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        });
        let email = user
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| fallback_email.map(str::to_string));

        Self {
            token,
            role,
            subject_id,
            email,
            user,
            role_confirmed: true,
        }
    }

    /// Restore a session from the cookie pair alone.
    ///
    /// Returns `None` for an unknown `loginType`. The result is only a cache
    /// and must be verified before it is trusted.
    #[must_use]
    pub fn from_cookie_pair(pair: &CookiePair) -> Option<Self> {
        if pair.token.is_empty() {
            return None;
        }
        let role = Role::parse(&pair.login_type)?;
        Some(Self {
            token: pair.token.clone(),
            role,
            subject_id: None,
            email: None,
            user: Value::Null,
            role_confirmed: false,
        })
    }

    /// Whether the role was set by the backend.
    ///
    /// `false` for sessions restored from cookies, whose `loginType` is
    /// client-controlled until a verify response names the role.
    #[must_use]
    pub const fn role_confirmed(&self) -> bool {
        self.role_confirmed
    }

    /// Cookie view of this session.
    #[must_use]
    pub fn cookie_pair(&self) -> CookiePair {
        CookiePair {
            token: self.token.clone(),
            login_type: self.role.as_str().to_string(),
        }
    }

    /// Client-side record view of this session.
    #[must_use]
    pub fn client_record(&self) -> ClientRecord {
        ClientRecord {
            auth_token: self.token.clone(),
            user_data: self.user.clone(),
        }
    }
}

/// Client-side persisted record: `{ authToken, userData }`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Same token as the cookie pair.
    #[serde(rename = "authToken")]
    pub auth_token: String,
    /// Role entity for display.
    #[serde(rename = "userData")]
    pub user_data: Value,
}

impl std::fmt::Debug for ClientRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRecord")
            .field("auth_token", &"<redacted>")
            .field("user_data", &self.user_data)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Credentials
// ═══════════════════════════════════════════════════════════════════════

/// Login form input, exactly as submitted.
///
/// Missing form fields deserialize as empty strings so they are reported by
/// [`Credentials::validate`] rather than by the decoder.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Requested login flow (`user` or `seller`).
    #[serde(rename = "loginType")]
    pub login_type: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("login_type", &self.login_type)
            .finish()
    }
}

/// Credentials that passed local validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidCredentials {
    /// Trimmed email address.
    pub email: String,
    /// Password, unmodified.
    pub password: String,
    /// Parsed login flow.
    pub login_type: LoginType,
}

impl std::fmt::Debug for ValidCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidCredentials")
            .field("email", &self.email)
            .field("login_type", &self.login_type)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Build credentials from raw form values.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        login_type: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            login_type: login_type.into(),
        }
    }

    /// Validate locally, without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the email or password is empty,
    /// the email has no `local@domain` shape, or the login type is not
    /// `user` or `seller`.
    pub fn validate(&self) -> Result<ValidCredentials> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("email is required".to_string()));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(AuthError::Validation(
                    "email must look like name@domain".to_string(),
                ));
            }
        }
        if self.password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }
        let login_type = self.login_type.parse::<LoginType>()?;

        Ok(ValidCredentials {
            email: email.to_string(),
            password: self.password.clone(),
            login_type,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Reducer State
// ═══════════════════════════════════════════════════════════════════════

/// Where a session is in its load lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionLoad {
    /// Nothing persisted.
    #[default]
    Empty,
    /// Read from storage, not yet confirmed by the backend.
    Unverified(Session),
    /// Issued or confirmed by the backend.
    Verified(Session),
    /// Removed by logout or failed verification.
    Cleared,
}

impl SessionLoad {
    /// The session, only once the backend has vouched for it.
    #[must_use]
    pub const fn verified(&self) -> Option<&Session> {
        match self {
            Self::Verified(session) => Some(session),
            _ => None,
        }
    }

    /// The session regardless of verification.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Unverified(session) | Self::Verified(session) => Some(session),
            Self::Empty | Self::Cleared => None,
        }
    }
}

/// Root state managed by the session reducer.
///
/// # Examples
///
/// ```
/// use verdant_auth::state::{AuthState, SessionLoad};
///
/// let state = AuthState::default();
/// assert_eq!(state.load, SessionLoad::Empty);
/// assert!(state.redirect.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Current session lifecycle state.
    pub load: SessionLoad,
    /// Where the UI should navigate after the last completed operation.
    pub redirect: Option<String>,
    /// Error from the last failed operation.
    pub last_error: Option<AuthError>,
}
