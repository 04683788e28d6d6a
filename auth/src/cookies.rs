//! Cookie pair codec.
//!
//! A session is exposed to the browser as two cookies written and cleared
//! together: `token` (HTTP-only) and `loginType`. An optional third cookie,
//! `session`, carries signed claims for the hardened gate mode.

use serde::{Deserialize, Serialize};

/// Name of the bearer token cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Name of the role cookie.
pub const LOGIN_TYPE_COOKIE: &str = "loginType";

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "session";

/// The persisted `(token, loginType)` pair.
///
/// Never constructed with only one half set.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookiePair {
    /// Bearer token issued by the backend.
    pub token: String,
    /// Role namespace the token was issued for.
    #[serde(rename = "loginType")]
    pub login_type: String,
}

impl std::fmt::Debug for CookiePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookiePair")
            .field("token", &"<redacted>")
            .field("login_type", &self.login_type)
            .finish()
    }
}

/// Cookies relevant to authorization, as read from one request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestCookies {
    /// `token` cookie, `None` when absent or empty.
    pub token: Option<String>,
    /// `loginType` cookie, `None` when absent or empty.
    pub login_type: Option<String>,
    /// `session` cookie, `None` when absent or empty.
    pub session: Option<String>,
}

impl std::fmt::Debug for RequestCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCookies")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("login_type", &self.login_type)
            .field("session", &self.session.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RequestCookies {
    /// Parse one or more `Cookie` header values.
    ///
    /// Unknown cookies are ignored. Later duplicates win. Values are
    /// percent-decoded; a value that fails to decode is kept as sent.
    pub fn parse<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cookies = Self::default();

        for header in headers {
            for part in header.split(';') {
                let Some((name, value)) = part.trim().split_once('=') else {
                    continue;
                };
                let value = decode(value.trim());
                let value = (!value.is_empty()).then_some(value);

                match name.trim() {
                    TOKEN_COOKIE => cookies.token = value,
                    LOGIN_TYPE_COOKIE => cookies.login_type = value,
                    SESSION_COOKIE => cookies.session = value,
                    _ => {}
                }
            }
        }

        cookies
    }

    /// The persisted pair, if both halves are present.
    #[must_use]
    pub fn pair(&self) -> Option<CookiePair> {
        match (&self.token, &self.login_type) {
            (Some(token), Some(login_type)) => Some(CookiePair {
                token: token.clone(),
                login_type: login_type.clone(),
            }),
            _ => None,
        }
    }
}

/// Attributes applied to every `Set-Cookie` header we emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Add the `Secure` attribute (HTTPS deployments).
    pub secure: bool,
    /// `Max-Age` in seconds for issued cookies; `None` for session cookies.
    pub max_age: Option<i64>,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieSettings {
    /// Session-lifetime, non-secure cookies (local development).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            secure: false,
            max_age: None,
        }
    }

    /// Set the `Secure` attribute.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set `Max-Age` for issued cookies.
    #[must_use]
    pub const fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// `Set-Cookie` values writing both halves of the pair.
    #[must_use]
    pub fn set_pair(&self, pair: &CookiePair) -> [String; 2] {
        [
            self.render(TOKEN_COOKIE, &pair.token, true, self.max_age),
            self.render(LOGIN_TYPE_COOKIE, &pair.login_type, false, self.max_age),
        ]
    }

    /// `Set-Cookie` values deleting both halves of the pair.
    #[must_use]
    pub fn clear_pair(&self) -> [String; 2] {
        [
            self.render(TOKEN_COOKIE, "", true, Some(0)),
            self.render(LOGIN_TYPE_COOKIE, "", false, Some(0)),
        ]
    }

    /// `Set-Cookie` value carrying signed session claims.
    #[must_use]
    pub fn set_session(&self, jwt: &str) -> String {
        self.render(SESSION_COOKIE, jwt, true, self.max_age)
    }

    /// `Set-Cookie` value deleting the signed session cookie.
    #[must_use]
    pub fn clear_session(&self) -> String {
        self.render(SESSION_COOKIE, "", true, Some(0))
    }

    fn render(&self, name: &str, value: &str, http_only: bool, max_age: Option<i64>) -> String {
        let mut cookie = format!("{name}={}; Path=/; SameSite=Lax", urlencoding::encode(value));
        if let Some(seconds) = max_age {
            cookie.push_str(&format!("; Max-Age={seconds}"));
        }
        if http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value).map_or_else(|_| value.to_string(), std::borrow::Cow::into_owned)
}
