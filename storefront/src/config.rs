//! Configuration management for the storefront server.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use verdant_auth::{AuthConfig, CookieSettings, RoleSource, RouteGate, SessionSigner};

/// Secret used when `SESSION_SECRET` is unset. Development only.
pub const DEV_SESSION_SECRET: &str = "dev-secret-change-in-production";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Auth backend configuration
    pub backend: BackendConfig,
    /// Session cookie and gate configuration
    pub session: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Auth backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the REST backend
    pub url: String,
    /// User login endpoint path
    pub user_login_path: String,
    /// Seller login endpoint path
    pub seller_login_path: String,
    /// Token verification endpoint path
    pub verify_path: String,
    /// Logout endpoint path
    pub logout_path: String,
    /// Bound on each backend call, in seconds
    pub timeout_secs: u64,
}

/// Session cookie and gate configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret for signing the `session` cookie
    pub secret: String,
    /// Lifetime of issued cookies and claims, in seconds
    pub ttl_secs: i64,
    /// Mark cookies `Secure`
    pub cookie_secure: bool,
    /// Where the gate reads the role from
    pub role_source: RoleSource,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("role_source", &self.role_source)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "PORT").unwrap_or(3000),
            },
            backend: BackendConfig {
                url: lookup("BACKEND_URL")
                    .unwrap_or_else(|| "http://localhost:5000".to_string()),
                user_login_path: lookup("USER_LOGIN_PATH")
                    .unwrap_or_else(|| verdant_auth::config::DEFAULT_USER_LOGIN_PATH.to_string()),
                seller_login_path: lookup("SELLER_LOGIN_PATH").unwrap_or_else(|| {
                    verdant_auth::config::DEFAULT_SELLER_LOGIN_PATH.to_string()
                }),
                verify_path: lookup("VERIFY_PATH")
                    .unwrap_or_else(|| verdant_auth::config::DEFAULT_VERIFY_PATH.to_string()),
                logout_path: lookup("LOGOUT_PATH")
                    .unwrap_or_else(|| verdant_auth::config::DEFAULT_LOGOUT_PATH.to_string()),
                timeout_secs: parsed(&lookup, "BACKEND_TIMEOUT_SECS").unwrap_or(10),
            },
            session: SessionConfig {
                secret: lookup("SESSION_SECRET")
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEV_SESSION_SECRET.to_string()),
                ttl_secs: parsed(&lookup, "SESSION_TTL_SECS").unwrap_or(604_800), // 7 days
                cookie_secure: parsed(&lookup, "COOKIE_SECURE").unwrap_or(false),
                role_source: lookup("GATE_ROLE_SOURCE")
                    .and_then(|s| RoleSource::parse(&s))
                    .unwrap_or_default(),
            },
        }
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

impl BackendConfig {
    /// Bound on each backend call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client configuration for the HTTP backend.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.url.clone())
            .with_user_login_path(self.user_login_path.clone())
            .with_seller_login_path(self.seller_login_path.clone())
            .with_verify_path(self.verify_path.clone())
            .with_logout_path(self.logout_path.clone())
            .with_request_timeout(self.timeout())
    }
}

impl SessionConfig {
    /// Whether the development secret is in use.
    #[must_use]
    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_SESSION_SECRET
    }

    /// Signer for the `session` cookie.
    #[must_use]
    pub fn signer(&self) -> SessionSigner {
        SessionSigner::new(
            self.secret.as_bytes(),
            chrono::Duration::seconds(self.ttl_secs),
        )
    }

    /// Attributes for every cookie the server sets.
    #[must_use]
    pub const fn cookie_settings(&self) -> CookieSettings {
        CookieSettings::new()
            .with_secure(self.cookie_secure)
            .with_max_age(self.ttl_secs)
    }

    /// Route gate for the configured role source.
    #[must_use]
    pub fn gate(&self) -> RouteGate {
        match self.role_source {
            RoleSource::Cookie => RouteGate::cookie(),
            RoleSource::SignedSession => RouteGate::signed(self.signer()),
        }
    }
}
