//! Backend and session configuration.
//!
//! Values should be provided by the application, not hardcoded. Defaults
//! match the storefront backend's routes.

use crate::state::LoginType;
use std::time::Duration;

/// Default login path for shoppers.
pub const DEFAULT_USER_LOGIN_PATH: &str = "/api/users/login";

/// Default login path for sellers.
pub const DEFAULT_SELLER_LOGIN_PATH: &str = "/api/sellers/login";

/// Default token verification path.
pub const DEFAULT_VERIFY_PATH: &str = "/api/auth/verify";

/// Default logout path.
pub const DEFAULT_LOGOUT_PATH: &str = "/api/auth/logout";

/// Where and how to reach the auth backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Backend origin (e.g., "https://api.example.com").
    ///
    /// Endpoints are formatted as `{backend_url}{path}`.
    pub backend_url: String,

    /// Login endpoint for `LoginType::User`.
    pub user_login_path: String,

    /// Login endpoint for `LoginType::Seller`.
    pub seller_login_path: String,

    /// Token verification endpoint.
    pub verify_path: String,

    /// Logout endpoint.
    pub logout_path: String,

    /// Upper bound for every backend call.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,
}

impl AuthConfig {
    /// Create new backend configuration with default paths.
    ///
    /// # Arguments
    ///
    /// * `backend_url` - Backend origin; a trailing `/` is ignored
    #[must_use]
    pub fn new(backend_url: impl Into<String>) -> Self {
        let backend_url = backend_url.into().trim_end_matches('/').to_string();
        Self {
            backend_url,
            user_login_path: DEFAULT_USER_LOGIN_PATH.to_string(),
            seller_login_path: DEFAULT_SELLER_LOGIN_PATH.to_string(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            logout_path: DEFAULT_LOGOUT_PATH.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set the shopper login path.
    #[must_use]
    pub fn with_user_login_path(mut self, path: impl Into<String>) -> Self {
        self.user_login_path = path.into();
        self
    }

    /// Set the seller login path.
    #[must_use]
    pub fn with_seller_login_path(mut self, path: impl Into<String>) -> Self {
        self.seller_login_path = path.into();
        self
    }

    /// Set the verification path.
    #[must_use]
    pub fn with_verify_path(mut self, path: impl Into<String>) -> Self {
        self.verify_path = path.into();
        self
    }

    /// Set the logout path.
    #[must_use]
    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute login URL for a login flow.
    #[must_use]
    pub fn login_url(&self, login_type: LoginType) -> String {
        match login_type {
            LoginType::User => self.url(&self.user_login_path),
            LoginType::Seller => self.url(&self.seller_login_path),
        }
    }

    /// Absolute verification URL.
    #[must_use]
    pub fn verify_url(&self) -> String {
        self.url(&self.verify_path)
    }

    /// Absolute logout URL.
    #[must_use]
    pub fn logout_url(&self) -> String {
        self.url(&self.logout_path)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.backend_url)
        } else {
            format!("{}/{path}", self.backend_url)
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}
