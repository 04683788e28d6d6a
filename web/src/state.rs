//! Application state for Axum handlers.
//!
//! The state holds what every session handler shares: the backend client,
//! cookie attributes, the session signer and the clock. Sessions themselves
//! are never shared; each request builds its own issuer around a store
//! seeded from that request's cookies.

use std::sync::Arc;
use std::time::Duration;
use verdant_auth::{
    providers::AuthBackend, stores::InMemorySessionStore, CookieSettings, SessionIssuer,
    SessionReducer, SessionSigner,
};
use verdant_core::environment::{Clock, SystemClock};

/// Default bound on each backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for the session handlers.
///
/// # Examples
///
/// ```ignore
/// let state = AppState::new(HttpAuthBackend::new(config)?, signer)
///     .with_cookie_settings(CookieSettings::new().with_secure(true));
/// let app = Router::new().merge(handlers::session::routes()).with_state(state);
/// ```
pub struct AppState<B> {
    backend: B,
    cookies: CookieSettings,
    signer: SessionSigner,
    backend_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl<B: Clone> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            cookies: self.cookies.clone(),
            signer: self.signer.clone(),
            backend_timeout: self.backend_timeout,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<B> AppState<B>
where
    B: AuthBackend + Clone + 'static,
{
    /// Create state with default cookie attributes, timeout and system clock.
    #[must_use]
    pub fn new(backend: B, signer: SessionSigner) -> Self {
        Self {
            backend,
            cookies: CookieSettings::new(),
            signer,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use these cookie attributes.
    #[must_use]
    pub fn with_cookie_settings(mut self, cookies: CookieSettings) -> Self {
        self.cookies = cookies;
        self
    }

    /// Bound each backend call by `timeout`.
    #[must_use]
    pub const fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Use `clock` for session claims.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build an issuer for one request.
    #[must_use]
    pub fn issuer(&self, sessions: InMemorySessionStore) -> SessionIssuer<B, InMemorySessionStore> {
        SessionIssuer::with_reducer(
            self.backend.clone(),
            sessions,
            SessionReducer::with_timeout(self.backend_timeout),
        )
    }

    /// Cookie attributes.
    #[must_use]
    pub const fn cookies(&self) -> &CookieSettings {
        &self.cookies
    }

    /// Session claims signer.
    #[must_use]
    pub const fn signer(&self) -> &SessionSigner {
        &self.signer
    }

    /// Clock used for session claims.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
