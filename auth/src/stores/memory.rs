//! In-memory session store.

use crate::cookies::{CookiePair, RequestCookies};
use crate::error::Result;
use crate::providers::SessionStore;
use crate::state::{ClientRecord, Session};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the single active session for one browser context.
///
/// The cookie pair and client record are rendered from the held session
/// on demand, so they can never disagree with each other.
///
/// Clones share the same session.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<RwLock<Option<Session>>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Seed a store from request cookies.
    ///
    /// Only a complete pair with a known `loginType` is loaded; anything
    /// else yields an empty store.
    #[must_use]
    pub fn from_cookies(cookies: &RequestCookies) -> Self {
        cookies
            .pair()
            .as_ref()
            .and_then(Session::from_cookie_pair)
            .map_or_else(Self::new, Self::with_session)
    }

    /// Current session, if any.
    pub async fn snapshot(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Cookie view of the current session.
    pub async fn cookie_pair(&self) -> Option<CookiePair> {
        self.session.read().await.as_ref().map(Session::cookie_pair)
    }

    /// Client record view of the current session.
    pub async fn client_record(&self) -> Option<ClientRecord> {
        self.session.read().await.as_ref().map(Session::client_record)
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get_session(&self) -> Result<Option<Session>> {
        Ok(self.snapshot().await)
    }

    async fn set_session(&self, session: &Session) -> Result<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<()> {
        *self.session.write().await = None;
        Ok(())
    }
}
