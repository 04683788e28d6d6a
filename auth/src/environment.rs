//! Session issuer environment.
//!
//! Dependencies injected into the session reducer.

use crate::providers::{AuthBackend, SessionStore};

/// Session issuer environment.
///
/// # Type Parameters
///
/// - `B`: Auth backend
/// - `S`: Session store
#[derive(Debug, Clone)]
pub struct AuthEnvironment<B, S>
where
    B: AuthBackend + Clone,
    S: SessionStore + Clone,
{
    /// Auth backend (login, verify, logout).
    pub backend: B,

    /// Owner of the persisted session.
    pub sessions: S,
}

impl<B, S> AuthEnvironment<B, S>
where
    B: AuthBackend + Clone,
    S: SessionStore + Clone,
{
    /// Create a new environment.
    #[must_use]
    pub const fn new(backend: B, sessions: S) -> Self {
        Self { backend, sessions }
    }
}
