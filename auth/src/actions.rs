//! Session issuer actions.
//!
//! Actions are every input to the session reducer: commands from the UI
//! (`Login`, `Logout`, `RestoreSession`, `VerifySession`) and the results
//! fed back by effects.

use crate::error::AuthError;
use crate::state::{Credentials, Session};

/// Session issuer action.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════

    /// Exchange credentials for a session.
    Login {
        /// Form input as submitted.
        credentials: Credentials,
    },

    /// Login succeeded and the session was persisted.
    LoginSucceeded {
        /// The new session.
        session: Session,
    },

    /// Login failed; nothing was persisted.
    LoginFailed {
        /// Why.
        error: AuthError,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Logout
    // ═══════════════════════════════════════════════════════════════════

    /// End the current session.
    Logout,

    /// Logout finished.
    LogoutCompleted {
        /// Whether the backend confirmed the token invalidation.
        backend_invalidated: bool,
        /// Whether the local session was removed.
        local_cleared: bool,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Restore & Verify
    // ═══════════════════════════════════════════════════════════════════

    /// Load the persisted session and verify it.
    RestoreSession,

    /// The persisted session was read.
    SessionRestored {
        /// Cached session, unverified.
        cached: Option<Session>,
    },

    /// Ask the backend to confirm `token`.
    VerifySession {
        /// Bearer token.
        token: String,
    },

    /// The backend confirmed the session.
    SessionVerified {
        /// Session rebuilt from the backend response.
        session: Session,
    },

    /// Verification failed and the session was cleared.
    SessionCleared {
        /// Why.
        reason: AuthError,
    },
}

impl AuthAction {
    /// Build a login action from raw form values.
    pub fn login(
        email: impl Into<String>,
        password: impl Into<String>,
        login_type: impl Into<String>,
    ) -> Self {
        Self::Login {
            credentials: Credentials::new(email, password, login_type),
        }
    }

    /// Returns `true` for actions that end a login.
    #[must_use]
    pub const fn is_login_outcome(&self) -> bool {
        matches!(self, Self::LoginSucceeded { .. } | Self::LoginFailed { .. })
    }

    /// Returns `true` for actions that end a logout.
    #[must_use]
    pub const fn is_logout_outcome(&self) -> bool {
        matches!(self, Self::LogoutCompleted { .. })
    }

    /// Returns `true` for actions that end a verification.
    #[must_use]
    pub const fn is_verify_outcome(&self) -> bool {
        matches!(self, Self::SessionVerified { .. } | Self::SessionCleared { .. })
    }

    /// Returns `true` for actions that end a restore.
    #[must_use]
    pub const fn is_restore_outcome(&self) -> bool {
        matches!(self, Self::SessionRestored { cached: None }) || self.is_verify_outcome()
    }
}
