//! Session issuer.
//!
//! Request/response facade over the session [`Store`]: each method
//! dispatches one command and waits for the action that ends it.
//!
//! One issuer serves one browser context. Concurrent calls on the same
//! issuer may observe each other's outcome actions.

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{AuthBackend, SessionStore};
use crate::reducers::SessionReducer;
use crate::state::{AuthState, Credentials, Session, SessionLoad};
use std::time::Duration;
use verdant_runtime::Store;

/// Store type running the session reducer.
pub type SessionStoreRuntime<B, S> =
    Store<AuthState, AuthAction, AuthEnvironment<B, S>, SessionReducer<B, S>>;

/// Successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// The persisted session.
    pub session: Session,
    /// Role dashboard to navigate to.
    pub redirect: String,
}

/// Completed logout. Logout itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// Whether the backend confirmed the token invalidation.
    pub backend_invalidated: bool,
    /// Whether the local session was removed.
    pub local_cleared: bool,
}

/// Issues, verifies and ends sessions for one browser context.
pub struct SessionIssuer<B, S>
where
    B: AuthBackend + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    store: SessionStoreRuntime<B, S>,
    wait: Duration,
}

impl<B, S> SessionIssuer<B, S>
where
    B: AuthBackend + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    /// Create an issuer with the default backend timeout.
    #[must_use]
    pub fn new(backend: B, sessions: S) -> Self {
        Self::with_reducer(backend, sessions, SessionReducer::new())
    }

    /// Create an issuer around a configured reducer.
    #[must_use]
    pub fn with_reducer(backend: B, sessions: S, reducer: SessionReducer<B, S>) -> Self {
        // Logout makes one backend call plus two store calls; leave headroom.
        let wait = reducer.backend_timeout() * 2 + Duration::from_secs(1);
        Self {
            store: Store::new(
                AuthState::default(),
                reducer,
                AuthEnvironment::new(backend, sessions),
            ),
            wait,
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the session is already persisted.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] that ended the login. The previously
    /// persisted session, if any, is unchanged.
    pub async fn login(&self, email: &str, password: &str, login_type: &str) -> Result<LoginOutcome> {
        let action = AuthAction::Login {
            credentials: Credentials::new(email, password, login_type),
        };

        match self
            .store
            .send_and_wait_for(action, AuthAction::is_login_outcome, self.wait)
            .await?
        {
            AuthAction::LoginSucceeded { session } => {
                let redirect = session.role.dashboard_path().to_string();
                Ok(LoginOutcome { session, redirect })
            },
            AuthAction::LoginFailed { error } => Err(error),
            other => Err(AuthError::Internal(format!("unexpected login outcome: {other:?}"))),
        }
    }

    /// End the session. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails to run the logout.
    pub async fn logout(&self) -> Result<LogoutOutcome> {
        match self
            .store
            .send_and_wait_for(AuthAction::Logout, AuthAction::is_logout_outcome, self.wait)
            .await?
        {
            AuthAction::LogoutCompleted {
                backend_invalidated,
                local_cleared,
            } => Ok(LogoutOutcome {
                backend_invalidated,
                local_cleared,
            }),
            other => Err(AuthError::Internal(format!("unexpected logout outcome: {other:?}"))),
        }
    }

    /// Confirm `token` with the backend.
    ///
    /// On success the rebuilt session is persisted; on failure the persisted
    /// session is cleared.
    ///
    /// # Errors
    ///
    /// Returns why verification failed.
    pub async fn verify(&self, token: &str) -> Result<Session> {
        let action = AuthAction::VerifySession {
            token: token.to_string(),
        };
        let outcome = self
            .store
            .send_and_wait_for(action, AuthAction::is_verify_outcome, self.wait)
            .await?;
        verified(outcome)
    }

    /// Load the persisted session and verify it.
    ///
    /// Returns `Ok(None)` when nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns why verification failed; the session is then cleared.
    pub async fn restore(&self) -> Result<Option<Session>> {
        match self
            .store
            .send_and_wait_for(
                AuthAction::RestoreSession,
                AuthAction::is_restore_outcome,
                self.wait,
            )
            .await?
        {
            AuthAction::SessionRestored { cached: None } => Ok(None),
            outcome => verified(outcome).map(Some),
        }
    }

    /// Current load state.
    pub async fn load(&self) -> SessionLoad {
        self.store.state(|state| state.load.clone()).await
    }

    /// Where the UI should navigate after the last completed operation.
    pub async fn redirect(&self) -> Option<String> {
        self.store.state(|state| state.redirect.clone()).await
    }

    /// Injected dependencies.
    pub fn environment(&self) -> &AuthEnvironment<B, S> {
        self.store.environment()
    }
}

fn verified(outcome: AuthAction) -> Result<Session> {
    match outcome {
        AuthAction::SessionVerified { session } => Ok(session),
        AuthAction::SessionCleared { reason } => Err(reason),
        other => Err(AuthError::Internal(format!("unexpected verify outcome: {other:?}"))),
    }
}
