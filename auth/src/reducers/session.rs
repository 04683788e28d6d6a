//! Session reducer.
//!
//! Issues, restores, verifies and ends the single session of one browser
//! context.
//!
//! # Flows
//!
//! ```text
//! Login ──validate──► LoginFailed(Validation)            (no network)
//!       └─backend.login──► set_session ──► LoginSucceeded (redirect to dashboard)
//!                     └──► LoginFailed                    (nothing persisted)
//!
//! Logout ──► backend.logout (best effort) ──► clear_session ──► LogoutCompleted
//!
//! RestoreSession ──► SessionRestored(None)           → Empty
//!                └─► SessionRestored(Some(cached))   → Unverified
//!                        └─► VerifySession ──► SessionVerified → Verified
//!                                          └─► SessionCleared  → Cleared
//! ```
//!
//! Store writes happen inside effects, before the outcome action is fed
//! back, so the outcome always describes what is persisted.

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{AuthBackend, SessionStore};
use crate::state::{AuthState, Role, Session, SessionLoad};
use std::future::Future;
use std::time::Duration;
use verdant_core::effect::Effect;
use verdant_core::reducer::Reducer;
use verdant_core::{smallvec, SmallVec};

/// Where the UI goes after logout.
pub const LOGOUT_REDIRECT: &str = "/";

/// Session reducer.
///
/// Generic over the backend and store so tests run against mocks.
#[derive(Debug, Clone)]
pub struct SessionReducer<B, S> {
    /// Upper bound for each backend call (default: 10 seconds).
    backend_timeout: Duration,
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(B, S)>,
}

impl<B, S> SessionReducer<B, S> {
    /// Create a reducer with the default backend timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a reducer with a custom backend timeout.
    #[must_use]
    pub const fn with_timeout(backend_timeout: Duration) -> Self {
        Self {
            backend_timeout,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Configured backend timeout.
    #[must_use]
    pub const fn backend_timeout(&self) -> Duration {
        self.backend_timeout
    }
}

impl<B, S> Default for SessionReducer<B, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a backend call, mapping an elapsed deadline to `AuthError::Timeout`.
async fn bounded<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(AuthError::Timeout))
}

/// Rebuild a session from a verify response.
///
/// The role comes from `user.role`. When the backend omits it, the role the
/// session was originally issued with is kept.
fn rebuild_session(token: String, user: serde_json::Value, issued_role: Option<Role>) -> Result<Session> {
    let role = match user.get("role") {
        Some(serde_json::Value::String(role)) => Role::parse(role)
            .ok_or_else(|| AuthError::VerificationFailed(format!("unknown role `{role}`")))?,
        Some(_) => {
            return Err(AuthError::VerificationFailed(
                "role is not a string".to_string(),
            ));
        }
        None => issued_role.ok_or_else(|| {
            AuthError::VerificationFailed("verify response has no role".to_string())
        })?,
    };
    Ok(Session::from_entity(token, role, user, None))
}

impl<B, S> Reducer for SessionReducer<B, S>
where
    B: AuthBackend + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<B, S>;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let limit = self.backend_timeout;

        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login: validate locally, then one backend call
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Login { credentials } => {
                state.last_error = None;
                state.redirect = None;

                let valid = match credentials.validate() {
                    Ok(valid) => valid,
                    Err(error) => {
                        tracing::warn!(email = %credentials.email, %error, "Login rejected locally");
                        return smallvec![Effect::send(AuthAction::LoginFailed { error })];
                    },
                };

                let backend = env.backend.clone();
                let sessions = env.sessions.clone();

                smallvec![Effect::future(async move {
                    let issued = bounded(
                        limit,
                        backend.login(valid.login_type, &valid.email, &valid.password),
                    )
                    .await
                    .map(|response| {
                        Session::from_entity(
                            response.token,
                            valid.login_type.role(),
                            response.user,
                            Some(&valid.email),
                        )
                    });

                    let session = match issued {
                        Ok(session) => session,
                        Err(error) => return Some(AuthAction::LoginFailed { error }),
                    };

                    match sessions.set_session(&session).await {
                        Ok(()) => Some(AuthAction::LoginSucceeded { session }),
                        Err(error) => {
                            tracing::error!(%error, "Failed to persist session");
                            Some(AuthAction::LoginFailed {
                                error: AuthError::Storage(error.to_string()),
                            })
                        },
                    }
                })]
            },

            AuthAction::LoginSucceeded { session } => {
                tracing::info!(
                    role = %session.role,
                    email = session.email.as_deref().unwrap_or_default(),
                    "Login succeeded"
                );
                state.redirect = Some(session.role.dashboard_path().to_string());
                state.last_error = None;
                state.load = SessionLoad::Verified(session);
                SmallVec::new()
            },

            AuthAction::LoginFailed { error } => {
                tracing::warn!(%error, "Login failed");
                state.last_error = Some(error);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout: best-effort backend call, then an unconditional clear
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Logout => {
                let backend = env.backend.clone();
                let sessions = env.sessions.clone();

                smallvec![Effect::future(async move {
                    let token = match sessions.get_session().await {
                        Ok(session) => session.map(|s| s.token),
                        Err(error) => {
                            tracing::warn!(%error, "Could not read session before logout");
                            None
                        },
                    };

                    let backend_invalidated = match token {
                        Some(token) => match bounded(limit, backend.logout(&token)).await {
                            Ok(()) => true,
                            Err(error) => {
                                tracing::warn!(%error, "Backend logout failed, clearing locally");
                                false
                            },
                        },
                        None => false,
                    };

                    let local_cleared = match sessions.clear_session().await {
                        Ok(()) => true,
                        Err(error) => {
                            tracing::error!(%error, "Failed to clear session");
                            false
                        },
                    };

                    Some(AuthAction::LogoutCompleted {
                        backend_invalidated,
                        local_cleared,
                    })
                })]
            },

            AuthAction::LogoutCompleted {
                backend_invalidated,
                local_cleared,
            } => {
                tracing::info!(backend_invalidated, local_cleared, "Logged out");
                state.load = SessionLoad::Cleared;
                state.redirect = Some(LOGOUT_REDIRECT.to_string());
                state.last_error = (!local_cleared)
                    .then(|| AuthError::Storage("session could not be cleared".to_string()));
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Restore: read, then verify before trusting
            // ═══════════════════════════════════════════════════════════════
            AuthAction::RestoreSession => {
                let sessions = env.sessions.clone();

                smallvec![Effect::future(async move {
                    let cached = match sessions.get_session().await {
                        Ok(cached) => cached,
                        Err(error) => {
                            tracing::warn!(%error, "Could not read persisted session");
                            None
                        },
                    };
                    Some(AuthAction::SessionRestored { cached })
                })]
            },

            AuthAction::SessionRestored { cached } => match cached {
                None => {
                    state.load = SessionLoad::Empty;
                    SmallVec::new()
                },
                Some(cached) => {
                    let token = cached.token.clone();
                    state.load = SessionLoad::Unverified(cached);
                    smallvec![Effect::send(AuthAction::VerifySession { token })]
                },
            },

            AuthAction::VerifySession { token } => {
                let issued_role = state
                    .load
                    .session()
                    .filter(|s| s.role_confirmed())
                    .map(|s| s.role);
                let backend = env.backend.clone();
                let sessions = env.sessions.clone();

                smallvec![Effect::future(async move {
                    let verified = bounded(limit, backend.verify(&token))
                        .await
                        .and_then(|user| rebuild_session(token, user, issued_role));

                    let persisted = match verified {
                        Ok(session) => sessions
                            .set_session(&session)
                            .await
                            .map(|()| session)
                            .map_err(|e| AuthError::Storage(e.to_string())),
                        Err(error) => Err(error),
                    };

                    match persisted {
                        Ok(session) => Some(AuthAction::SessionVerified { session }),
                        Err(reason) => {
                            if let Err(error) = sessions.clear_session().await {
                                tracing::error!(%error, "Failed to clear unverified session");
                            }
                            Some(AuthAction::SessionCleared { reason })
                        },
                    }
                })]
            },

            AuthAction::SessionVerified { session } => {
                tracing::info!(role = %session.role, "Session verified");
                state.last_error = None;
                state.load = SessionLoad::Verified(session);
                SmallVec::new()
            },

            AuthAction::SessionCleared { reason } => {
                tracing::warn!(%reason, "Session cleared after failed verification");
                state.load = SessionLoad::Cleared;
                state.last_error = Some(reason);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockAuthBackend, MockSessionStore};
    use crate::state::Credentials;
    use serde_json::json;
    use verdant_testing::{assertions, ReducerTest};

    type TestReducer = SessionReducer<MockAuthBackend, MockSessionStore>;

    fn env() -> AuthEnvironment<MockAuthBackend, MockSessionStore> {
        AuthEnvironment::new(MockAuthBackend::new(), MockSessionStore::new())
    }

    fn session(role: Role) -> Session {
        Session::from_entity("tok".into(), role, json!({"_id": "u1"}), None)
    }

    #[test]
    fn test_valid_login_returns_backend_effect() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::login("fern@example.com", "pw", "user"))
            .then_state(|state| {
                assert!(state.last_error.is_none());
                assert!(state.redirect.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_login_success_sets_dashboard_redirect() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::LoginSucceeded {
                session: session(Role::Seller),
            })
            .then_state(|state| {
                assert_eq!(state.redirect.as_deref(), Some("/seller/dashboard"));
                assert_eq!(state.load.verified().map(|s| s.role), Some(Role::Seller));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_login_failure_keeps_prior_session() {
        let prior = AuthState {
            load: SessionLoad::Verified(session(Role::User)),
            ..AuthState::default()
        };
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(prior)
            .when_action(AuthAction::LoginFailed {
                error: AuthError::rejected(),
            })
            .then_state(|state| {
                assert_eq!(state.load.verified().map(|s| s.role), Some(Role::User));
                assert_eq!(state.last_error, Some(AuthError::rejected()));
                assert!(state.redirect.is_none());
            })
            .run();
    }

    #[test]
    fn test_logout_completed_redirects_home() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                load: SessionLoad::Verified(session(Role::User)),
                ..AuthState::default()
            })
            .when_action(AuthAction::LogoutCompleted {
                backend_invalidated: false,
                local_cleared: true,
            })
            .then_state(|state| {
                assert_eq!(state.load, SessionLoad::Cleared);
                assert_eq!(state.redirect.as_deref(), Some(LOGOUT_REDIRECT));
                assert!(state.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn test_restored_session_is_unverified_until_checked() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::SessionRestored {
                cached: Some(session(Role::Seller)),
            })
            .then_state(|state| {
                assert!(matches!(state.load, SessionLoad::Unverified(_)));
                assert!(state.load.verified().is_none());
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn test_nothing_restored_is_empty() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::SessionRestored { cached: None })
            .then_state(|state| assert_eq!(state.load, SessionLoad::Empty))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_session_cleared_records_reason() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(AuthState {
                load: SessionLoad::Unverified(session(Role::User)),
                ..AuthState::default()
            })
            .when_action(AuthAction::SessionCleared {
                reason: AuthError::Timeout,
            })
            .then_state(|state| {
                assert_eq!(state.load, SessionLoad::Cleared);
                assert_eq!(state.last_error, Some(AuthError::Timeout));
            })
            .run();
    }

    #[test]
    fn test_rebuild_prefers_backend_role() {
        let rebuilt = rebuild_session("t".into(), json!({"role": "admin"}), Some(Role::User));
        assert_eq!(rebuilt.map(|s| s.role), Ok(Role::Admin));

        let kept = rebuild_session("t".into(), json!({"_id": "1"}), Some(Role::Seller));
        assert_eq!(kept.map(|s| s.role), Ok(Role::Seller));

        assert!(rebuild_session("t".into(), json!({}), None).is_err());
        assert!(rebuild_session("t".into(), json!({"role": "root"}), Some(Role::User)).is_err());
    }

    #[tokio::test]
    async fn test_invalid_credentials_feed_back_validation_error() {
        let reducer = TestReducer::new();
        let env = env();
        let mut state = AuthState::default();

        let mut effects = reducer.reduce(
            &mut state,
            AuthAction::Login {
                credentials: Credentials::new("not-an-email", "pw", "user"),
            },
            &env,
        );

        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("validation failure should feed back an action");
        };
        assert!(matches!(
            fut.await,
            Some(AuthAction::LoginFailed {
                error: AuthError::Validation(_)
            })
        ));
        assert_eq!(env.backend.login_calls(), 0);
    }
}
