//! Mock auth backend for testing.

use crate::error::{AuthError, Result};
use crate::providers::backend::{verified_user, AuthBackend, LoginResponse};
use crate::state::LoginType;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Scripted = std::result::Result<Value, AuthError>;

#[derive(Debug, Default)]
struct Calls {
    login: AtomicUsize,
    verify: AtomicUsize,
    logout: AtomicUsize,
    logins: Mutex<Vec<(LoginType, String)>>,
}

/// Mock auth backend.
///
/// Responses are scripted per endpoint; unscripted logins succeed with a
/// token named after the login flow. Every call is counted, and logins
/// run the same body parsing as the HTTP backend.
///
/// Clones share call counters.
#[derive(Debug, Clone, Default)]
pub struct MockAuthBackend {
    login_bodies: HashMap<LoginType, Scripted>,
    verify_body: Option<Scripted>,
    logout_error: Option<AuthError>,
    delay: Option<Duration>,
    calls: Arc<Calls>,
}

impl MockAuthBackend {
    /// Create a backend that accepts every login.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer logins for `login_type` with this 2xx body.
    #[must_use]
    pub fn with_login_body(mut self, login_type: LoginType, body: Value) -> Self {
        self.login_bodies.insert(login_type, Ok(body));
        self
    }

    /// Fail logins for `login_type` with `error`.
    #[must_use]
    pub fn with_login_error(mut self, login_type: LoginType, error: AuthError) -> Self {
        self.login_bodies.insert(login_type, Err(error));
        self
    }

    /// Answer verification with this 2xx body.
    #[must_use]
    pub fn with_verify_body(mut self, body: Value) -> Self {
        self.verify_body = Some(Ok(body));
        self
    }

    /// Fail verification with `error`.
    #[must_use]
    pub fn with_verify_error(mut self, error: AuthError) -> Self {
        self.verify_body = Some(Err(error));
        self
    }

    /// Fail logout with `error`.
    #[must_use]
    pub fn with_logout_error(mut self, error: AuthError) -> Self {
        self.logout_error = Some(error);
        self
    }

    /// Sleep this long before every response.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of login requests received.
    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.calls.login.load(Ordering::SeqCst)
    }

    /// Number of verify requests received.
    #[must_use]
    pub fn verify_calls(&self) -> usize {
        self.calls.verify.load(Ordering::SeqCst)
    }

    /// Number of logout requests received.
    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.calls.logout.load(Ordering::SeqCst)
    }

    /// Login flows and emails received, in order.
    #[must_use]
    pub fn logins(&self) -> Vec<(LoginType, String)> {
        self.calls
            .logins
            .lock()
            .map(|logins| logins.clone())
            .unwrap_or_default()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl AuthBackend for MockAuthBackend {
    async fn login(&self, login_type: LoginType, email: &str, _password: &str) -> Result<LoginResponse> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.calls
            .logins
            .lock()
            .map_err(|_| AuthError::Internal("Mutex lock failed".to_string()))?
            .push((login_type, email.to_string()));
        self.pause().await;

        let body = match self.login_bodies.get(&login_type) {
            Some(scripted) => scripted.clone()?,
            None => {
                let mut body = Map::new();
                body.insert(
                    "token".to_string(),
                    json!(format!("mock-token-{}", login_type.as_str())),
                );
                body.insert(
                    login_type.as_str().to_string(),
                    json!({
                        "_id": format!("mock-{}-1", login_type.as_str()),
                        "email": email,
                    }),
                );
                Value::Object(body)
            },
        };

        LoginResponse::from_body(login_type, &body)
    }

    async fn verify(&self, _token: &str) -> Result<Value> {
        self.calls.verify.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let body = match &self.verify_body {
            Some(scripted) => scripted.clone()?,
            None => json!({"success": true, "user": {"_id": "mock-1"}}),
        };

        verified_user(body)
    }

    async fn logout(&self, _token: &str) -> Result<()> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        match &self.logout_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
