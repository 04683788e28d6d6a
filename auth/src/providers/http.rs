//! HTTP auth backend.
//!
//! Talks to the storefront backend's JSON auth routes with `reqwest`.

use super::backend::{rejection, verified_user, AuthBackend, LoginResponse};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::state::LoginType;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;

/// [`AuthBackend`] over HTTP.
///
/// Every request is bounded by [`AuthConfig::request_timeout`].
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    http_client: Client,
    config: AuthConfig,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl HttpAuthBackend {
    /// Create a backend client.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Read a body as JSON, treating an empty or non-JSON body as `Null`.
async fn json_body(response: Response) -> Result<Value> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
}

impl AuthBackend for HttpAuthBackend {
    async fn login(&self, login_type: LoginType, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.config.login_url(login_type);
        tracing::debug!(%url, login_type = login_type.as_str(), "Sending login request");

        let response = self
            .http_client
            .post(&url)
            .json(&LoginBody { email, password })
            .send()
            .await?;

        let status = response.status();
        let body = json_body(response).await?;

        if status.is_server_error() {
            tracing::error!(%status, "Login endpoint failed");
            return Err(AuthError::Network(format!("backend returned {status}")));
        }
        if !status.is_success() {
            return Err(rejection(&body));
        }
        if body.is_null() {
            return Err(AuthError::MalformedResponse(
                "login response is not JSON".to_string(),
            ));
        }

        LoginResponse::from_body(login_type, &body)
    }

    async fn verify(&self, token: &str) -> Result<Value> {
        let response = self
            .http_client
            .get(self.config.verify_url())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::VerificationFailed(format!(
                "backend returned {status}"
            )));
        }

        verified_user(json_body(response).await?)
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let response = self
            .http_client
            .post(self.config.logout_url())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AuthError::Network(format!("logout returned {status}")))
        }
    }
}
