//! Session endpoints.
//!
//! ```text
//! POST /api/session/login   {"email", "password", "loginType"}
//! POST /api/session/logout
//! GET  /api/session
//! ```
//!
//! Login and restore answer with the `token`/`loginType` cookie pair plus a
//! signed `session` cookie; logout and failed restores delete all three.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderName},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use verdant_auth::{
    gate::HOME_PATH, providers::AuthBackend, stores::InMemorySessionStore, AuthError,
    ClientRecord, Credentials, Role, Session,
};

use crate::error::AppError;
use crate::extractors::{CorrelationId, SessionCookies};
use crate::state::AppState;
use crate::WebResult;

/// Session as exposed to the browser. Never includes the token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Role of the signed-in subject.
    pub role: Role,
    /// Backend id of the subject.
    pub subject_id: Option<String>,
    /// Email of the subject.
    pub email: Option<String>,
    /// Role entity as returned by the backend.
    pub user: Value,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            role: session.role,
            subject_id: session.subject_id.clone(),
            email: session.email.clone(),
            user: session.user.clone(),
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Dashboard to navigate to.
    pub redirect: String,
    /// The new session.
    pub session: SessionView,
    /// Client-side copy of the session.
    pub client_record: ClientRecord,
}

/// Body of a successful restore.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    /// The verified session.
    pub session: SessionView,
    /// Client-side copy of the session.
    pub client_record: ClientRecord,
}

type CookieHeaders = AppendHeaders<[(HeaderName, String); 3]>;

/// Session endpoints, ready to merge into an application router.
pub fn routes<B>() -> Router<AppState<B>>
where
    B: AuthBackend + Clone + 'static,
{
    Router::new()
        .route("/api/session", get(current_session::<B>))
        .route("/api/session/login", post(login::<B>))
        .route("/api/session/logout", post(logout::<B>))
}

/// Exchange credentials for a session.
///
/// Responds 200 with [`LoginBody`] and the session cookies. Failures set no
/// cookies, so a session the browser already holds is left as it was.
///
/// # Errors
///
/// - 400 when the body is not JSON
/// - 422 when credentials fail local validation
/// - 401 with the backend's message when credentials are rejected
/// - 503, 408 or 502 when the backend is unreachable, slow or malformed
pub async fn login<B>(
    State(state): State<AppState<B>>,
    CorrelationId(correlation_id): CorrelationId,
    SessionCookies(cookies): SessionCookies,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> WebResult<Response>
where
    B: AuthBackend + Clone + 'static,
{
    let Json(credentials) = payload.map_err(|rejection| {
        AppError::bad_request(rejection.body_text()).with_code("INVALID_BODY")
    })?;

    let issuer = state.issuer(InMemorySessionStore::from_cookies(&cookies));
    let outcome = match issuer
        .login(
            &credentials.email,
            &credentials.password,
            &credentials.login_type,
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(error) => {
            metrics::counter!("verdant_logins_total", "outcome" => outcome_label(&error))
                .increment(1);
            tracing::info!(%correlation_id, error = %error, "Login failed");
            return Err(error.into());
        },
    };

    metrics::counter!("verdant_logins_total", "outcome" => "success").increment(1);
    tracing::info!(
        %correlation_id,
        role = %outcome.session.role,
        redirect = %outcome.redirect,
        "Login succeeded"
    );

    let headers = issue_cookies(&state, &outcome.session)?;
    let body = LoginBody {
        redirect: outcome.redirect,
        session: SessionView::from(&outcome.session),
        client_record: outcome.session.client_record(),
    };

    Ok((headers, Json(body)).into_response())
}

/// End the session.
///
/// Always redirects home with the session cookies deleted, whatever the
/// backend said.
pub async fn logout<B>(
    State(state): State<AppState<B>>,
    CorrelationId(correlation_id): CorrelationId,
    SessionCookies(cookies): SessionCookies,
) -> Response
where
    B: AuthBackend + Clone + 'static,
{
    let issuer = state.issuer(InMemorySessionStore::from_cookies(&cookies));

    match issuer.logout().await {
        Ok(outcome) => tracing::info!(
            %correlation_id,
            backend_invalidated = outcome.backend_invalidated,
            "Logged out"
        ),
        Err(error) => tracing::warn!(%correlation_id, error = %error, "Logout did not complete"),
    }

    let location = issuer
        .redirect()
        .await
        .unwrap_or_else(|| HOME_PATH.to_string());

    (clear_cookies(&state), Redirect::to(&location)).into_response()
}

/// Verify the browser's session with the backend.
///
/// Responds 200 with [`SessionBody`] and refreshed cookies. A session the
/// backend no longer accepts is deleted from the browser.
///
/// # Failures
///
/// - 401 `NO_SESSION` when no usable session cookie pair was sent
/// - 401 `SESSION_INVALID` when the backend refused the token
/// - 503, 408 or 502 when the backend is unreachable, slow or malformed
pub async fn current_session<B>(
    State(state): State<AppState<B>>,
    CorrelationId(correlation_id): CorrelationId,
    SessionCookies(cookies): SessionCookies,
) -> Response
where
    B: AuthBackend + Clone + 'static,
{
    let store = InMemorySessionStore::from_cookies(&cookies);
    let issuer = state.issuer(store);

    match issuer.restore().await {
        Ok(Some(session)) => match issue_cookies(&state, &session) {
            Ok(headers) => {
                let body = SessionBody {
                    session: SessionView::from(&session),
                    client_record: session.client_record(),
                };
                (headers, Json(body)).into_response()
            },
            Err(error) => error.into_response(),
        },
        Ok(None) => {
            let error = AppError::unauthorized("Not signed in").with_code("NO_SESSION");
            if cookies.token.is_some() || cookies.login_type.is_some() {
                // A half pair or an unknown role: drop what is there.
                (clear_cookies(&state), error).into_response()
            } else {
                error.into_response()
            }
        },
        Err(error) => {
            tracing::info!(%correlation_id, error = %error, "Session verification failed");
            (clear_cookies(&state), AppError::from(error)).into_response()
        },
    }
}

fn issue_cookies<B>(state: &AppState<B>, session: &Session) -> Result<CookieHeaders, AppError>
where
    B: AuthBackend + Clone + 'static,
{
    let jwt = state.signer().issue(session, state.clock())?;
    let [token, login_type] = state.cookies().set_pair(&session.cookie_pair());
    Ok(AppendHeaders([
        (SET_COOKIE, token),
        (SET_COOKIE, login_type),
        (SET_COOKIE, state.cookies().set_session(&jwt)),
    ]))
}

fn clear_cookies<B>(state: &AppState<B>) -> CookieHeaders
where
    B: AuthBackend + Clone + 'static,
{
    let [token, login_type] = state.cookies().clear_pair();
    AppendHeaders([
        (SET_COOKIE, token),
        (SET_COOKIE, login_type),
        (SET_COOKIE, state.cookies().clear_session()),
    ])
}

const fn outcome_label(error: &AuthError) -> &'static str {
    match error {
        AuthError::Validation(_) => "invalid",
        AuthError::Authentication { .. } => "rejected",
        AuthError::Network(_) | AuthError::Timeout | AuthError::MalformedResponse(_) => {
            "unavailable"
        },
        _ => "error",
    }
}
