//! Router assembly.

use anyhow::Context;
use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use verdant_auth::providers::{AuthBackend, HttpAuthBackend};
use verdant_core::environment::{Clock, SystemClock};
use verdant_web::{correlation_id_layer, handlers, route_gate, AppState, GateContext};

use crate::config::Config;
use crate::pages;

/// Build the full router.
///
/// Layers, outermost first: HTTP tracing, correlation IDs, route gate.
pub fn build_router<B>(state: AppState<B>, gate: GateContext) -> Router
where
    B: AuthBackend + Clone + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(handlers::routes())
        .merge(pages::routes())
        .fallback(pages::not_found)
        .layer(from_fn_with_state(gate, route_gate))
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the production router from configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn from_config(config: &Config) -> anyhow::Result<Router> {
    let backend = HttpAuthBackend::new(config.backend.auth_config())
        .context("failed to build auth backend client")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = AppState::new(backend, config.session.signer())
        .with_cookie_settings(config.session.cookie_settings())
        .with_backend_timeout(config.backend.timeout())
        .with_clock(Arc::clone(&clock));
    let gate = GateContext::new(config.session.gate(), clock);

    Ok(build_router(state, gate))
}
