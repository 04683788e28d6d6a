//! Axum middleware for the storefront.
//!
//! - **Correlation IDs**: every request and response carries an
//!   `X-Correlation-ID`, and handlers run inside a span that records it
//! - **Route gate**: requests under `/user`, `/seller` and `/admin` are
//!   checked against the session cookies before any handler runs
//!
//! # Example
//!
//! ```ignore
//! use axum::{middleware::from_fn_with_state, Router};
//! use verdant_web::middleware::{correlation_id_layer, route_gate, GateContext};
//!
//! let app = Router::new()
//!     .nest("/seller", seller_pages)
//!     .layer(from_fn_with_state(GateContext::new(RouteGate::cookie(), clock), route_gate))
//!     .layer(correlation_id_layer());
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;
use verdant_auth::{GateDecision, RouteGate};
use verdant_core::environment::Clock;

use crate::extractors::request_cookies;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Layer that tags every request with a correlation ID.
///
/// The ID is taken from the request header when it is a valid UUID and
/// generated otherwise. It is stored in request extensions and echoed in the
/// response header.
#[must_use]
pub fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let correlation_id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(correlation_id);

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %correlation_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(header_value) = HeaderValue::from_str(&correlation_id.to_string()) {
                response
                    .headers_mut()
                    .insert(CORRELATION_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// State for [`route_gate`].
#[derive(Clone)]
pub struct GateContext {
    gate: Arc<RouteGate>,
    clock: Arc<dyn Clock>,
}

impl GateContext {
    /// Gate requests with `gate`, checking signed sessions against `clock`.
    #[must_use]
    pub fn new(gate: RouteGate, clock: Arc<dyn Clock>) -> Self {
        Self {
            gate: Arc::new(gate),
            clock,
        }
    }
}

/// Route authorization middleware.
///
/// Runs the gate on the request path and cookies. Allowed requests continue
/// to the inner service; everything else gets a temporary redirect and never
/// reaches a handler.
pub async fn route_gate(State(context): State<GateContext>, request: Request, next: Next) -> Response {
    let cookies = request_cookies(request.headers());
    let decision = context
        .gate
        .decide(request.uri().path(), &cookies, context.clock.as_ref());

    match decision {
        GateDecision::Allow => {
            metrics::counter!("verdant_gate_decisions_total", "decision" => "allow").increment(1);
            next.run(request).await
        },
        GateDecision::Redirect(location) => {
            metrics::counter!("verdant_gate_decisions_total", "decision" => "redirect")
                .increment(1);
            Redirect::temporary(&location).into_response()
        },
    }
}
