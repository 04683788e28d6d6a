//! Liveness endpoint for load balancers.

use axum::http::StatusCode;

/// Liveness check.
///
/// Returns 200 while the process is serving requests. The auth backend is
/// not contacted.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
