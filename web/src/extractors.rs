//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request correlation ID
//! - `SessionCookies`: the `token`, `loginType` and `session` cookies
//!
//! # Examples
//!
//! ```ignore
//! use verdant_web::extractors::{CorrelationId, SessionCookies};
//!
//! async fn handler(
//!     correlation_id: CorrelationId,
//!     SessionCookies(cookies): SessionCookies,
//! ) -> StatusCode {
//!     tracing::info!(correlation_id = %correlation_id.0, signed_in = cookies.token.is_some());
//!     StatusCode::OK
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use uuid::Uuid;
use verdant_auth::RequestCookies;

use crate::middleware::CORRELATION_ID_HEADER;

/// Correlation ID for request tracing.
///
/// Prefers the ID stored by the correlation layer, then the
/// `X-Correlation-ID` header, and generates a new UUID v4 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts.extensions.get::<Uuid>().copied().unwrap_or_else(|| {
            parts
                .headers
                .get(CORRELATION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| Uuid::parse_str(s).ok())
                .unwrap_or_else(Uuid::new_v4)
        });

        Ok(Self(correlation_id))
    }
}

/// Authorization cookies sent with the request.
///
/// Never rejects: missing cookies are simply `None`.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies(pub RequestCookies);

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookies
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(request_cookies(&parts.headers)))
    }
}

/// Parse every `Cookie` header on a request.
#[must_use]
pub fn request_cookies(headers: &HeaderMap) -> RequestCookies {
    RequestCookies::parse(
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract<T>(request: Request<()>) -> T
    where
        T: FromRequestParts<(), Rejection = std::convert::Infallible>,
    {
        let (mut parts, ()) = request.into_parts();
        T::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_session_cookies_across_headers() {
        let request = Request::builder()
            .header(header::COOKIE, "theme=dark; token=abc")
            .header(header::COOKIE, "loginType=seller")
            .body(())
            .unwrap();

        let SessionCookies(cookies) = extract(request).await;
        assert_eq!(cookies.token.as_deref(), Some("abc"));
        assert_eq!(cookies.login_type.as_deref(), Some("seller"));
        assert!(cookies.session.is_none());
    }

    #[tokio::test]
    async fn test_session_cookies_absent() {
        let SessionCookies(cookies) = extract(Request::new(())).await;
        assert_eq!(cookies, RequestCookies::default());
    }

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(CORRELATION_ID_HEADER, id.to_string())
            .body(())
            .unwrap();

        let CorrelationId(extracted) = extract(request).await;
        assert_eq!(extracted, id);
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_extension() {
        let id = Uuid::new_v4();
        let mut request = Request::builder()
            .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string())
            .body(())
            .unwrap();
        request.extensions_mut().insert(id);

        let CorrelationId(extracted) = extract(request).await;
        assert_eq!(extracted, id);
    }
}
