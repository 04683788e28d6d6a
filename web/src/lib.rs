//! Axum integration for the Verdant session core.
//!
//! The HTTP layer is the imperative shell around the session reducer:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← cookies, JSON, redirects
//! │  - Route gate middleware                │  ← correlation IDs, metrics
//! │  - Session handlers                     │
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │
//! │  - Session reducer                      │  ← login / logout / verify
//! │  - Gate decision                        │  ← pure (path, cookies) → decision
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **Gate**: protected page requests are redirected or passed through
//! 2. **Extract** cookies and the JSON body
//! 3. **Build** an issuer around a store seeded from the request cookies
//! 4. **Dispatch** the session operation and wait for its outcome
//! 5. **Map** the outcome to `Set-Cookie` headers and a response body
//!
//! # Example
//!
//! ```ignore
//! use verdant_web::{handlers, AppState};
//!
//! let app = Router::new()
//!     .merge(handlers::routes())
//!     .with_state(AppState::new(backend, signer));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use error::AppError;
pub use extractors::{request_cookies, CorrelationId, SessionCookies};
pub use middleware::{correlation_id_layer, route_gate, GateContext, CORRELATION_ID_HEADER};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
