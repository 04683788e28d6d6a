//! # Verdant Authentication
//!
//! Session issuing and role-based route authorization for the storefront.
//!
//! ## Components
//!
//! - **Session issuer**: exchanges credentials for a backend token via one
//!   of two role-specific login endpoints, persists the session as a single
//!   value, verifies a persisted session before trusting it, and logs out
//!   unconditionally
//! - **Route gate**: a pure decision over `(path, token, loginType)` for the
//!   `/user`, `/seller` and `/admin` namespaces
//! - **Cookie codec** and **signed session claims** shared by both
//!
//! ## Architecture
//!
//! The issuer is implemented as a reducer and effects:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! ## Example: Login
//!
//! ```rust,ignore
//! use verdant_auth::{mocks::MockAuthBackend, stores::InMemorySessionStore, SessionIssuer};
//!
//! let issuer = SessionIssuer::new(MockAuthBackend::new(), InMemorySessionStore::new());
//! let outcome = issuer.login("fern@example.com", "hunter2", "seller").await?;
//! assert_eq!(outcome.redirect, "/seller/dashboard");
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod claims;
pub mod config;
pub mod cookies;
pub mod environment;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod stores;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::AuthAction;
pub use claims::{SessionClaims, SessionSigner};
pub use config::AuthConfig;
pub use cookies::{CookiePair, CookieSettings, RequestCookies};
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use gate::{authorize, GateDecision, RoleSource, RouteGate};
pub use issuer::{LoginOutcome, LogoutOutcome, SessionIssuer};
pub use reducers::SessionReducer;
pub use state::{AuthState, ClientRecord, Credentials, LoginType, Role, Session, SessionLoad};
