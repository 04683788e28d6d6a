//! Session issuer providers.
//!
//! Traits for the two external dependencies of the session reducer: the
//! auth backend that issues and checks tokens, and the store that persists
//! the one active session. The reducer depends on these traits; the
//! application wires in concrete implementations.
//!
//! ```text
//!  SessionReducer ──► AuthBackend   (HttpAuthBackend | MockAuthBackend)
//!        │
//!        └──────────► SessionStore  (InMemorySessionStore)
//! ```

pub mod backend;
pub mod http;
pub mod session;

pub use backend::{AuthBackend, LoginResponse};
pub use http::HttpAuthBackend;
pub use session::SessionStore;
