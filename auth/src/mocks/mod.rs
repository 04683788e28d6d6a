//! Mock provider implementations for testing.
//!
//! In-memory, scriptable implementations of the provider traits for use in
//! unit and integration tests.

pub mod backend;
pub mod session;

pub use backend::MockAuthBackend;
pub use session::MockSessionStore;
