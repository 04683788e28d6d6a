//! Storage implementations for the session issuer.
//!
//! - **In-memory store** - one session behind one lock, seeded from and
//!   rendered back to the request's cookie pair

pub mod memory;

// Re-exports
pub use memory::InMemorySessionStore;
