//! Session issuer reducers.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.

pub mod session;

// Re-export
pub use session::SessionReducer;
