//! HTTP request handlers.

pub mod health;
pub mod session;

pub use health::health_check;
pub use session::{current_session, login, logout, routes};
